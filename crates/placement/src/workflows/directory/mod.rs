//! Accounts, companies, students, and positions: the plain records the dashboards list and
//! edit around the application lifecycle.

pub mod domain;

pub use domain::{
    Account, AccountCreated, AccountId, Company, CompanyId, CurrentUser, InternshipPosition,
    NewAccount, PositionDraft, PositionId, PositionStatus, Role, Student, StudentId,
    UnknownVariant,
};
