use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::wire;
use crate::workflows::directory::{PositionId, StudentId, UnknownVariant};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status tracked by the backend for every application.
///
/// Serialized lowercase; parsed case-insensitively because older backend builds capitalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Interviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Statuses that must carry a complete interview slot.
    pub const fn requires_interview(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interviewing | ApplicationStatus::Accepted
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(UnknownVariant::new("application status", value)),
        }
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A scheduled interview: when and where.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterviewSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

impl InterviewSlot {
    pub fn new(date: NaiveDate, time: NaiveTime, location: impl Into<String>) -> Self {
        Self {
            date,
            time,
            location: location.into(),
        }
    }

    /// The single instant conflict detection compares on.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A student's request to fill an internship position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub position_id: PositionId,
    pub status: ApplicationStatus,
    #[serde(
        default,
        deserialize_with = "wire::deserialize_optional_date",
        serialize_with = "wire::serialize_optional_date"
    )]
    pub interview_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "wire::deserialize_optional_time",
        serialize_with = "wire::serialize_optional_time"
    )]
    pub interview_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub interview_location: Option<String>,
}

impl Application {
    /// The complete slot, when all three interview fields are present.
    pub fn interview_slot(&self) -> Option<InterviewSlot> {
        match (
            self.interview_date,
            self.interview_time,
            self.interview_location.as_ref(),
        ) {
            (Some(date), Some(time), Some(location)) => {
                Some(InterviewSlot::new(date, time, location.clone()))
            }
            _ => None,
        }
    }

    pub fn has_any_interview_detail(&self) -> bool {
        self.interview_date.is_some()
            || self.interview_time.is_some()
            || self.interview_location.is_some()
    }

    /// Interview fields are present exactly when the status needs them. Rejected
    /// applications may keep whatever they had.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self.status {
            status if status.requires_interview() && self.interview_slot().is_none() => {
                Err(InvariantViolation::MissingInterviewDetails {
                    application_id: self.id,
                    status,
                })
            }
            ApplicationStatus::Pending if self.has_any_interview_detail() => {
                Err(InvariantViolation::UnexpectedInterviewDetails {
                    application_id: self.id,
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("application {application_id} is {status} but has no complete interview slot")]
    MissingInterviewDetails {
        application_id: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("application {application_id} is pending but carries interview details")]
    UnexpectedInterviewDetails { application_id: ApplicationId },
}

/// Read-side view over scheduled applications, used as the conflict universe.
///
/// `id` is the id of the application the interview belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub position_id: PositionId,
    #[serde(
        default,
        deserialize_with = "wire::deserialize_optional_date",
        serialize_with = "wire::serialize_optional_date"
    )]
    pub interview_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "wire::deserialize_optional_time",
        serialize_with = "wire::serialize_optional_time"
    )]
    pub interview_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub interview_location: Option<String>,
}

impl Interview {
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.interview_date?.and_time(self.interview_time?))
    }
}

/// Body of `PUT /api/applications/{id}/status`. All four keys are always sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(serialize_with = "wire::serialize_optional_date")]
    pub interview_date: Option<NaiveDate>,
    #[serde(serialize_with = "wire::serialize_optional_time")]
    pub interview_time: Option<NaiveTime>,
    pub interview_location: Option<String>,
}

impl StatusUpdate {
    /// New status with the application's last-known interview fields unchanged.
    pub fn carrying(status: ApplicationStatus, application: &Application) -> Self {
        Self {
            status,
            interview_date: application.interview_date,
            interview_time: application.interview_time,
            interview_location: application.interview_location.clone(),
        }
    }

    pub fn with_slot(status: ApplicationStatus, slot: &InterviewSlot) -> Self {
        Self {
            status,
            interview_date: Some(slot.date),
            interview_time: Some(slot.time),
            interview_location: Some(slot.location.clone()),
        }
    }
}

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub position_id: PositionId,
}
