//! Application lifecycle: status transitions, interview scheduling with conflict detection,
//! and the controller that turns approved transitions into backend calls.

pub mod conflict;
pub mod domain;
pub mod gateway;
pub mod lifecycle;
pub mod service;

#[cfg(test)]
mod tests;

pub use conflict::{find_conflict, CONFLICT_MESSAGE};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Interview, InterviewSlot, InvariantViolation,
    NewApplication, StatusUpdate,
};
pub use gateway::ApplicationGateway;
pub use lifecycle::{
    available_actions, next_state, ActionKind, Effect, LifecycleAction, LifecycleState,
    RejectionReason, Transition, TransitionContext,
};
pub use service::{ApplicationBoard, ApplicationLifecycleController, LifecycleError};
