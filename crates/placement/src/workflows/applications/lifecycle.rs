//! Pure transition function for the application lifecycle.
//!
//! `next_state` takes the current state, a requested action, and the data the decision may
//! depend on, and returns the next state together with the single effect the caller must
//! perform. It performs no I/O; the controller in `service` executes the effect.

use std::fmt;

use super::conflict::{find_conflict, CONFLICT_MESSAGE};
use super::domain::{
    Application, ApplicationId, ApplicationStatus, Interview, InterviewSlot, StatusUpdate,
};
use crate::workflows::directory::Role;

/// Where an application sits in the lifecycle, as seen by the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    /// Accept-for-interview was chosen and the scheduling form is open. Nothing has been sent
    /// yet, so the backend still reports the application as pending.
    Scheduling,
    Interviewing {
        slot: InterviewSlot,
    },
    Accepted {
        slot: Option<InterviewSlot>,
    },
    Rejected,
    /// Cancelled by the applicant; the backend record is gone.
    Withdrawn,
}

impl LifecycleState {
    /// Lift a fetched application into the lifecycle. An interviewing record without a
    /// complete slot still needs one, so it lands in `Scheduling`.
    pub fn from_application(application: &Application) -> Self {
        match application.status {
            ApplicationStatus::Pending => LifecycleState::Pending,
            ApplicationStatus::Interviewing => match application.interview_slot() {
                Some(slot) => LifecycleState::Interviewing { slot },
                None => LifecycleState::Scheduling,
            },
            ApplicationStatus::Accepted => LifecycleState::Accepted {
                slot: application.interview_slot(),
            },
            ApplicationStatus::Rejected => LifecycleState::Rejected,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Scheduling => "scheduling",
            LifecycleState::Interviewing { .. } => "interviewing",
            LifecycleState::Accepted { .. } => "accepted",
            LifecycleState::Rejected => "rejected",
            LifecycleState::Withdrawn => "withdrawn",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Accepted { .. } | LifecycleState::Rejected | LifecycleState::Withdrawn
        )
    }

    /// Actions the transition table lists for this state, regardless of actor.
    pub fn permitted_actions(&self) -> &'static [ActionKind] {
        match self {
            LifecycleState::Pending => &[
                ActionKind::AcceptForInterview,
                ActionKind::Reject,
                ActionKind::Cancel,
            ],
            LifecycleState::Scheduling => &[ActionKind::SubmitSchedule, ActionKind::Reject],
            LifecycleState::Interviewing { .. } => &[
                ActionKind::SubmitSchedule,
                ActionKind::Accept,
                ActionKind::Reject,
            ],
            LifecycleState::Accepted { .. }
            | LifecycleState::Rejected
            | LifecycleState::Withdrawn => &[],
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A requested move, carrying whatever input the move needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    AcceptForInterview,
    SubmitSchedule(InterviewSlot),
    Accept,
    Reject,
    Cancel,
}

impl LifecycleAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            LifecycleAction::AcceptForInterview => ActionKind::AcceptForInterview,
            LifecycleAction::SubmitSchedule(_) => ActionKind::SubmitSchedule,
            LifecycleAction::Accept => ActionKind::Accept,
            LifecycleAction::Reject => ActionKind::Reject,
            LifecycleAction::Cancel => ActionKind::Cancel,
        }
    }
}

/// Payload-free action names, used to decide which controls to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AcceptForInterview,
    SubmitSchedule,
    Accept,
    Reject,
    Cancel,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::AcceptForInterview,
        ActionKind::SubmitSchedule,
        ActionKind::Accept,
        ActionKind::Reject,
        ActionKind::Cancel,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::AcceptForInterview => "accept for interview",
            ActionKind::SubmitSchedule => "schedule interview",
            ActionKind::Accept => "accept",
            ActionKind::Reject => "reject",
            ActionKind::Cancel => "cancel",
        }
    }

    /// Companies drive status changes; only the applicant may cancel.
    pub const fn actor(self) -> Role {
        match self {
            ActionKind::Cancel => Role::Student,
            _ => Role::Company,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything besides the state that a transition may look at.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub application: &'a Application,
    pub actor: Role,
    /// Last fetched interview list; the conflict universe for scheduling.
    pub interviews: &'a [Interview],
}

/// The one side effect a successful transition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Local only: show the scheduling form.
    OpenSchedulingForm,
    UpdateStatus {
        application_id: ApplicationId,
        update: StatusUpdate,
    },
    DeleteApplication {
        application_id: ApplicationId,
    },
}

impl Effect {
    pub fn touches_backend(&self) -> bool {
        !matches!(self, Effect::OpenSchedulingForm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: LifecycleState,
    pub effect: Effect,
}

impl Transition {
    pub fn new(state: LifecycleState, effect: Effect) -> Self {
        Self { state, effect }
    }
}

/// Why a requested transition was refused before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("application is already {state}")]
    Terminal { state: &'static str },
    #[error("cannot {action} an application that is {from}")]
    NotPermitted {
        from: &'static str,
        action: ActionKind,
    },
    #[error("a {role} account cannot {action} an application")]
    RoleNotAllowed { role: Role, action: ActionKind },
    #[error("interview date, time, and location are required")]
    IncompleteSchedule,
    #[error("{}", CONFLICT_MESSAGE)]
    ScheduleConflict { with: ApplicationId },
}

/// Compute the next lifecycle state for `action`.
pub fn next_state(
    current: &LifecycleState,
    action: LifecycleAction,
    context: &TransitionContext<'_>,
) -> Result<Transition, RejectionReason> {
    if current.is_terminal() {
        return Err(RejectionReason::Terminal {
            state: current.label(),
        });
    }

    let kind = action.kind();
    if !current.permitted_actions().contains(&kind) {
        return Err(RejectionReason::NotPermitted {
            from: current.label(),
            action: kind,
        });
    }

    if context.actor != kind.actor() {
        return Err(RejectionReason::RoleNotAllowed {
            role: context.actor,
            action: kind,
        });
    }

    let application = context.application;
    let application_id = application.id;

    let transition = match (current, action) {
        (LifecycleState::Pending, LifecycleAction::AcceptForInterview) => {
            Transition::new(LifecycleState::Scheduling, Effect::OpenSchedulingForm)
        }
        (LifecycleState::Pending, LifecycleAction::Cancel) => Transition::new(
            LifecycleState::Withdrawn,
            Effect::DeleteApplication { application_id },
        ),
        (_, LifecycleAction::Reject) => Transition::new(
            LifecycleState::Rejected,
            Effect::UpdateStatus {
                application_id,
                update: StatusUpdate::carrying(ApplicationStatus::Rejected, application),
            },
        ),
        (LifecycleState::Interviewing { slot }, LifecycleAction::Accept) => Transition::new(
            LifecycleState::Accepted {
                slot: Some(slot.clone()),
            },
            Effect::UpdateStatus {
                application_id,
                update: StatusUpdate::carrying(ApplicationStatus::Accepted, application),
            },
        ),
        (_, LifecycleAction::SubmitSchedule(slot)) => {
            if slot.location.trim().is_empty() {
                return Err(RejectionReason::IncompleteSchedule);
            }
            if let Some(existing) = find_conflict(&slot, application_id, context.interviews) {
                return Err(RejectionReason::ScheduleConflict { with: existing.id });
            }
            let update = StatusUpdate::with_slot(ApplicationStatus::Interviewing, &slot);
            Transition::new(
                LifecycleState::Interviewing { slot },
                Effect::UpdateStatus {
                    application_id,
                    update,
                },
            )
        }
        (state, action) => {
            return Err(RejectionReason::NotPermitted {
                from: state.label(),
                action: action.kind(),
            })
        }
    };

    Ok(transition)
}

/// Actions `actor` may be offered for an application in `state`.
pub fn available_actions(state: &LifecycleState, actor: Role) -> Vec<ActionKind> {
    state
        .permitted_actions()
        .iter()
        .copied()
        .filter(|kind| kind.actor() == actor)
        .collect()
}
