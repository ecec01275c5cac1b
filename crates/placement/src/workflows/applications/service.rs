use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus, Interview, InterviewSlot};
use super::gateway::ApplicationGateway;
use super::lifecycle::{
    available_actions, next_state, ActionKind, Effect, LifecycleAction, LifecycleState,
    RejectionReason, TransitionContext,
};
use crate::client::ApiError;
use crate::workflows::directory::Role;

/// Last fetched copy of the lists the lifecycle depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationBoard {
    pub applications: Vec<Application>,
    pub interviews: Vec<Interview>,
}

impl ApplicationBoard {
    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.id == id)
    }
}

/// Drives applications through the lifecycle for one signed-in actor.
///
/// Every transition runs the pure `next_state` first; only a successful transition reaches
/// the gateway, and every successful mutation is followed by one refetch of both lists. The
/// board is never patched locally.
pub struct ApplicationLifecycleController<G> {
    gateway: Arc<G>,
    actor: Role,
    board: ApplicationBoard,
    scheduling: BTreeSet<ApplicationId>,
    last_error: Option<String>,
}

impl<G> ApplicationLifecycleController<G>
where
    G: ApplicationGateway + 'static,
{
    pub fn new(gateway: Arc<G>, actor: Role) -> Self {
        Self {
            gateway,
            actor,
            board: ApplicationBoard::default(),
            scheduling: BTreeSet::new(),
            last_error: None,
        }
    }

    pub fn actor(&self) -> Role {
        self.actor
    }

    pub fn board(&self) -> &ApplicationBoard {
        &self.board
    }

    /// Message from the most recent failed operation, cleared by the next successful fetch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the board with a fresh fetch of applications and interviews.
    pub async fn refresh(&mut self) -> Result<(), LifecycleError> {
        let gateway = Arc::clone(&self.gateway);

        let applications = match gateway.list_applications().await {
            Ok(applications) => applications,
            Err(err) => return Err(self.record(err.into())),
        };
        let interviews = match gateway.list_interviews().await {
            Ok(interviews) => interviews,
            Err(err) => return Err(self.record(err.into())),
        };

        let board = ApplicationBoard {
            applications,
            interviews,
        };
        self.scheduling.retain(|id| {
            board
                .application(*id)
                .is_some_and(|application| application.status == ApplicationStatus::Pending)
        });
        self.board = board;
        self.last_error = None;
        Ok(())
    }

    pub fn state_of(&self, id: ApplicationId) -> Result<LifecycleState, LifecycleError> {
        let application = self
            .board
            .application(id)
            .ok_or(LifecycleError::UnknownApplication(id))?;
        Ok(self.lifecycle_state(application))
    }

    /// Controls to offer the current actor for an application.
    pub fn available_actions(&self, id: ApplicationId) -> Result<Vec<ActionKind>, LifecycleError> {
        let state = self.state_of(id)?;
        Ok(available_actions(&state, self.actor))
    }

    /// Open the scheduling form. Nothing is sent to the backend.
    pub async fn begin_scheduling(
        &mut self,
        id: ApplicationId,
    ) -> Result<LifecycleState, LifecycleError> {
        self.perform(id, LifecycleAction::AcceptForInterview).await
    }

    /// Close an open scheduling form without sending anything.
    pub fn abandon_scheduling(&mut self, id: ApplicationId) -> bool {
        self.scheduling.remove(&id)
    }

    pub async fn submit_schedule(
        &mut self,
        id: ApplicationId,
        slot: InterviewSlot,
    ) -> Result<LifecycleState, LifecycleError> {
        self.perform(id, LifecycleAction::SubmitSchedule(slot)).await
    }

    pub async fn accept(&mut self, id: ApplicationId) -> Result<LifecycleState, LifecycleError> {
        self.perform(id, LifecycleAction::Accept).await
    }

    pub async fn reject(&mut self, id: ApplicationId) -> Result<LifecycleState, LifecycleError> {
        self.perform(id, LifecycleAction::Reject).await
    }

    pub async fn cancel(&mut self, id: ApplicationId) -> Result<LifecycleState, LifecycleError> {
        self.perform(id, LifecycleAction::Cancel).await
    }

    /// Run one action end to end: decide, perform the single effect, refetch.
    pub async fn perform(
        &mut self,
        id: ApplicationId,
        action: LifecycleAction,
    ) -> Result<LifecycleState, LifecycleError> {
        let application = match self.board.application(id) {
            Some(application) => application.clone(),
            None => return Err(self.record(LifecycleError::UnknownApplication(id))),
        };
        let current = self.lifecycle_state(&application);
        let kind = action.kind();

        let context = TransitionContext {
            application: &application,
            actor: self.actor,
            interviews: &self.board.interviews,
        };
        let transition = match next_state(&current, action, &context) {
            Ok(transition) => transition,
            Err(reason) => return Err(self.record(reason.into())),
        };

        let gateway = Arc::clone(&self.gateway);
        match &transition.effect {
            Effect::OpenSchedulingForm => {
                self.scheduling.insert(id);
                self.last_error = None;
                return Ok(transition.state);
            }
            Effect::UpdateStatus {
                application_id,
                update,
            } => {
                if let Err(err) = gateway.update_status(*application_id, update).await {
                    return Err(self.record(err.into()));
                }
                info!(
                    application_id = %application_id,
                    action = %kind,
                    status = %update.status,
                    "application status updated"
                );
            }
            Effect::DeleteApplication { application_id } => {
                if let Err(err) = gateway.delete_application(*application_id).await {
                    return Err(self.record(err.into()));
                }
                info!(application_id = %application_id, "application cancelled");
            }
        }

        self.scheduling.remove(&id);
        self.refresh().await?;
        Ok(transition.state)
    }

    fn lifecycle_state(&self, application: &Application) -> LifecycleState {
        let state = LifecycleState::from_application(application);
        if state == LifecycleState::Pending && self.scheduling.contains(&application.id) {
            LifecycleState::Scheduling
        } else {
            state
        }
    }

    fn record(&mut self, error: LifecycleError) -> LifecycleError {
        let message = error.user_message();
        warn!(actor = %self.actor, %message, "application lifecycle operation failed");
        self.last_error = Some(message);
        error
    }
}

/// Error raised by the lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("application {0} is not in the current list")]
    UnknownApplication(ApplicationId),
}

impl LifecycleError {
    /// One display string regardless of where the failure came from.
    pub fn user_message(&self) -> String {
        match self {
            LifecycleError::Rejected(reason) => reason.to_string(),
            LifecycleError::Api(err) => err.user_message(),
            LifecycleError::UnknownApplication(_) => self.to_string(),
        }
    }

    /// Failures caught locally, before any request went out.
    pub fn is_local(&self) -> bool {
        !matches!(self, LifecycleError::Api(_))
    }
}
