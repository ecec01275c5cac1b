use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

use crate::client::ApiError;
use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationStatus, Interview, InterviewSlot, StatusUpdate,
};
use crate::workflows::applications::{ApplicationGateway, ApplicationLifecycleController};
use crate::workflows::directory::{PositionId, Role, StudentId};

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date")
}

pub(super) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn slot(day: u32, hour: u32, minute: u32) -> InterviewSlot {
    InterviewSlot::new(date(day), time(hour, minute), "Building B, room 12")
}

pub(super) fn pending(id: u64) -> Application {
    Application {
        id: ApplicationId(id),
        student_id: StudentId(100 + id),
        position_id: PositionId(7),
        status: ApplicationStatus::Pending,
        interview_date: None,
        interview_time: None,
        interview_location: None,
    }
}

pub(super) fn with_status(id: u64, status: ApplicationStatus, slot: &InterviewSlot) -> Application {
    Application {
        status,
        interview_date: Some(slot.date),
        interview_time: Some(slot.time),
        interview_location: Some(slot.location.clone()),
        ..pending(id)
    }
}

pub(super) fn interviewing(id: u64, slot: &InterviewSlot) -> Application {
    with_status(id, ApplicationStatus::Interviewing, slot)
}

pub(super) fn interview_of(application: &Application) -> Interview {
    Interview {
        id: application.id,
        student_id: application.student_id,
        position_id: application.position_id,
        interview_date: application.interview_date,
        interview_time: application.interview_time,
        interview_location: application.interview_location.clone(),
    }
}

/// Two confirmed interviews: application 1 on May 1st 09:00, application 2 on May 2nd 10:00.
pub(super) fn seeded_applications() -> Vec<Application> {
    vec![
        interviewing(1, &slot(1, 9, 0)),
        interviewing(2, &slot(2, 10, 0)),
        pending(3),
        pending(4),
    ]
}

#[derive(Default)]
struct GatewayState {
    applications: Vec<Application>,
    application_fetches: usize,
    interview_fetches: usize,
    updates: Vec<(ApplicationId, StatusUpdate)>,
    deletes: Vec<ApplicationId>,
    reject_mutations_with: Option<String>,
    refuse_fetches: bool,
}

/// In-memory backend: applies mutations to its own list and derives interviews from it.
#[derive(Default, Clone)]
pub(super) struct MemoryGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl MemoryGateway {
    pub(super) fn with_applications(applications: Vec<Application>) -> Self {
        let gateway = Self::default();
        gateway.lock().applications = applications;
        gateway
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().expect("gateway mutex poisoned")
    }

    pub(super) fn application_fetches(&self) -> usize {
        self.lock().application_fetches
    }

    pub(super) fn interview_fetches(&self) -> usize {
        self.lock().interview_fetches
    }

    pub(super) fn updates(&self) -> Vec<(ApplicationId, StatusUpdate)> {
        self.lock().updates.clone()
    }

    pub(super) fn deletes(&self) -> Vec<ApplicationId> {
        self.lock().deletes.clone()
    }

    pub(super) fn reject_mutations_with(&self, message: &str) {
        self.lock().reject_mutations_with = Some(message.to_string());
    }

    pub(super) fn refuse_fetches(&self) {
        self.lock().refuse_fetches = true;
    }

    /// Another operator's change, visible on the next fetch.
    pub(super) fn replace(&self, application: Application) {
        let mut state = self.lock();
        if let Some(existing) = state
            .applications
            .iter_mut()
            .find(|existing| existing.id == application.id)
        {
            *existing = application;
        }
    }
}

impl ApplicationGateway for MemoryGateway {
    async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        let mut state = self.lock();
        if state.refuse_fetches {
            return Err(ApiError::Unauthorized);
        }
        state.application_fetches += 1;
        Ok(state.applications.clone())
    }

    async fn list_interviews(&self) -> Result<Vec<Interview>, ApiError> {
        let mut state = self.lock();
        if state.refuse_fetches {
            return Err(ApiError::Unauthorized);
        }
        state.interview_fetches += 1;
        Ok(state
            .applications
            .iter()
            .filter(|application| application.status.requires_interview())
            .map(interview_of)
            .collect())
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        if let Some(message) = state.reject_mutations_with.clone() {
            return Err(ApiError::Rejected {
                status: 400,
                message,
            });
        }
        state.updates.push((id, update.clone()));
        let application = state
            .applications
            .iter_mut()
            .find(|application| application.id == id)
            .ok_or(ApiError::Rejected {
                status: 404,
                message: "Application not found".to_string(),
            })?;
        application.status = update.status;
        application.interview_date = update.interview_date;
        application.interview_time = update.interview_time;
        application.interview_location = update.interview_location.clone();
        Ok(())
    }

    async fn delete_application(&self, id: ApplicationId) -> Result<(), ApiError> {
        let mut state = self.lock();
        if let Some(message) = state.reject_mutations_with.clone() {
            return Err(ApiError::Rejected {
                status: 400,
                message,
            });
        }
        state.deletes.push(id);
        state.applications.retain(|application| application.id != id);
        Ok(())
    }
}

pub(super) async fn loaded_controller(
    role: Role,
) -> (ApplicationLifecycleController<MemoryGateway>, MemoryGateway) {
    let gateway = MemoryGateway::with_applications(seeded_applications());
    let mut controller = ApplicationLifecycleController::new(Arc::new(gateway.clone()), role);
    controller.refresh().await.expect("initial fetch succeeds");
    (controller, gateway)
}
