use super::common::*;
use std::sync::Arc;

use chrono::NaiveTime;

use crate::client::ApiError;
use crate::workflows::applications::domain::{
    ApplicationId, ApplicationStatus, InterviewSlot, StatusUpdate,
};
use crate::workflows::applications::lifecycle::{ActionKind, LifecycleState, RejectionReason};
use crate::workflows::applications::service::LifecycleError;
use crate::workflows::applications::{ApplicationLifecycleController, CONFLICT_MESSAGE};
use crate::workflows::directory::Role;

#[tokio::test]
async fn refresh_loads_both_lists() {
    let (controller, gateway) = loaded_controller(Role::Company).await;

    assert_eq!(controller.board().applications, seeded_applications());
    assert_eq!(controller.board().interviews.len(), 2);
    assert_eq!(gateway.application_fetches(), 1);
    assert_eq!(gateway.interview_fetches(), 1);
    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn scheduling_sends_one_update_then_refetches_once() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;
    let id = ApplicationId(3);

    let state = controller
        .begin_scheduling(id)
        .await
        .expect("pending application opens the form");
    assert_eq!(state, LifecycleState::Scheduling);
    assert_eq!(controller.state_of(id).expect("known"), LifecycleState::Scheduling);
    assert!(gateway.updates().is_empty());
    assert_eq!(gateway.application_fetches(), 1);

    let state = controller
        .submit_schedule(id, slot(1, 9, 1))
        .await
        .expect("09:01 is free");
    assert_eq!(
        state,
        LifecycleState::Interviewing {
            slot: slot(1, 9, 1)
        }
    );

    assert_eq!(
        gateway.updates(),
        vec![(
            id,
            StatusUpdate::with_slot(ApplicationStatus::Interviewing, &slot(1, 9, 1))
        )]
    );
    assert_eq!(gateway.application_fetches(), 2);
    assert_eq!(gateway.interview_fetches(), 2);

    let refreshed = controller.board().application(id).expect("still listed");
    assert_eq!(refreshed.status, ApplicationStatus::Interviewing);
    assert_eq!(controller.board().interviews.len(), 3);
}

#[tokio::test]
async fn conflicting_schedule_never_reaches_the_backend() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;
    let before = controller.board().clone();

    controller
        .begin_scheduling(ApplicationId(3))
        .await
        .expect("form opens");
    let err = controller
        .submit_schedule(ApplicationId(3), slot(1, 9, 0))
        .await
        .expect_err("slot is taken by application 1");

    assert!(matches!(
        err,
        LifecycleError::Rejected(RejectionReason::ScheduleConflict { .. })
    ));
    assert!(err.is_local());
    assert_eq!(controller.last_error(), Some(CONFLICT_MESSAGE));
    assert!(gateway.updates().is_empty());
    assert_eq!(gateway.application_fetches(), 1);
    assert_eq!(gateway.interview_fetches(), 1);
    assert_eq!(controller.board(), &before);
    assert_eq!(
        controller.state_of(ApplicationId(3)).expect("known"),
        LifecycleState::Scheduling
    );
}

#[tokio::test]
async fn reject_from_pending_carries_fields_and_refetches() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;

    let state = controller
        .reject(ApplicationId(4))
        .await
        .expect("pending applications can be rejected");
    assert_eq!(state, LifecycleState::Rejected);

    assert_eq!(
        gateway.updates(),
        vec![(
            ApplicationId(4),
            StatusUpdate {
                status: ApplicationStatus::Rejected,
                interview_date: None,
                interview_time: None,
                interview_location: None,
            }
        )]
    );
    assert_eq!(gateway.application_fetches(), 2);
    assert!(controller
        .available_actions(ApplicationId(4))
        .expect("known")
        .is_empty());
}

#[tokio::test]
async fn accept_keeps_the_confirmed_slot() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;

    let state = controller
        .accept(ApplicationId(2))
        .await
        .expect("interviewing applications can be accepted");
    assert_eq!(
        state,
        LifecycleState::Accepted {
            slot: Some(slot(2, 10, 0))
        }
    );
    assert_eq!(
        gateway.updates(),
        vec![(
            ApplicationId(2),
            StatusUpdate::with_slot(ApplicationStatus::Accepted, &slot(2, 10, 0))
        )]
    );

    let accepted = controller
        .board()
        .application(ApplicationId(2))
        .expect("still listed");
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
    assert_eq!(accepted.interview_slot(), Some(slot(2, 10, 0)));
}

#[tokio::test]
async fn backend_rejection_leaves_board_untouched() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;
    let before = controller.board().clone();
    gateway.reject_mutations_with("Position has no free slots");

    let err = controller
        .accept(ApplicationId(1))
        .await
        .expect_err("backend refuses");

    assert!(matches!(err, LifecycleError::Api(ApiError::Rejected { status: 400, .. })));
    assert!(!err.is_local());
    assert_eq!(controller.last_error(), Some("Position has no free slots"));
    assert_eq!(controller.board(), &before);
    assert_eq!(gateway.application_fetches(), 1);
}

#[tokio::test]
async fn student_cancel_removes_the_application() {
    let (mut controller, gateway) = loaded_controller(Role::Student).await;

    assert_eq!(
        controller.available_actions(ApplicationId(3)).expect("known"),
        vec![ActionKind::Cancel]
    );
    let state = controller
        .cancel(ApplicationId(3))
        .await
        .expect("pending applications can be withdrawn");

    assert_eq!(state, LifecycleState::Withdrawn);
    assert_eq!(gateway.deletes(), vec![ApplicationId(3)]);
    assert!(controller.board().application(ApplicationId(3)).is_none());
    assert!(matches!(
        controller.state_of(ApplicationId(3)),
        Err(LifecycleError::UnknownApplication(ApplicationId(3)))
    ));
}

#[tokio::test]
async fn students_see_no_actions_past_pending() {
    let (mut controller, gateway) = loaded_controller(Role::Student).await;

    assert!(controller
        .available_actions(ApplicationId(1))
        .expect("known")
        .is_empty());
    let err = controller
        .cancel(ApplicationId(1))
        .await
        .expect_err("interviewing applications cannot be withdrawn");
    assert!(err.is_local());
    assert!(gateway.deletes().is_empty());
}

#[tokio::test]
async fn abandoning_the_form_returns_to_pending() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;
    let id = ApplicationId(4);

    controller.begin_scheduling(id).await.expect("form opens");
    assert!(controller.abandon_scheduling(id));
    assert!(!controller.abandon_scheduling(id));
    assert_eq!(controller.state_of(id).expect("known"), LifecycleState::Pending);
    assert!(gateway.updates().is_empty());
}

#[tokio::test]
async fn unknown_application_is_reported() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;

    let err = controller
        .reject(ApplicationId(99))
        .await
        .expect_err("application 99 was never fetched");
    assert!(matches!(err, LifecycleError::UnknownApplication(ApplicationId(99))));
    assert_eq!(
        controller.last_error(),
        Some("application 99 is not in the current list")
    );
    assert!(gateway.updates().is_empty());
}

#[tokio::test]
async fn refresh_picks_up_external_changes() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;

    controller.begin_scheduling(ApplicationId(3)).await.expect("form opens");
    let mut changed = pending(3);
    changed.status = ApplicationStatus::Rejected;
    gateway.replace(changed);

    controller.refresh().await.expect("refetch succeeds");
    controller.refresh().await.expect("refetch is repeatable");

    assert_eq!(
        controller.state_of(ApplicationId(3)).expect("known"),
        LifecycleState::Rejected
    );
    assert!(!controller.abandon_scheduling(ApplicationId(3)));
    assert_eq!(gateway.application_fetches(), 3);
}

#[tokio::test]
async fn refused_fetch_surfaces_unauthorized() {
    let (mut controller, gateway) = loaded_controller(Role::Company).await;
    let before = controller.board().clone();
    gateway.refuse_fetches();

    let err = controller.refresh().await.expect_err("session expired");
    assert!(matches!(err, LifecycleError::Api(ApiError::Unauthorized)));
    assert!(controller.last_error().is_some());
    assert_eq!(controller.board(), &before);
}

#[tokio::test]
async fn accept_sends_the_stored_time_back_with_its_seconds() {
    let stored = InterviewSlot::new(
        date(3),
        NaiveTime::from_hms_opt(9, 0, 30).expect("valid time"),
        "R1",
    );
    let gateway = MemoryGateway::with_applications(vec![interviewing(9, &stored)]);
    let mut controller =
        ApplicationLifecycleController::new(Arc::new(gateway.clone()), Role::Company);
    controller.refresh().await.expect("initial fetch succeeds");

    controller
        .accept(ApplicationId(9))
        .await
        .expect("interviewing applications can be accepted");

    let updates = gateway.updates();
    assert_eq!(updates.len(), 1);
    let body = serde_json::to_value(&updates[0].1).expect("update serializes");
    assert_eq!(body["interviewTime"], "09:00:30");
    assert_eq!(body["interviewDate"], "2024-05-03");
    assert_eq!(body["status"], "accepted");
}
