use std::future::Future;

use super::domain::{Application, ApplicationId, Interview, StatusUpdate};
use crate::client::ApiError;

/// Backend abstraction so the lifecycle controller can be exercised without a network.
///
/// `SessionClient` is the HTTP implementation; tests substitute in-memory fakes.
pub trait ApplicationGateway: Send + Sync {
    fn list_applications(&self)
        -> impl Future<Output = Result<Vec<Application>, ApiError>> + Send;

    fn list_interviews(&self) -> impl Future<Output = Result<Vec<Interview>, ApiError>> + Send;

    fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_application(
        &self,
        id: ApplicationId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
