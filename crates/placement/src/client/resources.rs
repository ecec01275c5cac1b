use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{ApiError, PlacementClient};
use crate::session::Session;
use crate::workflows::applications::{
    Application, ApplicationGateway, ApplicationId, Interview, NewApplication, StatusUpdate,
};
use crate::workflows::directory::{
    Account, AccountCreated, Company, InternshipPosition, NewAccount, PositionDraft, PositionId,
    Student,
};

/// Authenticated view of the backend: every request carries the session's bearer token.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: PlacementClient,
    session: Session,
}

impl SessionClient {
    pub fn new(client: PlacementClient, session: Session) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .request(method, path)?
            .bearer_auth(self.session.token()))
    }

    async fn get_list<T>(&self, path: &str) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.authorized(Method::GET, path)?;
        self.client.send_json(request).await
    }

    async fn send_body<B>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.authorized(method, path)?.json(body);
        self.client.send_empty(request).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, path)?;
        self.client.send_empty(request).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let mut accounts: Vec<Account> = self.get_list("api/accounts").await?;
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    pub async fn register_account(&self, account: &NewAccount) -> Result<AccountCreated, ApiError> {
        let request = self
            .authorized(Method::POST, "api/auth/register")?
            .json(account);
        let created: AccountCreated = self.client.send_json(request).await?;
        info!(account_id = %created.account_id, role = %account.role, "account registered");
        Ok(created)
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        let mut companies: Vec<Company> = self.get_list("api/companies").await?;
        companies.sort_by_key(|company| company.id);
        Ok(companies)
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        let mut students: Vec<Student> = self.get_list("api/students").await?;
        students.sort_by_key(|student| student.id);
        Ok(students)
    }

    pub async fn list_positions(&self) -> Result<Vec<InternshipPosition>, ApiError> {
        let mut positions: Vec<InternshipPosition> =
            self.get_list("api/internship-positions").await?;
        positions.sort_by_key(|position| position.id);
        Ok(positions)
    }

    pub async fn create_position(&self, draft: &PositionDraft) -> Result<(), ApiError> {
        self.send_body(Method::POST, "api/internship-positions", draft)
            .await?;
        info!(title = %draft.title, company_id = %draft.company_id, "position created");
        Ok(())
    }

    pub async fn update_position(
        &self,
        id: PositionId,
        draft: &PositionDraft,
    ) -> Result<(), ApiError> {
        self.send_body(Method::PUT, &format!("api/internship-positions/{id}"), draft)
            .await?;
        info!(position_id = %id, "position updated");
        Ok(())
    }

    pub async fn delete_position(&self, id: PositionId) -> Result<(), ApiError> {
        self.delete(&format!("api/internship-positions/{id}")).await?;
        info!(position_id = %id, "position deleted");
        Ok(())
    }

    /// Submit an application for the signed-in student.
    pub async fn apply(&self, position_id: PositionId) -> Result<(), ApiError> {
        self.send_body(
            Method::POST,
            "api/applications",
            &NewApplication { position_id },
        )
        .await?;
        info!(position_id = %position_id, "application submitted");
        Ok(())
    }

    pub async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        let mut applications: Vec<Application> = self.get_list("api/applications").await?;
        applications.sort_by_key(|application| application.id);
        Ok(applications)
    }

    pub async fn list_interviews(&self) -> Result<Vec<Interview>, ApiError> {
        let mut interviews: Vec<Interview> =
            self.get_list("api/applications/interviews").await?;
        interviews.sort_by_key(|interview| interview.id);
        Ok(interviews)
    }

    pub async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        self.send_body(Method::PUT, &format!("api/applications/{id}/status"), update)
            .await
    }

    pub async fn delete_application(&self, id: ApplicationId) -> Result<(), ApiError> {
        self.delete(&format!("api/applications/{id}")).await
    }
}

impl ApplicationGateway for SessionClient {
    async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        SessionClient::list_applications(self).await
    }

    async fn list_interviews(&self) -> Result<Vec<Interview>, ApiError> {
        SessionClient::list_interviews(self).await
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        SessionClient::update_status(self, id, update).await
    }

    async fn delete_application(&self, id: ApplicationId) -> Result<(), ApiError> {
        SessionClient::delete_application(self, id).await
    }
}
