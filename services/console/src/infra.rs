use chrono::{NaiveDate, NaiveTime};
use placement::client::{PlacementClient, SessionClient};
use placement::config::AppConfig;
use placement::error::AppError;
use placement::pagination::Paginator;
use placement::session::{SessionError, SessionStore};
use placement::views::OutputFormat;
use placement::workflows::directory::Role;

/// Everything a command needs: configuration, the backend transport and the session store.
pub(crate) struct Console {
    pub(crate) config: AppConfig,
    pub(crate) client: PlacementClient,
    pub(crate) store: SessionStore,
    pub(crate) format: OutputFormat,
}

impl Console {
    pub(crate) fn new(config: AppConfig, format: OutputFormat) -> Result<Self, AppError> {
        let client = PlacementClient::new(&config.api)?;
        let store = SessionStore::new(config.session.file.clone());
        Ok(Self {
            config,
            client,
            store,
            format,
        })
    }

    /// Restore and revalidate the stored session.
    pub(crate) async fn session(&self) -> Result<SessionClient, AppError> {
        self.store
            .restore(&self.client)
            .await?
            .ok_or_else(|| SessionError::NotLoggedIn.into())
    }

    /// Restore the session and insist on one of the given roles.
    pub(crate) async fn session_as(&self, roles: &[Role]) -> Result<SessionClient, AppError> {
        let api = self.session().await?;
        require_role(api.session().role(), roles)?;
        Ok(api)
    }

    pub(crate) fn end_session(&self) -> Result<(), AppError> {
        self.store.clear()?;
        Ok(())
    }

    pub(crate) fn paginator(&self) -> Paginator {
        Paginator::new(self.config.display.page_size)
    }
}

pub(crate) fn require_role(role: Role, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        return Ok(());
    }
    let names = allowed
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(AppError::Input(format!(
        "this command needs the {names} role, signed in as {role}"
    )))
}

pub(crate) fn parse_output_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse().map_err(|err: placement::workflows::directory::UnknownVariant| err.to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    placement::wire::parse_date(raw)
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    placement::wire::parse_time(raw)
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|err: placement::workflows::directory::UnknownVariant| err.to_string())
}
