use crate::dashboard::{apply_cells, print_page};
use crate::infra::{parse_role, Console};
use clap::{Args, Subcommand};
use placement::error::AppError;
use placement::session::login;
use placement::views::{render_table, Table, TableRow};
use placement::workflows::directory::{
    CompanyId, NewAccount, PositionDraft, PositionId, PositionStatus, Role,
};
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) username: String,
    /// Password; read from PLACEMENT_PASSWORD when omitted
    #[arg(long, env = "PLACEMENT_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Show only this page (1-based) of the list
    #[arg(long)]
    pub(crate) page: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// Position to apply for
    pub(crate) position: u64,
}

#[derive(Subcommand, Debug)]
pub(crate) enum PositionsCommand {
    /// List positions
    List(ListArgs),
    /// Publish a new position (admins)
    Create(PositionFields),
    /// Change fields of an existing position (admins)
    Update {
        id: u64,
        #[command(flatten)]
        fields: PositionChanges,
    },
    /// Remove a position (admins)
    Delete { id: u64 },
}

#[derive(Args, Debug)]
pub(crate) struct PositionFields {
    #[arg(long)]
    pub(crate) company_id: u64,
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    #[arg(long)]
    pub(crate) slots: u32,
    #[arg(long, default_value = "open", value_parser = parse_position_status)]
    pub(crate) status: PositionStatus,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PositionChanges {
    #[arg(long)]
    pub(crate) company_id: Option<u64>,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) slots: Option<u32>,
    #[arg(long, value_parser = parse_position_status)]
    pub(crate) status: Option<PositionStatus>,
}

impl PositionChanges {
    fn apply_to(self, draft: &mut PositionDraft) {
        if let Some(company_id) = self.company_id {
            draft.company_id = CompanyId(company_id);
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(slots) = self.slots {
            draft.slots = slots;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum AccountsCommand {
    /// List login accounts
    List(ListArgs),
    /// Register a new account
    Create(AccountFields),
}

#[derive(Args, Debug)]
pub(crate) struct AccountFields {
    #[arg(long)]
    pub(crate) username: String,
    #[arg(long, env = "PLACEMENT_NEW_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: Role,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum DirectoryList {
    Companies,
    Students,
}

fn parse_position_status(raw: &str) -> Result<PositionStatus, String> {
    raw.parse()
        .map_err(|err: placement::workflows::directory::UnknownVariant| err.to_string())
}

/// Print a whole list, or one page of it when `page` is given.
pub(crate) fn print_list<T>(
    console: &Console,
    rows: &[T],
    page: Option<usize>,
    actions: Option<Vec<String>>,
) -> Result<(), AppError>
where
    T: TableRow + Serialize,
{
    if let Some(number) = page {
        return print_page(console, &console.paginator().page(rows, number), actions);
    }

    let mut table = Table::from_rows(rows);
    if let Some(cells) = actions {
        table = table.with_column("Actions", cells);
    }
    print!("{}", render_table(table, rows, console.format)?);
    Ok(())
}

pub(crate) async fn run_login(console: &Console, args: LoginArgs) -> Result<(), AppError> {
    let session = login(&console.client, &args.username, &args.password).await?;
    console.store.save(&session)?;
    println!(
        "Logged in as {} ({})",
        session.user().username,
        session.role()
    );
    Ok(())
}

pub(crate) fn run_logout(console: &Console) -> Result<(), AppError> {
    match console.store.discard()? {
        Some(session) => {
            info!(username = %session.user().username, "session closed");
            println!("Logged out {}", session.user().username);
        }
        None => println!("No stored session"),
    }
    Ok(())
}

pub(crate) async fn run_whoami(console: &Console) -> Result<(), AppError> {
    let api = console.session().await?;
    let user = api.session().user();
    println!("{} <{}> ({}, account {})", user.username, user.email, user.role, user.id);
    Ok(())
}

pub(crate) async fn run_positions(
    console: &Console,
    command: PositionsCommand,
) -> Result<(), AppError> {
    match command {
        PositionsCommand::List(args) => {
            let api = console.session().await?;
            let positions = api.list_positions().await?;
            let actions =
                (api.session().role() == Role::Student).then(|| apply_cells(&positions));
            print_list(console, &positions, args.page, actions)
        }
        PositionsCommand::Create(fields) => {
            let api = console.session_as(&[Role::Admin]).await?;
            let draft = PositionDraft {
                company_id: CompanyId(fields.company_id),
                title: fields.title,
                description: fields.description,
                slots: fields.slots,
                status: fields.status,
            };
            api.create_position(&draft).await?;
            println!("Created position '{}'", draft.title);
            Ok(())
        }
        PositionsCommand::Update { id, fields } => {
            let api = console.session_as(&[Role::Admin]).await?;
            let id = PositionId(id);
            let positions = api.list_positions().await?;
            let existing = positions
                .iter()
                .find(|position| position.id == id)
                .ok_or_else(|| AppError::Input(format!("position {id} does not exist")))?;
            let mut draft = existing.to_draft();
            fields.apply_to(&mut draft);
            api.update_position(id, &draft).await?;
            println!("Updated position {id}");
            Ok(())
        }
        PositionsCommand::Delete { id } => {
            let api = console.session_as(&[Role::Admin]).await?;
            let id = PositionId(id);
            api.delete_position(id).await?;
            println!("Deleted position {id}");
            Ok(())
        }
    }
}

pub(crate) async fn run_apply(console: &Console, args: ApplyArgs) -> Result<(), AppError> {
    let api = console.session_as(&[Role::Student]).await?;
    let id = PositionId(args.position);
    let positions = api.list_positions().await?;
    let position = positions
        .iter()
        .find(|position| position.id == id)
        .ok_or_else(|| AppError::Input(format!("position {id} does not exist")))?;
    if !position.accepts_applications() {
        return Err(AppError::Input(format!(
            "position {id} is not open for applications"
        )));
    }

    api.apply(id).await?;
    println!("Applied to '{}' (position {id})", position.title);
    Ok(())
}

pub(crate) async fn run_accounts(
    console: &Console,
    command: AccountsCommand,
) -> Result<(), AppError> {
    let api = console.session_as(&[Role::Admin]).await?;
    match command {
        AccountsCommand::List(args) => {
            let accounts = api.list_accounts().await?;
            print_list(console, &accounts, args.page, None)
        }
        AccountsCommand::Create(fields) => {
            let account = NewAccount {
                username: fields.username,
                password: fields.password,
                email: fields.email,
                role: fields.role,
            };
            let created = api.register_account(&account).await?;
            println!(
                "Registered {} as {} (account {})",
                account.username, account.role, created.account_id
            );
            Ok(())
        }
    }
}

pub(crate) async fn run_directory_list(
    console: &Console,
    list: DirectoryList,
    args: ListArgs,
) -> Result<(), AppError> {
    let api = console.session_as(&[Role::Admin]).await?;
    match list {
        DirectoryList::Companies => {
            let companies = api.list_companies().await?;
            print_list(console, &companies, args.page, None)
        }
        DirectoryList::Students => {
            let students = api.list_students().await?;
            print_list(console, &students, args.page, None)
        }
    }
}
