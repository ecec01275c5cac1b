use crate::commands::{
    run_accounts, run_apply, run_directory_list, run_login, run_logout, run_positions,
    run_whoami, AccountsCommand, ApplyArgs, DirectoryList, ListArgs, LoginArgs,
    PositionsCommand,
};
use crate::dashboard::{run_applications, run_dashboard, run_interviews, DashboardArgs};
use crate::infra::{parse_output_format, Console};
use crate::lifecycle::{run_decision, run_schedule, Decision, DecisionArgs, ScheduleArgs};
use clap::{Args, Parser, Subcommand};
use placement::config::{parse_base_url, AppConfig};
use placement::error::AppError;
use placement::telemetry;
use placement::views::OutputFormat;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "placement-console",
    about = "Role-based dashboards for the internship placement service",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Override the configured backend base URL
    #[arg(long, global = true, value_parser = parse_base_url_arg)]
    pub(crate) base_url: Option<String>,
    /// Override the configured rows per page
    #[arg(long, global = true, value_parser = parse_page_size_arg)]
    pub(crate) page_size: Option<usize>,
    /// Output format for tables: table, csv or json
    #[arg(long, global = true, default_value = "table", value_parser = parse_output_format)]
    pub(crate) format: OutputFormat,
    /// Override the configured log filter (e.g. `placement=debug`)
    #[arg(long, global = true)]
    pub(crate) log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session for later commands
    Login(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show the dashboard for the signed-in role
    Dashboard(DashboardArgs),
    /// Manage internship positions
    Positions {
        #[command(subcommand)]
        command: PositionsCommand,
    },
    /// Apply to an open position (students)
    Apply(ApplyArgs),
    /// List applications visible to the signed-in account
    Applications {
        #[command(subcommand)]
        command: ListOnly,
    },
    /// List scheduled interviews
    Interviews {
        #[command(subcommand)]
        command: ListOnly,
    },
    /// Schedule or reschedule an interview (companies)
    Schedule(ScheduleArgs),
    /// Accept an interviewed applicant (companies)
    Accept(DecisionArgs),
    /// Reject an application (companies)
    Reject(DecisionArgs),
    /// Withdraw a pending application (students)
    Cancel(DecisionArgs),
    /// Manage login accounts (admins)
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },
    /// List companies (admins)
    Companies {
        #[command(subcommand)]
        command: ListOnly,
    },
    /// List students (admins)
    Students {
        #[command(subcommand)]
        command: ListOnly,
    },
}

#[derive(Subcommand, Debug)]
enum ListOnly {
    /// Print the list
    List(ListArgs),
}

fn parse_base_url_arg(raw: &str) -> Result<String, String> {
    parse_base_url(raw)
        .map(|_| raw.trim().to_string())
        .map_err(|err| err.to_string())
}

fn parse_page_size_arg(raw: &str) -> Result<usize, String> {
    placement::config::parse_page_size(raw).map_err(|err| err.to_string())
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(base_url) = cli.global.base_url.as_deref() {
        config.api.base_url = parse_base_url(base_url)?;
    }
    if let Some(page_size) = cli.global.page_size {
        config.display.page_size = page_size;
    }
    if let Some(log_level) = cli.global.log_level.clone() {
        config.telemetry.log_level = log_level;
    }

    telemetry::init(&config.telemetry)?;

    let console = Console::new(config, cli.global.format)?;
    let result = dispatch(&console, cli.command).await;

    if let Err(err) = &result {
        if err.is_unauthorized() {
            warn!("backend refused the session, clearing it");
            console.end_session()?;
        }
    }
    result
}

async fn dispatch(console: &Console, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login(args) => run_login(console, args).await,
        Command::Logout => run_logout(console),
        Command::Whoami => run_whoami(console).await,
        Command::Dashboard(args) => run_dashboard(console, args).await,
        Command::Positions { command } => run_positions(console, command).await,
        Command::Apply(args) => run_apply(console, args).await,
        Command::Applications {
            command: ListOnly::List(args),
        } => run_applications(console, args).await,
        Command::Interviews {
            command: ListOnly::List(args),
        } => run_interviews(console, args).await,
        Command::Schedule(args) => run_schedule(console, args).await,
        Command::Accept(args) => run_decision(console, Decision::Accept, args).await,
        Command::Reject(args) => run_decision(console, Decision::Reject, args).await,
        Command::Cancel(args) => run_decision(console, Decision::Cancel, args).await,
        Command::Accounts { command } => run_accounts(console, command).await,
        Command::Companies {
            command: ListOnly::List(args),
        } => run_directory_list(console, DirectoryList::Companies, args).await,
        Command::Students {
            command: ListOnly::List(args),
        } => run_directory_list(console, DirectoryList::Students, args).await,
    }
}
