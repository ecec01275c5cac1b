use crate::commands::ListArgs;
use crate::infra::Console;
use clap::Args;
use placement::client::SessionClient;
use placement::error::AppError;
use placement::pagination::{DashboardPages, DashboardTab, Page};
use placement::views::{page_footer, render_table, OutputFormat, Table, TableRow};
use placement::workflows::applications::{ActionKind, ApplicationLifecycleController};
use placement::workflows::directory::{InternshipPosition, Role};
use serde::Serialize;
use std::sync::Arc;

type Controller = ApplicationLifecycleController<SessionClient>;

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Show only this tab
    #[arg(long, value_parser = parse_tab)]
    pub(crate) tab: Option<DashboardTab>,
    /// Page (1-based) to show on every displayed tab
    #[arg(long)]
    pub(crate) page: Option<usize>,
}

fn parse_tab(raw: &str) -> Result<DashboardTab, String> {
    raw.parse()
        .map_err(|err: placement::workflows::directory::UnknownVariant| err.to_string())
}

/// Console command that performs an offered action.
fn command_hint(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::AcceptForInterview | ActionKind::SubmitSchedule => "schedule",
        ActionKind::Accept => "accept",
        ActionKind::Reject => "reject",
        ActionKind::Cancel => "cancel",
    }
}

fn action_cells(controller: &Controller) -> Vec<String> {
    controller
        .board()
        .applications
        .iter()
        .map(|application| {
            let mut hints: Vec<&str> = controller
                .available_actions(application.id)
                .unwrap_or_default()
                .into_iter()
                .map(command_hint)
                .collect();
            hints.dedup();
            hints.join(", ")
        })
        .collect()
}

pub(crate) fn apply_cells(positions: &[InternshipPosition]) -> Vec<String> {
    positions
        .iter()
        .map(|position| {
            if position.accepts_applications() {
                "apply".to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

/// Print one page of rows; `actions` holds one cell per row of the full list.
pub(crate) fn print_page<T>(
    console: &Console,
    page: &Page<'_, T>,
    actions: Option<Vec<String>>,
) -> Result<(), AppError>
where
    T: TableRow + Serialize,
{
    let mut table = Table::from_rows(page.items);
    if let Some(cells) = actions {
        let cells = cells
            .into_iter()
            .skip(page.offset)
            .take(page.items.len())
            .collect();
        table = table.with_column("Actions", cells);
    }
    print!("{}", render_table(table, page.items, console.format)?);

    let footer = page_footer(page);
    if !footer.is_empty() && console.format == OutputFormat::Table {
        println!("{footer}");
    }
    Ok(())
}

async fn load_board(api: &Arc<SessionClient>, role: Role) -> Result<Controller, AppError> {
    let mut controller = ApplicationLifecycleController::new(Arc::clone(api), role);
    controller.refresh().await?;
    Ok(controller)
}

pub(crate) async fn run_dashboard(console: &Console, args: DashboardArgs) -> Result<(), AppError> {
    let api = Arc::new(console.session().await?);
    let role = api.session().role();
    let available = DashboardTab::for_role(role);

    let tabs: Vec<DashboardTab> = match args.tab {
        Some(tab) if available.contains(&tab) => vec![tab],
        Some(tab) => {
            return Err(AppError::Input(format!(
                "the {role} dashboard has no {tab} tab"
            )))
        }
        None => available.to_vec(),
    };

    let mut pages = DashboardPages::new(console.paginator());
    if let Some(page) = args.page {
        for tab in &tabs {
            pages.go_to(*tab, page);
        }
    }

    // Applications and interviews come from one fetch of the lifecycle board.
    let needs_board = tabs
        .iter()
        .any(|tab| matches!(tab, DashboardTab::Applications | DashboardTab::Interviews));
    let board = if needs_board {
        match load_board(&api, role).await {
            Ok(controller) => Some(Ok(controller)),
            Err(err) if err.is_unauthorized() => return Err(err),
            Err(err) => Some(Err(err.to_string())),
        }
    } else {
        None
    };

    if console.format == OutputFormat::Table {
        println!(
            "{} dashboard for {}",
            role.label(),
            api.session().user().username
        );
    }

    for tab in tabs {
        if console.format == OutputFormat::Table {
            println!("\n== {tab} ==");
        }
        let outcome = render_tab(console, &api, &mut pages, tab, board.as_ref()).await;
        match outcome {
            Ok(()) => {}
            Err(err) if err.is_unauthorized() => return Err(err),
            // Failures stay beside the affected table; the other tabs still render.
            Err(err) => println!("! {err}"),
        }
    }
    Ok(())
}

async fn render_tab(
    console: &Console,
    api: &SessionClient,
    pages: &mut DashboardPages,
    tab: DashboardTab,
    board: Option<&Result<Controller, String>>,
) -> Result<(), AppError> {
    let role = api.session().role();
    match tab {
        DashboardTab::Accounts => {
            let rows = api.list_accounts().await?;
            print_page(console, &pages.view(tab, &rows), None)
        }
        DashboardTab::Companies => {
            let rows = api.list_companies().await?;
            print_page(console, &pages.view(tab, &rows), None)
        }
        DashboardTab::Students => {
            let rows = api.list_students().await?;
            print_page(console, &pages.view(tab, &rows), None)
        }
        DashboardTab::Positions => {
            let rows = api.list_positions().await?;
            let actions = (role == Role::Student).then(|| apply_cells(&rows));
            print_page(console, &pages.view(tab, &rows), actions)
        }
        DashboardTab::Applications | DashboardTab::Interviews => {
            let controller = match board {
                Some(Ok(controller)) => controller,
                Some(Err(message)) => {
                    println!("! {message}");
                    return Ok(());
                }
                None => return Ok(()),
            };
            let lists = controller.board();
            if tab == DashboardTab::Applications {
                let actions = Some(action_cells(controller));
                print_page(console, &pages.view(tab, &lists.applications), actions)
            } else {
                print_page(console, &pages.view(tab, &lists.interviews), None)
            }
        }
    }
}

pub(crate) async fn run_applications(console: &Console, args: ListArgs) -> Result<(), AppError> {
    let api = Arc::new(console.session().await?);
    let controller = load_board(&api, api.session().role()).await?;
    let actions = action_cells(&controller);
    crate::commands::print_list(
        console,
        &controller.board().applications,
        args.page,
        Some(actions),
    )
}

/// Any role may read interviews; the backend scopes the list, and the lifecycle board
/// fetches it for students too.
pub(crate) async fn run_interviews(console: &Console, args: ListArgs) -> Result<(), AppError> {
    let api = console.session().await?;
    let interviews = api.list_interviews().await?;
    crate::commands::print_list(console, &interviews, args.page, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement::workflows::directory::{CompanyId, PositionId, PositionStatus};

    #[test]
    fn both_scheduling_steps_map_to_the_schedule_command() {
        assert_eq!(command_hint(ActionKind::AcceptForInterview), "schedule");
        assert_eq!(command_hint(ActionKind::SubmitSchedule), "schedule");
        assert_eq!(command_hint(ActionKind::Cancel), "cancel");
    }

    #[test]
    fn only_open_positions_offer_apply() {
        let open = InternshipPosition {
            id: PositionId(7),
            company_id: CompanyId(3),
            title: "Backend intern".to_string(),
            description: String::new(),
            slots: 2,
            status: PositionStatus::Open,
        };
        let closed = InternshipPosition {
            id: PositionId(8),
            status: PositionStatus::Closed,
            ..open.clone()
        };
        assert_eq!(apply_cells(&[open, closed]), vec!["apply", ""]);
    }

    #[test]
    fn tab_argument_is_case_insensitive() {
        assert_eq!(parse_tab("Positions"), Ok(DashboardTab::Positions));
        assert!(parse_tab("reports").is_err());
    }
}
