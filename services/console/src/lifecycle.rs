use crate::infra::{parse_date, parse_time, Console};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use placement::client::SessionClient;
use placement::error::AppError;
use placement::views::{render, OutputFormat};
use placement::workflows::applications::{
    ApplicationId, ApplicationLifecycleController, InterviewSlot, LifecycleState,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScheduleArgs {
    /// Application to schedule
    pub(crate) application: u64,
    /// Interview date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    /// Interview time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub(crate) time: NaiveTime,
    #[arg(long)]
    pub(crate) location: String,
}

#[derive(Args, Debug)]
pub(crate) struct DecisionArgs {
    pub(crate) application: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Accept,
    Reject,
    Cancel,
}

async fn controller(
    console: &Console,
) -> Result<ApplicationLifecycleController<SessionClient>, AppError> {
    let api = console.session().await?;
    let role = api.session().role();
    let mut controller = ApplicationLifecycleController::new(Arc::new(api), role);
    controller.refresh().await?;
    Ok(controller)
}

pub(crate) async fn run_schedule(console: &Console, args: ScheduleArgs) -> Result<(), AppError> {
    let mut controller = controller(console).await?;
    let id = ApplicationId(args.application);

    // A pending application has to pass through the scheduling form first.
    if controller.state_of(id)? == LifecycleState::Pending {
        controller.begin_scheduling(id).await?;
    }
    let state = controller
        .submit_schedule(id, InterviewSlot::new(args.date, args.time, args.location))
        .await?;

    report(console, &controller, id, &state)
}

pub(crate) async fn run_decision(
    console: &Console,
    decision: Decision,
    args: DecisionArgs,
) -> Result<(), AppError> {
    let mut controller = controller(console).await?;
    let id = ApplicationId(args.application);

    let state = match decision {
        Decision::Accept => controller.accept(id).await?,
        Decision::Reject => controller.reject(id).await?,
        Decision::Cancel => controller.cancel(id).await?,
    };

    report(console, &controller, id, &state)
}

fn report(
    console: &Console,
    controller: &ApplicationLifecycleController<SessionClient>,
    id: ApplicationId,
    state: &LifecycleState,
) -> Result<(), AppError> {
    match controller.board().application(id) {
        Some(application) => {
            if console.format == OutputFormat::Table {
                println!("Application {id} is now {state}");
            }
            print!(
                "{}",
                render(std::slice::from_ref(application), console.format)?
            );
        }
        None => println!("Application {id} is now {state}"),
    }
    Ok(())
}
