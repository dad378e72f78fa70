//! Tally CLI - command-line client for the Tally HR/timesheet API.
//!
//! Run `tally --help` for usage information.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::Datelike;
use console::style;
use tally_api::api::TimesheetFilter;
use tally_api::models::{BulkFill, ListParams, NewLeaveRequest, NewTimeEntry, TimesheetStatus};
use tally_api::{ApiClient, Args, Command, Config, SessionStore};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    setup_logging(&args);

    let config = match Config::from_args(&args) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let session = SessionStore::with_file(session_file(&args))?;
    let client = ApiClient::new(config, session)?;

    if let Err(e) = run(&client, &args).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(client: &ApiClient, args: &Args) -> Result<()> {
    match &args.command {
        Command::Login { email, password } => {
            client.auth().login(email, password).await?;
            let me = client.auth().me().await?;
            println!(
                "{} Logged in as {} ({:?})",
                style("✓").green().bold(),
                me.name,
                me.role
            );
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("{} Logged out", style("✓").green().bold());
        }
        Command::Whoami => {
            let me = client.auth().me().await?;
            if args.json {
                println!("{}", serde_json::to_string(&me)?);
            } else {
                println!("{} <{}> {:?}", style(&me.name).bold(), me.email, me.role);
            }
        }
        Command::Timesheets { status, page } => {
            let filter = TimesheetFilter {
                status: status.as_deref().map(parse_status).transpose()?,
                page: Some(*page),
                ..TimesheetFilter::default()
            };
            let sheets = client.timesheets().list(&filter).await?;
            if args.json {
                println!("{}", serde_json::to_string(&sheets)?);
            } else {
                println!(
                    "{} timesheets (page {} of {})",
                    sheets.total,
                    sheets.page,
                    sheets.total.div_ceil(u64::from(sheets.per_page.max(1)))
                );
                for sheet in &sheets.items {
                    println!(
                        "  {}  week of {}  {:>5.1}h  {:?}",
                        sheet.id, sheet.week_start, sheet.total_hours, sheet.status
                    );
                }
            }
        }
        Command::Timesheet { id } => {
            let sheet = client.timesheets().get(id).await?;
            if args.json {
                println!("{}", serde_json::to_string(&sheet)?);
            } else {
                println!(
                    "Timesheet {}, week of {}, {:?}, {:.1}h total",
                    sheet.id, sheet.week_start, sheet.status, sheet.total_hours
                );
                for entry in &sheet.entries {
                    println!(
                        "  {}  {}  {:>4.1}h  project {} / task {}",
                        entry.id, entry.date, entry.hours, entry.project_id, entry.task_id
                    );
                }
            }
        }
        Command::Submit { id } => {
            let sheet = client.timesheets().submit(id).await?;
            println!(
                "{} Submitted timesheet {} ({:?})",
                style("✓").green().bold(),
                sheet.id,
                sheet.status
            );
        }
        Command::Log {
            project,
            task,
            date,
            hours,
            note,
        } => {
            let week_start = *date - chrono::Days::new(u64::from(date.weekday().num_days_from_monday()));
            let sheet = client.timesheets().current(week_start).await?;
            let entry = client
                .entries()
                .create(
                    &sheet.id,
                    &NewTimeEntry {
                        project_id: project.clone(),
                        task_id: task.clone(),
                        date: *date,
                        hours: *hours,
                        note: note.clone(),
                    },
                )
                .await?;
            println!(
                "{} Logged {:.1}h on {} (entry {})",
                style("✓").green().bold(),
                entry.hours,
                entry.date,
                entry.id
            );
        }
        Command::Fill {
            project,
            task,
            dates,
            hours,
        } => {
            let first = dates
                .iter()
                .min()
                .ok_or_else(|| anyhow!("at least one --date is required"))?;
            let week_start =
                *first - chrono::Days::new(u64::from(first.weekday().num_days_from_monday()));
            let sheet = client.timesheets().current(week_start).await?;
            let entries = client
                .entries()
                .bulk_fill(
                    &sheet.id,
                    &BulkFill {
                        project_id: project.clone(),
                        task_id: task.clone(),
                        dates: dates.clone(),
                        hours: *hours,
                    },
                )
                .await?;
            println!(
                "{} Filled {} days at {:.1}h each (timesheet {})",
                style("✓").green().bold(),
                entries.len(),
                hours,
                sheet.id
            );
        }
        Command::Leave => {
            let requests = client.leave().list(&ListParams::default()).await?;
            if args.json {
                println!("{}", serde_json::to_string(&requests)?);
            } else {
                for request in &requests.items {
                    println!(
                        "  {}  {} → {}  {:>4.1}d  {:?}",
                        request.id,
                        request.start_date,
                        request.end_date,
                        request.days,
                        request.status
                    );
                }
            }
        }
        Command::RequestLeave {
            benefit,
            from,
            to,
            reason,
        } => {
            let request = client
                .leave()
                .create(&NewLeaveRequest {
                    benefit_type_id: benefit.clone(),
                    start_date: *from,
                    end_date: *to,
                    reason: reason.clone(),
                })
                .await?;
            println!(
                "{} Requested {:.1} days of leave ({})",
                style("✓").green().bold(),
                request.days,
                request.id
            );
        }
        Command::Balances => {
            let balances = client.leave().balances().await?;
            if args.json {
                println!("{}", serde_json::to_string(&balances)?);
            } else {
                for balance in &balances {
                    println!(
                        "  {:<20} {:>5.1} remaining ({:.1} used)",
                        balance.benefit_name, balance.remaining_days, balance.used_days
                    );
                }
            }
        }
        Command::Projects => {
            let projects = client.projects().list().await?;
            for project in &projects {
                println!(
                    "{} {}",
                    style(&project.id).bold(),
                    project.name
                );
                let tasks = client.projects().tasks(&project.id).await?;
                for task in &tasks {
                    println!("    {}  {}", task.id, task.name);
                }
            }
        }
        Command::Holidays { year } => {
            let year = year.unwrap_or_else(|| chrono::Utc::now().year());
            let holidays = client.calendar().holidays(year).await?;
            for holiday in &holidays {
                println!("  {}  {}", holiday.date, holiday.name);
            }
        }
        Command::ImportUsers { file } => {
            let report = client.users().import(file).await?;
            println!(
                "{} Imported: {} created, {} updated, {} rejected",
                style("✓").green().bold(),
                report.created,
                report.updated,
                report.errors.len()
            );
            for row_error in &report.errors {
                println!(
                    "  {} row {}: {}",
                    style("⚠").yellow().bold(),
                    row_error.row,
                    row_error.message
                );
            }
        }
    }

    Ok(())
}

fn parse_status(s: &str) -> Result<TimesheetStatus> {
    match s {
        "draft" => Ok(TimesheetStatus::Draft),
        "pending" => Ok(TimesheetStatus::Pending),
        "approved" => Ok(TimesheetStatus::Approved),
        "rejected" => Ok(TimesheetStatus::Rejected),
        other => Err(anyhow!(
            "unknown status '{other}' (expected draft, pending, approved, or rejected)"
        )),
    }
}

/// Session file path: explicit flag, or the platform config directory.
fn session_file(args: &Args) -> PathBuf {
    if let Some(path) = &args.session_file {
        return path.clone();
    }
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".config").join("tally").join("session.json")
}

fn setup_logging(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tally_api={level},tally={level}")));

    if args.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .init();
    }
}
