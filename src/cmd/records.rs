use clap::{Args, Subcommand};
use serde::Serialize;

use crate::context::AppContext;
use crate::domain::ticket::ChangeRequestDraft;
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecordsCommand {
    /// List change requests from the configured table.
    List,
    /// Create a change request. Unset fields fall back to the example payload.
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    #[arg(long)]
    pub short_description: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Planned start, in the instance's date-time format.
    #[arg(long)]
    pub work_start: Option<String>,
    /// Planned end, in the instance's date-time format.
    #[arg(long)]
    pub work_end: Option<String>,
}

impl CreateArgs {
    pub fn into_draft(self) -> ChangeRequestDraft {
        let example = ChangeRequestDraft::default();
        ChangeRequestDraft {
            short_description: self.short_description.or(example.short_description),
            description: self.description.or(example.description),
            priority: self.priority.or(example.priority),
            work_start: self.work_start.or(example.work_start),
            work_end: self.work_end.or(example.work_end),
        }
    }
}

pub async fn run(ctx: &AppContext, command: RecordsCommand) -> AppResult<()> {
    match command {
        RecordsCommand::List => {
            let records = require(ctx.adapter.get_record().await?, "listing change requests")?;
            print_json(&records)
        }
        RecordsCommand::Create(args) => {
            let draft = args.into_draft();
            let record = require(
                ctx.adapter.post_record(&draft).await?,
                "creating a change request",
            )?;
            print_json(&record)
        }
    }
}

fn require<T>(value: Option<T>, action: &str) -> AppResult<T> {
    value.ok_or_else(|| {
        AppError::UnusableResponse(format!(
            "ServiceNow answered but the body could not be read while {action}; see logs"
        ))
    })
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
