use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use itax_core::TaxDeadline;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::app::AppContext;
use crate::cli::DeadlineCommand;
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct DeadlineRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Due")]
    due_date: NaiveDate,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Status")]
    status: String,
}

fn status(
    deadline: &TaxDeadline,
    today: NaiveDate,
) -> String {
    if deadline.completed {
        return "done".to_string();
    }
    match deadline.days_remaining(today) {
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        -1 => "overdue by 1 day".to_string(),
        days if days > 0 => format!("in {days} days"),
        days => format!("overdue by {} days", -days),
    }
}

pub(super) async fn run(
    ctx: &AppContext,
    command: DeadlineCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        DeadlineCommand::List { pending } => {
            let deadlines = ctx
                .repo
                .list_deadlines(ctx.assessment_year, pending)
                .await
                .context("Failed to read deadlines")?;
            let today = Local::now().date_naive();
            let rows: Vec<DeadlineRow> = deadlines
                .iter()
                .map(|d| DeadlineRow {
                    id: d.id,
                    due_date: d.due_date,
                    title: d.title.clone(),
                    category: d.category.as_str(),
                    status: status(d, today),
                })
                .collect();
            writeln!(out, "{}", output::render(ctx.output, &deadlines, &rows)?)?;
        }
        DeadlineCommand::Complete { id, undo } => {
            ctx.repo
                .set_deadline_completed(id, !undo)
                .await
                .with_context(|| format!("Failed to update deadline {id}"))?;
            info!(id, completed = !undo, "updated deadline");
            if undo {
                writeln!(out, "Deadline #{id} reopened.")?;
            } else {
                writeln!(out, "Deadline #{id} marked complete.")?;
            }
        }
    }
    Ok(())
}
