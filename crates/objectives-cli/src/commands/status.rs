//! The `objectives status` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use objectives_core::traits::TextLookup;

use super::{format_time, open_engine};

#[derive(Serialize)]
struct StatusRow {
    name: String,
    state: String,
    unlocked: bool,
    completed_tasks: usize,
    total_tasks: usize,
    accomplished_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn execute(config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let (engine, config) = open_engine(config_path).await?;

    let mut rows = Vec::new();
    for objective in engine.session().objectives() {
        let (completed, total) = objective.progress();
        rows.push(StatusRow {
            name: objective.name().to_string(),
            state: objective.state().to_string(),
            unlocked: engine.is_unlocked(objective.name())?,
            completed_tasks: completed,
            total_tasks: total,
            accomplished_at: objective.accomplished_at(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Objective", "Title", "State", "Tasks", "Gate", "Accomplished"]);

    for (row, objective) in rows.iter().zip(engine.session().objectives()) {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(config.strings.text(objective.title())),
            Cell::new(&row.state),
            Cell::new(format!("{}/{}", row.completed_tasks, row.total_tasks)),
            Cell::new(if row.unlocked { "open" } else { "closed" }),
            Cell::new(row.accomplished_at.map(format_time).unwrap_or_default()),
        ]);
    }

    println!("{table}");
    Ok(())
}
