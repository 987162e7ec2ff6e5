pub mod action;
pub mod answer;
pub mod init;
pub mod reset;
pub mod show;
pub mod status;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use objectives_core::catalog::builtin_objectives;
use objectives_core::engine::{GateEngine, GateObserver};
use objectives_core::error::GateError;
use objectives_core::parser;
use objectives_core::session::{GatingSession, TaskOutcome};
use objectives_store::{create_store, load_config_from, GateConfig};

/// Build the session from built-in and configured definitions, bind it to
/// the configured store and restore saved progress.
pub async fn open_engine(config_path: Option<PathBuf>) -> Result<(GateEngine, GateConfig)> {
    let config = load_config_from(config_path.as_deref())?;

    let mut objectives = builtin_objectives()?;
    if let Some(dir) = &config.definitions_dir {
        for template in load_definitions(dir)? {
            let objective = template
                .build()
                .with_context(|| format!("invalid objective '{}'", template.objective.name))?;
            objectives.push(objective);
        }
    }

    let session = GatingSession::new(objectives)?;
    let store = create_store(&config);
    let engine = GateEngine::open(session, store, config.engine_config()).await?;

    Ok((engine, config))
}

fn load_definitions(dir: &Path) -> Result<Vec<parser::ObjectiveTemplate>> {
    if dir.is_dir() {
        parser::load_objective_directory(dir)
    } else {
        tracing::warn!("definitions directory {} does not exist", dir.display());
        Ok(Vec::new())
    }
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Console observer.
pub struct ConsoleObserver;

impl GateObserver for ConsoleObserver {
    fn on_answer(&self, objective: &str, topic: &str, outcome: &TaskOutcome) {
        let verdict = if outcome.completed {
            "completed"
        } else {
            "not completed"
        };
        println!("{objective} :: {topic} -> {verdict}");
        if let Some(until) = outcome.locked_until {
            println!("  Locked until {} after a wrong answer.", format_time(until));
        }
    }

    fn on_rejected(&self, objective: &str, topic: &str, error: &GateError) {
        eprintln!("  Rejected: {objective} :: {topic}: {error}");
    }

    fn on_accomplished(&self, objective: &str, at: DateTime<Utc>) {
        println!(
            "Objective '{objective}' accomplished at {}. Gate unlocked.",
            format_time(at)
        );
    }

    fn on_reset(&self, objective: &str) {
        println!("Objective '{objective}' reset.");
    }
}
