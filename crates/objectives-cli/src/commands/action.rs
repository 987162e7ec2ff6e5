//! The `objectives action` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{open_engine, ConsoleObserver};

pub async fn execute(config_path: Option<PathBuf>, objective: String, topic: String) -> Result<()> {
    let (mut engine, _) = open_engine(config_path).await?;

    let outcome = engine
        .complete_action(&objective, &topic, &ConsoleObserver)
        .await?;
    if !outcome.changed {
        println!("Action '{topic}' was already performed.");
    }

    Ok(())
}
