//! The `objectives answer` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{open_engine, ConsoleObserver};

pub async fn execute(
    config_path: Option<PathBuf>,
    objective: String,
    topic: String,
    select: Vec<usize>,
) -> Result<()> {
    let (mut engine, _) = open_engine(config_path).await?;

    let outcome = engine
        .submit_answer(&objective, &topic, &select, &ConsoleObserver)
        .await?;

    if outcome.accomplished && !outcome.newly_accomplished {
        println!("Objective '{objective}' is accomplished.");
    } else if !outcome.accomplished {
        let (completed, total) = engine
            .session()
            .objective(&objective)
            .map(|o| o.progress())
            .unwrap_or_default();
        println!("Objective '{objective}': {completed}/{total} tasks completed.");
    }

    Ok(())
}
