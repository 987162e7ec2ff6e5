//! The `objectives reset` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{open_engine, ConsoleObserver};

pub async fn execute(
    config_path: Option<PathBuf>,
    objective: Option<String>,
    all: bool,
) -> Result<()> {
    let (mut engine, _) = open_engine(config_path).await?;

    match objective {
        Some(name) if !all => engine.reset(&name, &ConsoleObserver).await,
        _ => engine.reset_all(&ConsoleObserver).await,
    }
}
