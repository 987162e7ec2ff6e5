//! JSON file progress store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use objectives_core::progress::ProgressSnapshot;
use objectives_core::traits::ProgressStore;

use crate::error::StoreError;

/// Keeps the snapshot in a single pretty-printed JSON file.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous snapshot intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn load(&self) -> Result<Option<ProgressSnapshot>> {
        if tokio::fs::metadata(&self.path)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(StoreError::IsDirectory(self.path.clone()).into());
        }

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no progress file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read progress from {}", self.path.display())
                })
            }
        };

        let snapshot = ProgressSnapshot::from_json(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: format!("{e:#}"),
        })?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .with_context(|| format!("failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "progress saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}
