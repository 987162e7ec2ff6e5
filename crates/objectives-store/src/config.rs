//! Configuration and store factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use objectives_core::engine::GateEngineConfig;
use objectives_core::traits::ProgressStore;

use crate::file::JsonFileStore;
use crate::memory::MemoryStore;

/// Which progress store to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// JSON snapshot on disk.
    File {
        #[serde(default = "default_state_file")]
        path: PathBuf,
    },
    /// Nothing survives the process.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: default_state_file(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./objectives-progress.json")
}

/// Top-level objectives configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Where progress is kept.
    #[serde(default)]
    pub store: StoreConfig,
    /// Directory with additional TOML objective definitions.
    #[serde(default)]
    pub definitions_dir: Option<PathBuf>,
    /// Seconds an exam task stays locked after a wrong answer (0 disables).
    #[serde(default = "default_lockout_secs")]
    pub wrong_answer_lockout_secs: u64,
    /// Display text for symbolic keys.
    #[serde(default)]
    pub strings: HashMap<String, String>,
}

fn default_lockout_secs() -> u64 {
    3600
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            definitions_dir: None,
            wrong_answer_lockout_secs: default_lockout_secs(),
            strings: HashMap::new(),
        }
    }
}

impl GateConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> GateEngineConfig {
        let lockout = i64::try_from(self.wrong_answer_lockout_secs)
            .ok()
            .filter(|&secs| secs > 0)
            .and_then(chrono::Duration::try_seconds);
        GateEngineConfig { lockout }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `objectives.toml` in the current directory
/// 2. `~/.config/objectives/config.toml`
///
/// Environment variable override: `OBJECTIVES_STATE_FILE`.
pub fn load_config_from(path: Option<&Path>) -> Result<GateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("objectives.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            toml::from_str::<GateConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GateConfig::default(),
    };

    // Apply env var overrides
    if let Ok(state_file) = std::env::var("OBJECTIVES_STATE_FILE") {
        config.store = StoreConfig::File {
            path: PathBuf::from(state_file),
        };
    }

    // Resolve env vars in paths
    if let StoreConfig::File { path } = &mut config.store {
        *path = resolve_path(path);
    }
    config.definitions_dir = config.definitions_dir.as_deref().map(resolve_path);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("objectives"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &GateConfig) -> Arc<dyn ProgressStore> {
    match &config.store {
        StoreConfig::File { path } => Arc::new(JsonFileStore::new(path.clone())),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_OBJECTIVES_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_OBJECTIVES_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_OBJECTIVES_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_OBJECTIVES_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = GateConfig::default();
        assert_eq!(config.wrong_answer_lockout_secs, 3600);
        assert!(config.definitions_dir.is_none());
        assert!(matches!(config.store, StoreConfig::File { .. }));
        assert_eq!(
            config.engine_config().lockout,
            Some(chrono::Duration::hours(1))
        );
    }

    #[test]
    fn zero_lockout_disables_lock() {
        let config = GateConfig {
            wrong_answer_lockout_secs: 0,
            ..Default::default()
        };
        assert!(config.engine_config().lockout.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
definitions_dir = "./gates"
wrong_answer_lockout_secs = 60

[store]
type = "file"
path = "/tmp/progress.json"

[strings]
dia_meaningofdia = "What does DIA mean?"
"#;
        let config: GateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("/tmp/progress.json")
            }
        );
        assert_eq!(config.definitions_dir, Some(PathBuf::from("./gates")));
        assert_eq!(config.strings.len(), 1);
    }

    #[test]
    fn parse_memory_store() {
        let config: GateConfig = toml::from_str("[store]\ntype = \"memory\"\n").unwrap();
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(create_store(&config).name(), "memory");
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("/no/such/objectives.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objectives.toml");
        std::fs::write(
            &path,
            "wrong_answer_lockout_secs = 5\n[store]\ntype = \"memory\"\n",
        )
        .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.wrong_answer_lockout_secs, 5);
    }
}
