//! Seams to the collaborators the engine does not own: progress storage and
//! display text lookup.
//!
//! Stores are implemented by the `objectives-store` crate; text lookup is
//! provided by whatever front end renders the gates.

use async_trait::async_trait;

use crate::model::SymbolicKey;
use crate::progress::ProgressSnapshot;

// ---------------------------------------------------------------------------
// Progress store trait
// ---------------------------------------------------------------------------

/// Persists gating progress across restarts.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Human-readable store name (e.g. "json-file").
    fn name(&self) -> &str;

    /// Load the last saved snapshot, or `None` if nothing was saved yet.
    async fn load(&self) -> anyhow::Result<Option<ProgressSnapshot>>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()>;

    /// Forget all stored progress.
    async fn clear(&self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Text lookup trait
// ---------------------------------------------------------------------------

/// Resolves symbolic keys to display text.
pub trait TextLookup: Send + Sync {
    /// Text for `key`, or `None` if the lookup does not know it.
    fn lookup(&self, key: &SymbolicKey) -> Option<String>;

    /// Text for `key`, falling back to the key itself.
    fn text(&self, key: &SymbolicKey) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }
}

impl TextLookup for std::collections::HashMap<String, String> {
    fn lookup(&self, key: &SymbolicKey) -> Option<String> {
        self.get(key.as_str()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn map_lookup() {
        let strings = HashMap::from([("dia".to_string(), "Insulin action".to_string())]);
        assert_eq!(strings.text(&"dia".into()), "Insulin action");
        assert_eq!(strings.text(&"hypott".into()), "hypott");
    }
}
