use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    ledger::{entries::Ledger, taxonomy::Taxonomy},
    settings::Settings,
};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Malformed state payload: {0}")]
    Format(#[from] serde_json::Error),
}

/// The whole persisted record. Every field is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub entries: Ledger,
    #[serde(default)]
    pub categories: Taxonomy,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_url: Option<String>,
}

/// Payload accepted by [AppState::import_json]. Only present fields are applied.
#[derive(Debug, Deserialize)]
struct StateImport {
    entries: Option<Ledger>,
    categories: Option<Taxonomy>,
    settings: Option<Settings>,
    sync_url: Option<String>,
}

impl AppState {
    /// Replaces every field present in `payload`. The payload is fully validated before anything
    /// is applied, so a rejected import leaves the state as it was.
    pub fn import_json(&mut self, payload: &str) -> Result<(), StateError> {
        let StateImport {
            entries,
            categories,
            settings,
            sync_url,
        } = serde_json::from_str(payload)?;

        if let Some(entries) = entries {
            info!("Importing {} ledger cells", entries.cells().count());
            self.entries = entries;
        }
        if let Some(categories) = categories {
            self.categories = categories;
        }
        if let Some(settings) = settings {
            self.settings = settings;
        }
        if let Some(sync_url) = sync_url {
            self.sync_url = Some(sync_url).filter(|url| !url.trim().is_empty());
        }
        Ok(())
    }
}
