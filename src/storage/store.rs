use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use super::state::AppState;

/// Interface for abstracting where the [AppState] lives between runs.
pub trait StateStore {
    /// Returns `None` if nothing was saved yet.
    fn load(&self) -> impl Future<Output = Result<Option<AppState>>>;

    fn save(&self, state: &AppState) -> impl Future<Output = Result<()>>;
}

/// Keeps the state as a single pretty-printed JSON file.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<Option<AppState>> {
        debug!("Loading state from {:?}", self.path);
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => Err(e)?,
        };

        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read?;

        if content.trim().is_empty() {
            return Ok(None);
        }
        let state = serde_json::from_str(&content)
            .with_context(|| format!("State file {:?} is corrupted", self.path))?;
        Ok(Some(state))
    }

    async fn save(&self, state: &AppState) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Truncation has to happen under the lock, readers hold a shared one.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        file.unlock_async().await?;
        result?;

        debug!("Saved state to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{ledger::category::Category, storage::state::AppState};

    use super::{JsonStateStore, StateStore};

    #[tokio::test]
    async fn test_missing_file_loads_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(store.load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStateStore::new(dir.path().join("nested").join("state.json"));

        let mut state = AppState::default();
        state.entries.set_hours(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            Category::Research,
            "Writing",
            "4",
        );
        store.save(&state).await?;

        // A shorter second save must not leave trailing bytes behind.
        let shorter = AppState::default();
        store.save(&state).await?;
        store.save(&shorter).await?;

        assert_eq!(store.load().await?, Some(shorter));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json")?;
        let store = JsonStateStore::new(path);
        assert!(store.load().await.is_err());
        Ok(())
    }
}
