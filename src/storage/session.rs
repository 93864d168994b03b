use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{
    analysis::{
        aggregation::{aggregate, LedgerStatistics},
        allocation::{analyze_allocation, AllocationReport},
        missing::{find_missing_days, MissingDay},
    },
    ledger::category::Category,
    settings::Settings,
    sync::{run_sync, SyncPayload, SyncStatus, SyncTransport},
    utils::clock::Clock,
};

use super::{state::AppState, store::StateStore};

/// Explicit context every operation goes through. Owns the only copy of the [AppState] and
/// writes it to the [StateStore] after every successful mutation. Mutations take `&mut self`,
/// so there is exactly one writer.
pub struct Session<S: StateStore> {
    state: AppState,
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: StateStore> Session<S> {
    pub async fn open(store: S, clock: Box<dyn Clock>) -> Result<Self> {
        let state = store.load().await?.unwrap_or_default();
        Ok(Self {
            state,
            store,
            clock,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn flush(&self) -> Result<()> {
        self.store.save(&self.state).await
    }

    /// Saves the current state. If saving fails the state is rolled back to `previous`, so
    /// memory never runs ahead of the store.
    async fn commit(&mut self, previous: AppState) -> Result<()> {
        if let Err(e) = self.flush().await {
            warn!("Failed to save state, discarding the change: {e:#}");
            self.state = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Returns the stored value. Unparseable or negative input clears the cell.
    #[instrument(skip(self))]
    pub async fn set_hours(
        &mut self,
        date: NaiveDate,
        category: Category,
        task: &str,
        raw: &str,
    ) -> Result<f64> {
        let previous = self.state.clone();
        let stored = self.state.entries.set_hours(date, category, task, raw);
        self.commit(previous).await?;
        Ok(stored)
    }

    pub async fn add_task(&mut self, category: Category, name: &str) -> Result<()> {
        let previous = self.state.clone();
        self.state.categories.add_task(category, name)?;
        self.commit(previous).await
    }

    pub async fn remove_task(&mut self, category: Category, name: &str) -> Result<bool> {
        let previous = self.state.clone();
        let removed = self.state.categories.remove_task(category, name);
        if removed {
            info!("Removed task {name:?} from {category}");
            self.commit(previous).await?;
        }
        Ok(removed)
    }

    pub async fn reset_taxonomy(&mut self) -> Result<()> {
        let previous = self.state.clone();
        self.state.categories.reset();
        self.commit(previous).await
    }

    /// Applies `update` to a copy of the settings. Nothing changes if the result has an invalid
    /// schedule.
    pub async fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) -> Result<()> {
        let mut settings = self.state.settings.clone();
        update(&mut settings);
        settings.validate()?;

        let previous = self.state.clone();
        self.state.settings = settings;
        self.commit(previous).await
    }

    pub async fn set_sync_url(&mut self, url: Option<String>) -> Result<()> {
        let previous = self.state.clone();
        self.state.sync_url = url.filter(|url| !url.trim().is_empty());
        self.commit(previous).await
    }

    pub async fn import_json(&mut self, payload: &str) -> Result<()> {
        let previous = self.state.clone();
        self.state.import_json(payload)?;
        self.commit(previous).await
    }

    pub async fn import_file(&mut self, path: &Path) -> Result<()> {
        let payload = tokio::fs::read_to_string(path).await?;
        self.import_json(&payload).await
    }

    pub fn statistics(&self) -> LedgerStatistics {
        aggregate(&self.state.entries)
    }

    pub fn allocation(&self) -> AllocationReport {
        analyze_allocation(&self.statistics(), &self.state.settings)
    }

    pub fn missing_days(&self) -> Vec<MissingDay> {
        find_missing_days(
            &self.state.entries,
            &self.state.settings.missing_data,
            self.today(),
        )
    }

    pub fn sync_payload(&self) -> SyncPayload {
        SyncPayload::new(&self.state.entries, &self.state.settings)
    }

    pub async fn sync(
        &self,
        transport: &dyn SyncTransport,
        on_status: impl FnMut(&SyncStatus),
    ) -> Result<SyncStatus> {
        let url = self
            .state
            .sync_url
            .as_deref()
            .ok_or_else(|| anyhow!("No sync URL configured"))?;
        Ok(run_sync(transport, url, &self.sync_payload(), on_status).await)
    }
}
