//! Contract with the remote sync transport. The transport itself lives outside this crate, all
//! the core needs is a way to hand over a [SyncPayload] and learn how it went.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    ledger::{category::Category, entries::Ledger},
    settings::{AllocationTargets, Settings},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatEntry {
    pub date: NaiveDate,
    pub category: Category,
    pub task: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub entries: Vec<FlatEntry>,
    pub hours_per_week: f64,
    pub allocation: AllocationTargets,
}

impl SyncPayload {
    pub fn new(ledger: &Ledger, settings: &Settings) -> Self {
        Self {
            entries: ledger
                .cells()
                .map(|cell| FlatEntry {
                    date: cell.date,
                    category: cell.category,
                    task: cell.task.to_string(),
                    hours: cell.hours,
                })
                .collect(),
            hours_per_week: settings.hours_per_week,
            allocation: settings.allocation,
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    Pending,
    Success,
    Failure(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn push(&self, url: &str, payload: &SyncPayload) -> Result<(), SyncError>;
}

/// Pushes once and reports [SyncStatus::Pending] followed by the outcome. Never retries.
pub async fn run_sync(
    transport: &dyn SyncTransport,
    url: &str,
    payload: &SyncPayload,
    mut on_status: impl FnMut(&SyncStatus),
) -> SyncStatus {
    on_status(&SyncStatus::Pending);
    let status = match transport.push(url, payload).await {
        Ok(()) => {
            info!("Synced {} entries", payload.entries.len());
            SyncStatus::Success
        }
        Err(e) => {
            error!("Sync to {url} failed {e:?}");
            SyncStatus::Failure(e.to_string())
        }
    };
    on_status(&status);
    status
}
