use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{category::Category, error::LedgerError};

/// Ordered task lists for every [Category]. Order is only relevant for display.
///
/// Removing a task here never touches logged hours, those cells stay in the
/// [Ledger](super::entries::Ledger) and keep counting towards every total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Category, Vec<String>>",
    into = "BTreeMap<Category, Vec<String>>"
)]
pub struct Taxonomy {
    tasks: BTreeMap<Category, Vec<String>>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let tasks = Category::ALL
            .into_iter()
            .map(|c| {
                (
                    c,
                    c.default_tasks().iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self { tasks }
    }
}

impl Taxonomy {
    pub fn tasks(&self, category: Category) -> &[String] {
        self.tasks.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.tasks(category).iter().any(|t| t == name)
    }

    /// Appends a task to the end of `category`. Blank names are ignored, duplicates (exact,
    /// case-sensitive match after trimming) are rejected without changing anything.
    pub fn add_task(&mut self, category: Category, name: &str) -> Result<(), LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring empty task name for {category}");
            return Ok(());
        }
        if self.contains(category, name) {
            return Err(LedgerError::DuplicateTask {
                category,
                name: name.to_string(),
            });
        }
        self.tasks.entry(category).or_default().push(name.to_string());
        info!("Added task {name:?} to {category}");
        Ok(())
    }

    /// Returns whether anything was removed.
    pub fn remove_task(&mut self, category: Category, name: &str) -> bool {
        let Some(tasks) = self.tasks.get_mut(&category) else {
            return false;
        };
        let before = tasks.len();
        tasks.retain(|t| t != name);
        before != tasks.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl From<BTreeMap<Category, Vec<String>>> for Taxonomy {
    fn from(mut tasks: BTreeMap<Category, Vec<String>>) -> Self {
        for category in Category::ALL {
            let list = tasks.entry(category).or_default();
            let mut seen = Vec::<String>::with_capacity(list.len());
            for task in list.drain(..) {
                let task = task.trim().to_string();
                if !task.is_empty() && !seen.contains(&task) {
                    seen.push(task);
                }
            }
            *list = seen;
        }
        Self { tasks }
    }
}

impl From<Taxonomy> for BTreeMap<Category, Vec<String>> {
    fn from(value: Taxonomy) -> Self {
        value.tasks
    }
}
