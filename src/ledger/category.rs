use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Top-level bucket hours are logged against. The set is closed; only the task lists under each
/// bucket are editable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Category {
    Research,
    Teaching,
    Service,
    /// Leave and any other non-working time.
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Research,
        Category::Teaching,
        Category::Service,
        Category::Other,
    ];

    /// Categories that count as paid work when computing allocation.
    pub const WORKING: [Category; 3] = [Category::Research, Category::Teaching, Category::Service];

    pub fn is_working(self) -> bool {
        !matches!(self, Category::Other)
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Research => "Research",
            Category::Teaching => "Teaching",
            Category::Service => "Service",
            Category::Other => "Other",
        }
    }

    pub(crate) fn default_tasks(self) -> &'static [&'static str] {
        match self {
            Category::Research => &[
                "Writing",
                "Data analysis",
                "Reading",
                "Grant applications",
                "Supervision",
            ],
            Category::Teaching => &["Preparation", "Delivery", "Marking", "Student meetings"],
            Category::Service => &["Admin", "Committees", "Reviewing", "Outreach"],
            Category::Other => &["Annual leave", "Sick leave", "Public holiday", "Training"],
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
