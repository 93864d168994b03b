//! Statistics derived from a [Ledger](crate::ledger::entries::Ledger) snapshot.
//!  - [aggregation] totals per day, category, week and weekday.
//!  - [allocation] compares totals against configured targets.
//!  - [missing] finds recent days without any logged hours.
//!
//! Nothing here holds state. Callers recompute after each change to the ledger.

pub mod aggregation;
pub mod allocation;
pub mod missing;
