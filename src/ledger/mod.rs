//! The ledger is the single source of truth: logged hours ([entries::Ledger]) and the task
//! lists users pick from ([taxonomy::Taxonomy]). Everything in [crate::analysis] is derived
//! from it on demand.

pub mod category;
pub mod entries;
pub mod error;
pub mod taxonomy;
