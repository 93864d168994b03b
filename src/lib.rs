//! Simple cli for logging the hours you spend on research, teaching, service and leave, and
//! seeing how they compare with the split you are aiming for.
//!

pub mod analysis;
pub mod cli;
pub mod export;
pub mod ledger;
pub mod settings;
pub mod storage;
pub mod sync;
pub mod utils;
