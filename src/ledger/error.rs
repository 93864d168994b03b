use thiserror::Error;

use super::category::Category;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// Hour input that isn't a finite non-negative number. Recovered by storing 0.
    #[error("Invalid hours value {0:?}")]
    Validation(String),

    #[error("Invalid schedule: {0}")]
    Schedule(String),

    #[error("Task {name:?} already exists in {category}")]
    DuplicateTask { category: Category, name: String },
}
