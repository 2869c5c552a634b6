use chrono::NaiveDate;
use thiserror::Error;

use royalty_accounting::LedgerError;
use royalty_core::DomainError;

use crate::repository::RepositoryError;

/// Why a distribution run was aborted.
///
/// Any of these means nothing was committed; skipped parties and empty
/// windows are reported through the result instead.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("invalid date range: {from} is after {thru}")]
    InvalidDateRange { from: NaiveDate, thru: NaiveDate },

    #[error("account resolution failed: {0}")]
    AccountResolution(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("ledger entry rejected: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DistributionError {
    pub fn account_resolution(msg: impl Into<String>) -> Self {
        Self::AccountResolution(msg.into())
    }
}
