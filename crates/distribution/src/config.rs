//! Injected configuration for distribution runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use royalty_accounting::AccountKind;
use royalty_core::{CompanyId, Currency, DomainError, DomainResult, ValueObject};

/// Source of unique, sequential distribution codes.
///
/// Codes consumed by a run that is later rolled back are not handed out again,
/// so the sequence may have gaps.
pub trait CodeSequence: Send + Sync {
    fn next_code(&self) -> String;
}

/// Percentages used to split a share between contributors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    /// Composers' part of the creative share when texters also contributed.
    pub composer_percent: Decimal,
    /// Texters' part of the creative share when composers also contributed.
    pub texter_percent: Decimal,
    /// Performers' part of the whole share when creators also contributed.
    pub performer_percent: Decimal,
}

impl ValueObject for SplitPolicy {}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            composer_percent: Decimal::from(65),
            texter_percent: Decimal::from(35),
            performer_percent: Decimal::from(50),
        }
    }
}

impl SplitPolicy {
    pub fn validate(&self) -> DomainResult<()> {
        for (name, value) in [
            ("composer_percent", self.composer_percent),
            ("texter_percent", self.texter_percent),
            ("performer_percent", self.performer_percent),
        ] {
            check_percent(name, value)?;
        }
        if self.composer_percent + self.texter_percent != Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "composer_percent + texter_percent must be 100 (got {} + {})",
                self.composer_percent, self.texter_percent
            )));
        }
        Ok(())
    }
}

fn check_percent(name: &str, value: Decimal) -> DomainResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation(format!(
            "{name} must be between 0 and 100 (got {value})"
        )));
    }
    Ok(())
}

fn default_fee_percent() -> Decimal {
    Decimal::TEN
}

fn default_journal_code() -> String {
    "ROY".to_string()
}

fn default_fee_account_kind() -> AccountKind {
    AccountKind::Revenue
}

/// Everything a distribution run needs besides the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Company whose accounting period receives the moves.
    pub company: CompanyId,
    #[serde(default)]
    pub currency: Currency,
    /// Company fee withheld from every allocation.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: Decimal,
    #[serde(default)]
    pub split: SplitPolicy,
    /// Journal the distribution moves are booked in.
    #[serde(default = "default_journal_code")]
    pub journal_code: String,
    /// Kind of the account credited with the company fee.
    #[serde(default = "default_fee_account_kind")]
    pub fee_account_kind: AccountKind,
}

impl DistributionConfig {
    pub fn for_company(company: CompanyId) -> Self {
        Self {
            company,
            currency: Currency::default(),
            fee_percent: default_fee_percent(),
            split: SplitPolicy::default(),
            journal_code: default_journal_code(),
            fee_account_kind: default_fee_account_kind(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        check_percent("fee_percent", self.fee_percent)?;
        self.split.validate()?;
        if self.journal_code.trim().is_empty() {
            return Err(DomainError::validation("journal_code must not be empty"));
        }
        Ok(())
    }
}
