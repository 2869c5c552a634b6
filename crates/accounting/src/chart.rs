//! Chart of accounts, journals and accounting periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use royalty_core::{AccountId, CompanyId, DomainError, DomainResult};

royalty_core::typed_id!(
    /// Journal identifier.
    JournalId
);

royalty_core::typed_id!(
    /// Accounting period identifier.
    PeriodId
);

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    /// Whether the account grows on the debit side.
    pub fn is_debit_normal(self) -> bool {
        matches!(self, AccountKind::Asset | AccountKind::Expense)
    }
}

/// Account identifier + metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub code: String, // e.g. "4000"
    pub name: String, // e.g. "Pockets"
    pub kind: AccountKind,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    /// Lookup code, e.g. "ROY".
    pub code: String,
    pub name: String,
}

impl Journal {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: JournalId::generate(),
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A company's accounting period, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub company: CompanyId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Closed periods accept no new moves.
    pub open: bool,
}

impl Period {
    pub fn new(
        company: CompanyId,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(format!(
                "period starts after it ends ({start} > {end})"
            )));
        }
        Ok(Self {
            id: PeriodId::generate(),
            company,
            name: name.into(),
            start,
            end,
            open: true,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}
