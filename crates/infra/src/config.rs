//! Runtime settings: a JSON file, then environment overrides.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use royalty_core::{CompanyId, DomainError};
use royalty_distribution::DistributionConfig;
use royalty_observability::LogFormat;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

fn default_sequence_prefix() -> String {
    "DIS".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub distribution: DistributionConfig,
    /// Prefix of distribution codes (`DIS0000001`).
    #[serde(default = "default_sequence_prefix")]
    pub sequence_prefix: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn for_company(company: CompanyId) -> Self {
        Self {
            distribution: DistributionConfig::for_company(company),
            sequence_prefix: default_sequence_prefix(),
            log_format: LogFormat::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.distribution.validate()?;
        if self.sequence_prefix.trim().is_empty() {
            return Err(DomainError::validation("sequence_prefix must not be empty").into());
        }
        Ok(())
    }

    /// Apply `ROYALTY_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored; the result is validated.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        if let Some(raw) = lookup("ROYALTY_COMPANY_ID") {
            match CompanyId::from_str(&raw) {
                Ok(company) => self.distribution.company = company,
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "ignoring ROYALTY_COMPANY_ID")
                }
            }
        }
        if let Some(raw) = lookup("ROYALTY_FEE_PERCENT") {
            match Decimal::from_str(raw.trim()) {
                Ok(fee) => self.distribution.fee_percent = fee,
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "ignoring ROYALTY_FEE_PERCENT")
                }
            }
        }
        if let Some(code) = lookup("ROYALTY_JOURNAL_CODE") {
            self.distribution.journal_code = code;
        }
        if let Some(prefix) = lookup("ROYALTY_SEQUENCE_PREFIX") {
            self.sequence_prefix = prefix;
        }
        if let Some(raw) = lookup("ROYALTY_LOG_FORMAT") {
            match LogFormat::from_str(&raw) {
                Ok(format) => self.log_format = format,
                Err(err) => tracing::warn!(error = %err, "ignoring ROYALTY_LOG_FORMAT"),
            }
        }

        self.validate()?;
        Ok(self)
    }

    pub fn apply_env(self) -> Result<Self, SettingsError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}
