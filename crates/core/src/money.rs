//! Exact decimal money arithmetic.
//!
//! Every monetary value in the workspace is a [`Decimal`]. Intermediate shares
//! keep full precision; only values that end up on a ledger line (or on an
//! allocation record) go through [`Currency::round`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Currency the ledger is kept in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code, e.g. "EUR".
    pub code: String,
    /// Number of decimal places amounts are rounded to.
    pub decimal_places: u32,
}

impl ValueObject for Currency {}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

impl Currency {
    pub fn new(code: impl Into<String>, decimal_places: u32) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("currency code must not be empty"));
        }
        // Decimal carries at most 28 fractional digits.
        if decimal_places > 28 {
            return Err(DomainError::validation(format!(
                "currency precision {decimal_places} exceeds 28 decimal places"
            )));
        }
        Ok(Self {
            code,
            decimal_places,
        })
    }

    pub fn eur() -> Self {
        Self {
            code: "EUR".to_string(),
            decimal_places: 2,
        }
    }

    /// Round to currency precision (midpoint away from zero).
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Cut to currency precision, dropping the sub-unit part (toward zero).
    pub fn truncate(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::ToZero)
    }

    /// Whether `amount` is zero once rounded to currency precision.
    pub fn is_zero(&self, amount: Decimal) -> bool {
        self.round(amount).is_zero()
    }

    /// `amount × percent / 100`, unrounded.
    pub fn percent_of(&self, amount: Decimal, percent: Decimal) -> Decimal {
        amount * percent / Decimal::ONE_HUNDRED
    }

    /// The smallest representable unit (0.01 for two decimal places).
    pub fn smallest_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        let eur = Currency::eur();
        assert_eq!(eur.round(dec!(0.125)), dec!(0.13));
        assert_eq!(eur.round(dec!(0.124)), dec!(0.12));
        assert_eq!(eur.round(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn tiny_amounts_are_zero_after_rounding() {
        let eur = Currency::eur();
        assert!(eur.is_zero(dec!(0.004)));
        assert!(!eur.is_zero(dec!(0.005)));
    }

    #[test]
    fn percent_keeps_full_precision() {
        let eur = Currency::eur();
        assert_eq!(eur.percent_of(dec!(33.33), dec!(10)), dec!(3.333));
        assert_eq!(eur.smallest_unit(), dec!(0.01));
    }

    #[test]
    fn rejects_empty_code_and_silly_precision() {
        assert!(Currency::new("", 2).is_err());
        assert!(Currency::new("XBT", 29).is_err());
        assert_eq!(Currency::new("JPY", 0).unwrap().round(dec!(10.5)), dec!(11));
    }

    proptest! {
        /// Rounding never moves a value by more than half a unit.
        #[test]
        fn rounding_error_is_bounded(
            cents in -10_000_000i64..10_000_000i64,
            extra in 0u32..100u32
        ) {
            let eur = Currency::eur();
            let raw = Decimal::new(cents, 2) + Decimal::new(extra as i64, 4);
            let rounded = eur.round(raw);
            prop_assert!((rounded - raw).abs() <= dec!(0.005));
        }
    }
}
