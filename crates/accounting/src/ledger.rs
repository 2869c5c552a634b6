use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use royalty_core::AccountId;
use royalty_parties::PartyId;
use royalty_repertoire::ArtistId;

use crate::chart::{Journal, JournalId, Period, PeriodId};

royalty_core::typed_id!(
    /// Ledger move identifier.
    MoveId
);

/// Who a move line is booked against: a party (pocket side) or an artist (hat side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Counterparty {
    Party(PartyId),
    Artist(ArtistId),
}

/// One side of a move (immutable).
///
/// Exactly one of `debit`/`credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    pub account: AccountId,
    pub counterparty: Option<Counterparty>,
    pub label: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl MoveLine {
    pub fn debit(account: AccountId, amount: Decimal) -> Self {
        Self {
            account,
            counterparty: None,
            label: String::new(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn credit(account: AccountId, amount: Decimal) -> Self {
        Self {
            account,
            counterparty: None,
            label: String::new(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    pub fn against(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Signed amount, debit-positive.
    pub fn balance(&self) -> Decimal {
        self.debit - self.credit
    }

    fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    Draft,
    Posted,
}

/// A balanced journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub id: MoveId,
    pub journal: JournalId,
    pub period: PeriodId,
    pub date: NaiveDate,
    /// Business reference, e.g. the distribution code.
    pub origin: String,
    pub state: MoveState,
    pub lines: Vec<MoveLine>,
}

impl Move {
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Draft → Posted. Posting twice is an error.
    pub fn post(&mut self) -> Result<(), LedgerError> {
        if self.state == MoveState::Posted {
            return Err(LedgerError::AlreadyPosted(self.id));
        }
        self.state = MoveState::Posted;
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("move must have at least one non-zero line")]
    Empty,

    #[error("line {index} has a negative amount")]
    NegativeAmount { index: usize },

    #[error("line {index} carries both a debit and a credit")]
    TwoSided { index: usize },

    #[error("debits ({debit}) must equal credits ({credit})")]
    Unbalanced { debit: Decimal, credit: Decimal },

    #[error("move date {date} is outside period {period}")]
    OutsidePeriod { date: NaiveDate, period: String },

    #[error("period {0} is closed")]
    PeriodClosed(String),

    #[error("move {0} is already posted")]
    AlreadyPosted(MoveId),
}

/// Accumulates lines for one move and validates them on [`MoveBuilder::build`].
///
/// Zero-valued lines are dropped as they are pushed; they carry no information
/// and would only clutter the ledger.
#[derive(Debug, Clone)]
pub struct MoveBuilder {
    journal: JournalId,
    period: PeriodId,
    period_name: String,
    period_open: bool,
    period_contains_date: bool,
    date: NaiveDate,
    origin: String,
    lines: Vec<MoveLine>,
}

impl MoveBuilder {
    pub fn new(
        journal: &Journal,
        period: &Period,
        date: NaiveDate,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            journal: journal.id,
            period: period.id,
            period_name: period.name.clone(),
            period_open: period.open,
            period_contains_date: period.contains(date),
            date,
            origin: origin.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: MoveLine) -> &mut Self {
        if !line.is_zero() {
            self.lines.push(line);
        }
        self
    }

    pub fn debit(
        &mut self,
        account: AccountId,
        counterparty: Option<Counterparty>,
        amount: Decimal,
        label: &str,
    ) -> &mut Self {
        let mut line = MoveLine::debit(account, amount).labelled(label);
        line.counterparty = counterparty;
        self.push(line)
    }

    pub fn credit(
        &mut self,
        account: AccountId,
        counterparty: Option<Counterparty>,
        amount: Decimal,
        label: &str,
    ) -> &mut Self {
        let mut line = MoveLine::credit(account, amount).labelled(label);
        line.counterparty = counterparty;
        self.push(line)
    }

    pub fn lines(&self) -> &[MoveLine] {
        &self.lines
    }

    /// Running debit − credit; zero once the move balances.
    pub fn imbalance(&self) -> Decimal {
        self.lines.iter().map(MoveLine::balance).sum()
    }

    pub fn build(self) -> Result<Move, LedgerError> {
        if !self.period_open {
            return Err(LedgerError::PeriodClosed(self.period_name));
        }
        if !self.period_contains_date {
            return Err(LedgerError::OutsidePeriod {
                date: self.date,
                period: self.period_name,
            });
        }
        if self.lines.is_empty() {
            return Err(LedgerError::Empty);
        }

        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;

        for (index, line) in self.lines.iter().enumerate() {
            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(LedgerError::NegativeAmount { index });
            }
            if !line.debit.is_zero() && !line.credit.is_zero() {
                return Err(LedgerError::TwoSided { index });
            }
            debit += line.debit;
            credit += line.credit;
        }

        if debit != credit {
            return Err(LedgerError::Unbalanced { debit, credit });
        }

        Ok(Move {
            id: MoveId::generate(),
            journal: self.journal,
            period: self.period,
            date: self.date,
            origin: self.origin,
            state: MoveState::Draft,
            lines: self.lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use royalty_core::CompanyId;
    use rust_decimal_macros::dec;

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn test_period() -> Period {
        Period::new(
            CompanyId::new(),
            "2024-06",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    fn builder() -> MoveBuilder {
        MoveBuilder::new(
            &Journal::new("ROY", "Royalties"),
            &test_period(),
            test_date(),
            "DIS0000001",
        )
    }

    #[test]
    fn balanced_move_is_built_as_draft() {
        let pocket = AccountId::new();
        let fees = AccountId::new();
        let hat = AccountId::new();
        let party = PartyId::generate();
        let artist = ArtistId::generate();

        let mut b = builder();
        b.credit(fees, None, dec!(10.00), "fee")
            .debit(pocket, Some(Counterparty::Party(party)), dec!(100.00), "pocket")
            .credit(hat, Some(Counterparty::Artist(artist)), dec!(90.00), "hat");

        let mv = b.build().unwrap();
        assert_eq!(mv.state, MoveState::Draft);
        assert_eq!(mv.origin, "DIS0000001");
        assert_eq!(mv.total_debit(), dec!(100.00));
        assert!(mv.is_balanced());
        assert_eq!(mv.lines[1].counterparty, Some(Counterparty::Party(party)));
    }

    #[test]
    fn unbalanced_move_is_rejected() {
        let mut b = builder();
        b.debit(AccountId::new(), None, dec!(100.00), "")
            .credit(AccountId::new(), None, dec!(99.99), "");

        match b.build().unwrap_err() {
            LedgerError::Unbalanced { debit, credit } => {
                assert_eq!(debit, dec!(100.00));
                assert_eq!(credit, dec!(99.99));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_lines_are_dropped_and_empty_moves_rejected() {
        let mut b = builder();
        b.credit(AccountId::new(), None, dec!(0.00), "nothing");
        assert!(b.lines().is_empty());
        assert_eq!(b.build().unwrap_err(), LedgerError::Empty);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let mut b = builder();
        b.push(MoveLine::debit(AccountId::new(), dec!(-5)));
        b.push(MoveLine::credit(AccountId::new(), dec!(-5)));
        assert_eq!(b.build().unwrap_err(), LedgerError::NegativeAmount { index: 0 });

        let mut two_sided = MoveLine::debit(AccountId::new(), dec!(5));
        two_sided.credit = dec!(5);
        let mut b = builder();
        b.push(two_sided);
        assert_eq!(b.build().unwrap_err(), LedgerError::TwoSided { index: 0 });
    }

    #[test]
    fn period_must_be_open_and_contain_the_date() {
        let mut closed = test_period();
        closed.close();
        let b = MoveBuilder::new(&Journal::new("ROY", "Royalties"), &closed, test_date(), "x");
        assert!(matches!(b.build(), Err(LedgerError::PeriodClosed(_))));

        let outside = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let b = MoveBuilder::new(&Journal::new("ROY", "Royalties"), &test_period(), outside, "x");
        assert!(matches!(b.build(), Err(LedgerError::OutsidePeriod { .. })));
    }

    #[test]
    fn posting_is_one_way() {
        let mut b = builder();
        b.debit(AccountId::new(), None, dec!(1), "")
            .credit(AccountId::new(), None, dec!(1), "");
        let mut mv = b.build().unwrap();

        mv.post().unwrap();
        assert_eq!(mv.state, MoveState::Posted);
        assert_eq!(mv.post().unwrap_err(), LedgerError::AlreadyPosted(mv.id));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: one debit split over any number of credits always builds,
        /// and the built move balances exactly.
        #[test]
        fn split_credits_balance(cents in prop::collection::vec(1i64..1_000_000i64, 1..20)) {
            let mut b = builder();
            let mut total = Decimal::ZERO;
            for c in &cents {
                let amount = Decimal::new(*c, 2);
                total += amount;
                let hat = Some(Counterparty::Artist(ArtistId::generate()));
                b.credit(AccountId::new(), hat, amount, "hat");
            }
            let pocket = Some(Counterparty::Party(PartyId::generate()));
            b.debit(AccountId::new(), pocket, total, "pocket");

            prop_assert_eq!(b.imbalance(), Decimal::ZERO);
            let mv = b.build().unwrap();
            prop_assert!(mv.is_balanced());
            prop_assert_eq!(mv.lines.len(), cents.len() + 1);
        }
    }
}
