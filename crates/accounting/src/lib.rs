//! Accounting module (double-entry ledger).
//!
//! Pure domain logic only: no IO, no persistence concerns. Moves are built
//! through [`MoveBuilder`], which refuses to produce an unbalanced entry.

pub mod chart;
pub mod ledger;

pub use chart::{Account, AccountKind, Journal, JournalId, Period, PeriodId};
pub use ledger::{Counterparty, LedgerError, Move, MoveBuilder, MoveId, MoveLine, MoveState};
