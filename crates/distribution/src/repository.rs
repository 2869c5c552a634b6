//! What the distribution engine needs from storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use royalty_accounting::{Account, AccountKind, Journal, Move, MoveId, Period};
use royalty_core::{CompanyId, DomainError};
use royalty_parties::{Party, PartyId};
use royalty_repertoire::{Artist, ArtistId, Creation, CreationId};

use crate::config::CodeSequence;
use crate::model::{
    Allocation, AllocationId, DateWindow, Distribution, NewAllocation, Utilisation, UtilisationId,
    UtilisationState,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("repository lock poisoned")]
    Lock,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Typed repository over business records and the ledger.
///
/// Reads take `&self`, writes `&mut self`. Implementations are not expected to
/// be transactional per call: the caller runs a whole distribution inside one
/// unit of work and discards it on error.
pub trait DistributionRepository {
    /// Utilisations in state `not_distributed` whose timestamp falls in `window`.
    fn find_pending_utilisations(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<Utilisation>, RepositoryError>;

    fn find_party(&self, id: PartyId) -> Result<Option<Party>, RepositoryError>;

    /// Money currently available in the party's pocket.
    fn pocket_balance(&self, party: PartyId) -> Result<Decimal, RepositoryError>;

    fn find_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError>;

    fn find_creation(&self, id: CreationId) -> Result<Option<Creation>, RepositoryError>;

    /// Create a distribution record, drawing its code from `sequence`.
    fn create_distribution(
        &mut self,
        sequence: &dyn CodeSequence,
        date: NaiveDate,
        from: NaiveDate,
        thru: NaiveDate,
    ) -> Result<Distribution, RepositoryError>;

    fn create_allocation(
        &mut self,
        allocation: NewAllocation,
    ) -> Result<Allocation, RepositoryError>;

    /// Link ledger moves to an allocation.
    fn attach_moves(
        &mut self,
        allocation: AllocationId,
        moves: &[MoveId],
    ) -> Result<(), RepositoryError>;

    /// Transition utilisations; `allocation: None` keeps the existing link.
    fn update_utilisation_state(
        &mut self,
        utilisations: &[UtilisationId],
        state: UtilisationState,
        allocation: Option<AllocationId>,
    ) -> Result<(), RepositoryError>;

    /// Persist a batch of moves, in order.
    fn create_ledger_moves(&mut self, moves: Vec<Move>) -> Result<Vec<MoveId>, RepositoryError>;

    fn find_account(&self, kind: AccountKind) -> Result<Option<Account>, RepositoryError>;

    fn find_journal(&self, code: &str) -> Result<Option<Journal>, RepositoryError>;

    /// Open period of `company` containing `date`.
    fn find_period(
        &self,
        company: CompanyId,
        date: NaiveDate,
    ) -> Result<Option<Period>, RepositoryError>;
}
