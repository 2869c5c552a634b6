//! In-memory repository with all-or-nothing units of work.
//!
//! Intended for tests, dev, and the admin binary. Not optimized for
//! performance: every unit of work clones the whole state.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use royalty_accounting::{
    Account, AccountKind, Counterparty, Journal, Move, MoveBuilder, MoveId, Period,
};
use royalty_core::{AccountId, CompanyId, DomainError};
use royalty_distribution::{
    Allocation, AllocationId, CodeSequence, DateWindow, Distribution, DistributionId,
    DistributionRepository, NewAllocation, RepositoryError, Utilisation, UtilisationId,
    UtilisationState,
};
use royalty_parties::{Party, PartyId};
use royalty_repertoire::{Artist, ArtistId, Creation, CreationId};

/// Every record the distribution engine reads or writes.
#[derive(Debug, Clone, Default)]
pub struct RepositoryState {
    parties: HashMap<PartyId, Party>,
    artists: HashMap<ArtistId, Artist>,
    creations: HashMap<CreationId, Creation>,
    utilisations: BTreeMap<UtilisationId, Utilisation>,
    distributions: Vec<Distribution>,
    allocations: BTreeMap<AllocationId, Allocation>,
    moves: Vec<Move>,
    accounts: Vec<Account>,
    journals: Vec<Journal>,
    periods: Vec<Period>,
}

impl RepositoryState {
    pub fn add_account(&mut self, account: Account) -> Result<AccountId, RepositoryError> {
        if self.accounts.iter().any(|a| a.id == account.id || a.code == account.code) {
            let msg = format!("account {} already exists", account.code);
            return Err(DomainError::conflict(msg).into());
        }
        let id = account.id;
        self.accounts.push(account);
        Ok(id)
    }

    pub fn add_journal(&mut self, journal: Journal) -> Result<(), RepositoryError> {
        if self.journals.iter().any(|j| j.code == journal.code) {
            let msg = format!("journal {} already exists", journal.code);
            return Err(DomainError::conflict(msg).into());
        }
        self.journals.push(journal);
        Ok(())
    }

    pub fn add_period(&mut self, period: Period) -> Result<(), RepositoryError> {
        let overlaps = self.periods.iter().any(|p| {
            p.company == period.company && p.start <= period.end && period.start <= p.end
        });
        if overlaps {
            let msg = format!("period {} overlaps an existing period", period.name);
            return Err(DomainError::conflict(msg).into());
        }
        self.periods.push(period);
        Ok(())
    }

    pub fn close_period(
        &mut self,
        company: CompanyId,
        date: NaiveDate,
    ) -> Result<(), RepositoryError> {
        let period = self
            .periods
            .iter_mut()
            .find(|p| p.company == company && p.contains(date))
            .ok_or_else(|| RepositoryError::not_found("period", date))?;
        period.close();
        Ok(())
    }

    pub fn insert_party(&mut self, party: Party) -> Result<PartyId, RepositoryError> {
        self.require_account(party.pocket_account())?;
        let id = party.id_typed();
        self.parties.insert(id, party);
        Ok(id)
    }

    /// Register an artist. Group members must already exist as solo artists.
    pub fn insert_artist(&mut self, artist: Artist) -> Result<ArtistId, RepositoryError> {
        self.require_account(artist.hat_account())?;
        if let Some(party) = artist.party() {
            self.require_party(party)?;
        }
        for member in artist.members() {
            let m = self
                .artists
                .get(member)
                .ok_or_else(|| RepositoryError::not_found("artist", member))?;
            if m.is_group() {
                return Err(DomainError::invariant(format!(
                    "group {} cannot contain group {}",
                    artist.name(),
                    m.name()
                ))
                .into());
            }
        }
        let id = artist.id_typed();
        self.artists.insert(id, artist);
        Ok(id)
    }

    /// Register a creation. Its attributed artist and every contributor must exist.
    pub fn insert_creation(&mut self, creation: Creation) -> Result<CreationId, RepositoryError> {
        self.require_artist(creation.artist())?;
        for c in creation.contributions() {
            self.require_artist(c.artist)?;
        }
        let id = creation.id_typed();
        self.creations.insert(id, creation);
        Ok(id)
    }

    pub fn record_utilisation(
        &mut self,
        utilisation: Utilisation,
    ) -> Result<UtilisationId, RepositoryError> {
        self.require_party(utilisation.party())?;
        if !self.creations.contains_key(&utilisation.creation()) {
            return Err(RepositoryError::not_found("creation", utilisation.creation()));
        }
        if !utilisation.is_pending() {
            let msg = "new utilisations must not be distributed yet";
            return Err(DomainError::validation(msg).into());
        }
        let id = utilisation.id_typed();
        self.utilisations.insert(id, utilisation);
        Ok(id)
    }

    /// Book money into a party's pocket: debit the bank (first asset account),
    /// credit the pocket.
    pub fn deposit_to_pocket(
        &mut self,
        party: PartyId,
        amount: Decimal,
        date: NaiveDate,
        journal_code: &str,
    ) -> Result<MoveId, RepositoryError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("deposit must be positive").into());
        }
        let party = self.require_party(party)?.clone();
        let bank = self
            .find_account(AccountKind::Asset)?
            .ok_or_else(|| RepositoryError::not_found("account", "asset"))?;
        let journal = self
            .find_journal(journal_code)?
            .ok_or_else(|| RepositoryError::not_found("journal", journal_code))?;
        let period = self
            .find_period(party.company(), date)?
            .ok_or_else(|| RepositoryError::not_found("period", date))?;

        let origin = format!("deposit {}", party.name());
        let counterparty = Some(Counterparty::Party(party.id_typed()));
        let mut builder = MoveBuilder::new(&journal, &period, date, origin);
        builder
            .debit(bank.id, counterparty, amount, "bank")
            .credit(party.pocket_account(), counterparty, amount, "pocket");
        let mv = builder
            .build()
            .map_err(|e| DomainError::validation(format!("deposit rejected: {e}")))?;

        let id = mv.id;
        self.moves.push(mv);
        Ok(id)
    }

    /// Credit − debit on `account` for lines booked against `counterparty`.
    fn counterparty_balance(&self, account: AccountId, counterparty: Counterparty) -> Decimal {
        self.moves
            .iter()
            .flat_map(|m| m.lines.iter())
            .filter(|l| l.account == account && l.counterparty == Some(counterparty))
            .map(|l| l.credit - l.debit)
            .sum()
    }

    /// Earned, undistributed royalties of an artist.
    pub fn hat_balance(&self, artist: ArtistId) -> Result<Decimal, RepositoryError> {
        let hat = self.require_artist(artist)?.hat_account();
        Ok(self.counterparty_balance(hat, Counterparty::Artist(artist)))
    }

    /// Signed balance (debit-positive) of an account over all moves.
    pub fn account_balance(&self, account: AccountId) -> Decimal {
        self.moves
            .iter()
            .flat_map(|m| m.lines.iter())
            .filter(|l| l.account == account)
            .map(|l| l.balance())
            .sum()
    }

    pub fn utilisation(&self, id: UtilisationId) -> Option<&Utilisation> {
        self.utilisations.get(&id)
    }

    pub fn utilisations(&self) -> impl Iterator<Item = &Utilisation> {
        self.utilisations.values()
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.values()
    }

    pub fn allocations_of(&self, distribution: DistributionId) -> Vec<&Allocation> {
        self.allocations
            .values()
            .filter(|a| a.distribution == distribution)
            .collect()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    fn require_account(&self, id: AccountId) -> Result<&Account, RepositoryError> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| RepositoryError::not_found("account", id))
    }

    fn require_party(&self, id: PartyId) -> Result<&Party, RepositoryError> {
        self.parties
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("party", id))
    }

    fn require_artist(&self, id: ArtistId) -> Result<&Artist, RepositoryError> {
        self.artists
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("artist", id))
    }

    #[cfg(test)]
    pub(crate) fn forget_artist(&mut self, id: ArtistId) {
        self.artists.remove(&id);
    }
}

impl DistributionRepository for RepositoryState {
    fn find_pending_utilisations(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<Utilisation>, RepositoryError> {
        Ok(self
            .utilisations
            .values()
            .filter(|u| u.is_pending() && window.contains(u.timestamp()))
            .cloned()
            .collect())
    }

    fn find_party(&self, id: PartyId) -> Result<Option<Party>, RepositoryError> {
        Ok(self.parties.get(&id).cloned())
    }

    fn pocket_balance(&self, party: PartyId) -> Result<Decimal, RepositoryError> {
        let pocket = self.require_party(party)?.pocket_account();
        Ok(self.counterparty_balance(pocket, Counterparty::Party(party)))
    }

    fn find_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError> {
        Ok(self.artists.get(&id).cloned())
    }

    fn find_creation(&self, id: CreationId) -> Result<Option<Creation>, RepositoryError> {
        Ok(self.creations.get(&id).cloned())
    }

    fn create_distribution(
        &mut self,
        sequence: &dyn CodeSequence,
        date: NaiveDate,
        from: NaiveDate,
        thru: NaiveDate,
    ) -> Result<Distribution, RepositoryError> {
        let code = sequence.next_code();
        if self.distributions.iter().any(|d| d.code == code) {
            let msg = format!("distribution code {code} already used");
            return Err(DomainError::conflict(msg).into());
        }
        let distribution = Distribution {
            id: DistributionId::generate(),
            code,
            date,
            from_date: from,
            thru_date: thru,
        };
        self.distributions.push(distribution.clone());
        Ok(distribution)
    }

    fn create_allocation(
        &mut self,
        allocation: NewAllocation,
    ) -> Result<Allocation, RepositoryError> {
        if !self.distributions.iter().any(|d| d.id == allocation.distribution) {
            return Err(RepositoryError::not_found("distribution", allocation.distribution));
        }
        self.require_party(allocation.party)?;

        let allocation = Allocation::from_new(AllocationId::generate(), allocation);
        self.allocations.insert(allocation.id, allocation.clone());
        Ok(allocation)
    }

    fn attach_moves(
        &mut self,
        allocation: AllocationId,
        moves: &[MoveId],
    ) -> Result<(), RepositoryError> {
        let a = self
            .allocations
            .get_mut(&allocation)
            .ok_or_else(|| RepositoryError::not_found("allocation", allocation))?;
        a.moves.extend_from_slice(moves);
        Ok(())
    }

    fn update_utilisation_state(
        &mut self,
        utilisations: &[UtilisationId],
        state: UtilisationState,
        allocation: Option<AllocationId>,
    ) -> Result<(), RepositoryError> {
        for id in utilisations {
            let u = self
                .utilisations
                .get_mut(id)
                .ok_or_else(|| RepositoryError::not_found("utilisation", id))?;
            u.transition(state, allocation)?;
        }
        Ok(())
    }

    fn create_ledger_moves(&mut self, moves: Vec<Move>) -> Result<Vec<MoveId>, RepositoryError> {
        let mut ids = Vec::with_capacity(moves.len());
        for mv in &moves {
            if !mv.is_balanced() {
                return Err(DomainError::invariant(format!("move {} is unbalanced", mv.id)).into());
            }
            for line in &mv.lines {
                self.require_account(line.account)?;
            }
            ids.push(mv.id);
        }
        self.moves.extend(moves);
        Ok(ids)
    }

    fn find_account(&self, kind: AccountKind) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.iter().find(|a| a.kind == kind).cloned())
    }

    fn find_journal(&self, code: &str) -> Result<Option<Journal>, RepositoryError> {
        Ok(self.journals.iter().find(|j| j.code == code).cloned())
    }

    fn find_period(
        &self,
        company: CompanyId,
        date: NaiveDate,
    ) -> Result<Option<Period>, RepositoryError> {
        Ok(self
            .periods
            .iter()
            .find(|p| p.company == company && p.open && p.contains(date))
            .cloned())
    }
}

/// Shared handle over [`RepositoryState`].
///
/// [`InMemoryRepository::transaction`] is the only way to write: it holds the
/// write lock for the whole unit of work (one writer at a time), works on a
/// copy, and publishes the copy only if the closure succeeds.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut RepositoryState) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.state.write().map_err(|_| RepositoryError::Lock)?;

        let mut working = (*guard).clone();
        let out = f(&mut working)?;
        *guard = working;

        Ok(out)
    }

    /// Run a read-only query against committed state.
    pub fn read<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&RepositoryState) -> T,
    {
        let guard = self.state.read().map_err(|_| RepositoryError::Lock)?;
        Ok(f(&guard))
    }
}
