//! Utilisations, distributions and allocations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use royalty_accounting::MoveId;
use royalty_core::{DomainError, DomainResult, Entity};
use royalty_parties::PartyId;
use royalty_repertoire::CreationId;

use crate::apportion::Apportionment;
use crate::events::DistributionEvent;

royalty_core::typed_id!(
    /// Utilisation identifier.
    UtilisationId
);

royalty_core::typed_id!(
    /// Distribution identifier.
    DistributionId
);

royalty_core::typed_id!(
    /// Allocation identifier.
    AllocationId
);

/// Utilisation lifecycle: `not_distributed → processing → distributed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilisationState {
    NotDistributed,
    Processing,
    Distributed,
}

impl UtilisationState {
    /// Only forward, single-step transitions are allowed.
    pub fn can_transition_to(self, next: UtilisationState) -> bool {
        matches!(
            (self, next),
            (UtilisationState::NotDistributed, UtilisationState::Processing)
                | (UtilisationState::Processing, UtilisationState::Distributed)
        )
    }
}

/// One usage event of a creation by a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilisation {
    id: UtilisationId,
    party: PartyId,
    creation: CreationId,
    timestamp: DateTime<Utc>,
    state: UtilisationState,
    allocation: Option<AllocationId>,
}

impl Utilisation {
    pub fn new(
        id: UtilisationId,
        party: PartyId,
        creation: CreationId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            party,
            creation,
            timestamp,
            state: UtilisationState::NotDistributed,
            allocation: None,
        }
    }

    pub fn id_typed(&self) -> UtilisationId {
        self.id
    }

    pub fn party(&self) -> PartyId {
        self.party
    }

    pub fn creation(&self) -> CreationId {
        self.creation
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn state(&self) -> UtilisationState {
        self.state
    }

    pub fn allocation(&self) -> Option<AllocationId> {
        self.allocation
    }

    pub fn is_pending(&self) -> bool {
        self.state == UtilisationState::NotDistributed
    }

    /// Advance the lifecycle, optionally linking the covering allocation.
    ///
    /// An already linked allocation cannot be replaced by a different one.
    pub fn transition(
        &mut self,
        next: UtilisationState,
        allocation: Option<AllocationId>,
    ) -> DomainResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::conflict(format!(
                "utilisation {} cannot move from {:?} to {:?}",
                self.id, self.state, next
            )));
        }
        if let (Some(current), Some(new)) = (self.allocation, allocation) {
            if current != new {
                return Err(DomainError::conflict(format!(
                    "utilisation {} already belongs to allocation {current}",
                    self.id
                )));
            }
        }
        self.state = next;
        if allocation.is_some() {
            self.allocation = allocation;
        }
        Ok(())
    }
}

impl Entity for Utilisation {
    type Id = UtilisationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Inclusive date range of a run, matched on the UTC calendar date.
///
/// Equivalent to `[from 00:00:00, thru + 1 day 00:00:00)`, so a timestamp at
/// 23:59:59.5 on `thru` is still inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    from: NaiveDate,
    thru: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, thru: NaiveDate) -> DomainResult<Self> {
        if from > thru {
            return Err(DomainError::validation(format!(
                "from_date {from} is after thru_date {thru}"
            )));
        }
        Ok(Self { from, thru })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn thru(&self) -> NaiveDate {
        self.thru
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        self.from <= day && day <= self.thru
    }
}

/// One batch run over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: DistributionId,
    pub code: String,
    pub date: NaiveDate,
    pub from_date: NaiveDate,
    pub thru_date: NaiveDate,
}

impl Entity for Distribution {
    type Id = DistributionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Direction of an allocation's money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationKind {
    /// Party pocket → artist hats (what a distribution run books).
    Pocket2Hats,
    /// Artist hat → party pockets (payouts, booked elsewhere).
    Hat2Pockets,
}

/// What the orchestrator asks the repository to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAllocation {
    pub distribution: DistributionId,
    pub party: PartyId,
    pub kind: AllocationKind,
    pub amount: Decimal,
    pub fee_amount: Decimal,
    pub share_amount: Decimal,
    pub utilisations: Vec<UtilisationId>,
}

/// One party's share within a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub distribution: DistributionId,
    pub party: PartyId,
    pub kind: AllocationKind,
    /// Total taken from the pocket.
    pub amount: Decimal,
    /// Nominal company fee (before rounding adjustment).
    pub fee_amount: Decimal,
    /// Amount apportioned per utilisation.
    pub share_amount: Decimal,
    pub utilisations: Vec<UtilisationId>,
    pub moves: Vec<MoveId>,
}

impl Allocation {
    pub fn from_new(id: AllocationId, new: NewAllocation) -> Self {
        Self {
            id,
            distribution: new.distribution,
            party: new.party,
            kind: new.kind,
            amount: new.amount,
            fee_amount: new.fee_amount,
            share_amount: new.share_amount,
            utilisations: new.utilisations,
            moves: Vec::new(),
        }
    }
}

impl Entity for Allocation {
    type Id = AllocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Pocket balance is zero or negative.
    ZeroBalance,
    /// `min(balance, budget)` rounds to zero.
    ZeroAmount,
}

/// A party whose utilisations stay pending for a later run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedParty {
    pub party: PartyId,
    pub reason: SkipReason,
    pub utilisations: usize,
}

/// Allocation plus what was actually booked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub allocation: Allocation,
    /// Fee credit on the move: nominal fee plus the allocation-level rounding residual.
    pub fee_booked: Decimal,
    /// Settled hat credits per artist, summed over the allocation's utilisations.
    pub payouts: Apportionment,
}

impl AllocationReport {
    /// fee booked + all hat credits; equals `allocation.amount` exactly.
    pub fn booked_total(&self) -> Decimal {
        self.fee_booked + self.payouts.total()
    }
}

/// Outcome of a run: either a no-op or a distribution with its allocations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistributionResult {
    pub distribution: Option<Distribution>,
    pub allocations: Vec<AllocationReport>,
    pub skipped: Vec<SkippedParty>,
    pub moves: Vec<MoveId>,
    pub utilisations_processed: usize,
}

impl DistributionResult {
    /// Nothing was pending in the window; no records were created.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.distribution.is_none()
    }

    pub fn distribution_id(&self) -> Option<DistributionId> {
        self.distribution.as_ref().map(|d| d.id)
    }

    /// Events describing a committed run. Empty for a no-op.
    pub fn events(&self, occurred_at: DateTime<Utc>) -> Vec<DistributionEvent> {
        let Some(distribution) = &self.distribution else {
            return Vec::new();
        };

        let mut events: Vec<DistributionEvent> = self
            .allocations
            .iter()
            .map(|report| DistributionEvent::AllocationCreated {
                distribution: distribution.id,
                allocation: report.allocation.id,
                party: report.allocation.party,
                amount: report.allocation.amount,
                share_amount: report.allocation.share_amount,
                utilisations: report.allocation.utilisations.len(),
                occurred_at,
            })
            .collect();

        events.push(DistributionEvent::DistributionCompleted {
            distribution: distribution.id,
            code: distribution.code.clone(),
            allocations: self.allocations.len(),
            utilisations_processed: self.utilisations_processed,
            occurred_at,
        });
        events
    }
}
