//! Distribution run pipeline: one unit of work, then event fan-out.
//!
//! ```text
//! run(run_date, from, thru)
//!   ↓
//! 1. Open a unit of work on the repository (write lock + working copy)
//!   ↓
//! 2. Distributor::run against the working copy
//!   ↓
//! 3. Commit on success, discard on any error
//!   ↓
//! 4. Publish DistributionEvents (only after commit)
//! ```
//!
//! Publishing is best-effort: the ledger is already committed when the bus is
//! called, so a failed publish is logged, never turned into a run failure.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use royalty_distribution::{DistributionError, DistributionEvent, DistributionResult, Distributor};
use royalty_events::EventBus;

use crate::store::InMemoryRepository;

pub struct DistributionService<B>
where
    B: EventBus<DistributionEvent>,
{
    repo: Arc<InMemoryRepository>,
    distributor: Distributor,
    bus: B,
}

impl<B> DistributionService<B>
where
    B: EventBus<DistributionEvent>,
{
    pub fn new(repo: Arc<InMemoryRepository>, distributor: Distributor, bus: B) -> Self {
        Self {
            repo,
            distributor,
            bus,
        }
    }

    pub fn repository(&self) -> &Arc<InMemoryRepository> {
        &self.repo
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Run one distribution atomically.
    ///
    /// On error nothing is persisted and nothing is published.
    pub fn run(
        &self,
        run_date: NaiveDate,
        from: NaiveDate,
        thru: NaiveDate,
    ) -> Result<DistributionResult, DistributionError> {
        let result = self
            .repo
            .transaction(|state| self.distributor.run(state, run_date, from, thru))
            .inspect_err(|err| {
                tracing::error!(error = %err, %from, %thru, "distribution rolled back")
            })?;

        for event in result.events(Utc::now()) {
            if let Err(err) = self.bus.publish(event) {
                tracing::warn!(error = ?err, "failed to publish distribution event");
            }
        }

        Ok(result)
    }
}
