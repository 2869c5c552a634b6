//! Events published after a distribution run commits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use royalty_events::Event;
use royalty_parties::PartyId;

use crate::model::{AllocationId, DistributionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionEvent {
    AllocationCreated {
        distribution: DistributionId,
        allocation: AllocationId,
        party: PartyId,
        amount: Decimal,
        share_amount: Decimal,
        utilisations: usize,
        occurred_at: DateTime<Utc>,
    },
    DistributionCompleted {
        distribution: DistributionId,
        code: String,
        allocations: usize,
        utilisations_processed: usize,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for DistributionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DistributionEvent::AllocationCreated { .. } => "distribution.allocation_created",
            DistributionEvent::DistributionCompleted { .. } => "distribution.completed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DistributionEvent::AllocationCreated { occurred_at, .. }
            | DistributionEvent::DistributionCompleted { occurred_at, .. } => *occurred_at,
        }
    }
}
