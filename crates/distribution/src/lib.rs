//! Distribution engine: turns pending utilisations into allocations and
//! balanced ledger moves.
//!
//! ```text
//! pending utilisations
//!   ↓ group by utilising party
//! per party: amount = min(pocket balance, pocket budget), fee, per-utilisation share
//!   ↓ per utilisation
//! classify contributions → apportion share across artists → settle to cents
//!   ↓
//! one balanced move per party (fee credit, pocket debit, hat credits)
//! ```
//!
//! Storage is abstracted behind [`DistributionRepository`]; atomicity of a run
//! is the caller's job (see `royalty-infra`).

pub mod apportion;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod orchestrator;
pub mod repository;

pub use apportion::{Apportionment, apportion};
pub use classifier::{ContributorSets, classify};
pub use config::{CodeSequence, DistributionConfig, SplitPolicy};
pub use error::DistributionError;
pub use events::DistributionEvent;
pub use model::{
    Allocation, AllocationId, AllocationKind, AllocationReport, DateWindow, Distribution,
    DistributionId, DistributionResult, NewAllocation, SkipReason, SkippedParty, Utilisation,
    UtilisationId, UtilisationState,
};
pub use orchestrator::Distributor;
pub use repository::{DistributionRepository, RepositoryError};
