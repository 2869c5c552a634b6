//! Infrastructure layer: storage, code sequences, configuration loading and
//! the service that runs distributions atomically.

pub mod config;
pub mod sequence;
pub mod service;
pub mod store;


pub use config::{Settings, SettingsError};
pub use sequence::PrefixedSequence;
pub use service::DistributionService;
pub use store::{InMemoryRepository, RepositoryState};
