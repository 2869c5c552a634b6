//! Repertoire domain module: artists, creations and their contributions.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod artist;
pub mod creation;

pub use artist::{Artist, ArtistId, ArtistKind};
pub use creation::{Contribution, ContributionKind, Creation, CreationId};
