//! Parties domain module (utilising parties that pay into pockets).
//!
//! A party is the legal/commercial entity that uses creations (a venue, a
//! broadcaster) and funds distributions through its pocket account.

pub mod party;

pub use party::{Party, PartyId};
