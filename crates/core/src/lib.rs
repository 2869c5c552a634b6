//! `royalty-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every royalty crate:
//! identifiers, the domain error model, money rounding, and entity markers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, AggregateId, CompanyId};
pub use money::Currency;
pub use value_object::ValueObject;
