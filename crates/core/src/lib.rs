//! `klabis-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the club modules
//! (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{MemberId, SportEventId};
pub use money::MoneyAmount;
pub use value_object::ValueObject;
