//! `tally-core`: ledger domain building blocks.
//!
//! This crate contains **pure domain** primitives (no locking, no IO).

pub mod amount;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use amount::Amount;
pub use entity::Entity;
pub use error::{LedgerError, LedgerResult};
pub use id::AccountId;
pub use value_object::ValueObject;
