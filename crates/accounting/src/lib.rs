//! Accounting module (accounts + registry, in-memory, concurrency-safe).
//!
//! Pure domain logic only: no IO, no HTTP. Every balance lives behind its own
//! account lock; the registry lock only guards the id -> account map.

pub mod account;
pub mod audit;
pub mod registry;

pub use account::{Account, AccountSnapshot};
pub use audit::{AuditKind, AuditRecord, AuditSink, InMemoryAuditLog, NoopAuditSink};
pub use registry::Registry;
