//! HTTP API: server wiring, routing, and request/response mapping for the
//! in-memory ledger.

pub mod app;
pub mod config;
