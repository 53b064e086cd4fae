//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP API); outbound adapters
//! implement the domain ports against real technology (Redis, reqwest,
//! MaxMind) plus an in-memory store for tests and fallback use.

pub mod inbound;
pub mod outbound;
