//! Workforce-management service bridge for inbound forecast generation.
//!
//! Provides the REST client, typed notification parsing, the
//! completion-waiter state machine, and the orchestrator that turns a
//! generation request into canonical per-planning-group forecast series.

pub mod api;
pub mod config;
pub mod events;
pub mod fetcher;
pub mod messages;
pub mod orchestrator;
pub mod transport;
pub mod waiter;
