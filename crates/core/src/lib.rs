//! Pure domain logic for inbound short-term forecast handling.
//!
//! Provides the canonical interval-series types and reshaping algorithm,
//! the per-planning-group merge target, and shared id aliases. This crate
//! has no internal dependencies so both the service bridge and any future
//! CLI tooling can use it.

pub mod catalog;
pub mod error;
pub mod intervals;
pub mod types;
