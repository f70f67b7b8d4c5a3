//! Core routing engine for emergency medical services: given a triage
//! severity and a presenting complaint, decide which hospitals can treat
//! the patient right now and in what order to recommend them.
//!
//! Upstream registry access, distance lookups, and transport live behind
//! traits in [`routing::gateway`]; everything in [`routing`] itself is
//! synchronous computation over an already-fetched snapshot.

pub mod config;
pub mod error;
pub mod routing;
pub mod telemetry;
