//! Multi-criteria decision analysis scoring.
//!
//! The [`scoring`] module holds the engine (Simple Additive Weighting and Weighted Product over
//! flat or two-level criteria). Everything else is the plumbing a service needs around it.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
