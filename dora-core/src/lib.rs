//! Dora Core
//!
//! Core types and pure logic for the DORA team simulator.
//!
//! This crate contains:
//! - Domain types: tiers, deployments, changes and status classification
//! - Cadence: the decision of when the simulated team deploys next

pub mod cadence;
pub mod domain;

pub use cadence::{DelayDecision, RandomSource, minutes_until_next_deployment};
