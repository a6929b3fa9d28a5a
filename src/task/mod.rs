//! Task lifecycle and recurrence engine.
//!
//! This module implements the core of the property-operations backend: the
//! state machine carrying a task from creation through offer
//! acceptance/rejection with fallback escalation, checklist/proof-gated
//! completion, inspection review, and automatic regeneration of the next
//! occurrence for recurring tasks. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
