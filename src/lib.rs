//! Turnkey: property-operations task backend.
//!
//! This crate provides the core of a property-management platform for
//! assigning cleaning and maintenance work across properties: the task
//! lifecycle state machine, assignment escalation, proof-gated completion,
//! inspection review, and recurring-task regeneration.
//!
//! # Architecture
//!
//! Turnkey follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, blob
//!   storage, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, checklist gating, and recurrence

pub mod task;
