//! Scheduling and billing ledger for private tutors.
//!
//! The crate is layered the same way top to bottom: `domain` holds the
//! models, the scheduling/billing core and the services; `storage` holds
//! the backend-agnostic traits and the CSV implementation; `rest` maps
//! the `shared` DTOs onto domain commands.

pub mod domain;
pub mod rest;
pub mod storage;
