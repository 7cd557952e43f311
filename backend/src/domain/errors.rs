//! Domain error taxonomy.
//!
//! Services return `anyhow::Result`; these typed errors travel inside the
//! `anyhow::Error` and are downcast at the REST boundary to pick a status
//! code. Nothing here is fatal to the process: every failure is scoped to
//! one operation and recoverable by retry or corrected input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// No signed-in user; blocks all mutating operations
    #[error("not authenticated")]
    NotAuthenticated,

    /// A persistence call failed; local state was left unchanged
    #[error("storage failure: {0}")]
    StoreFailure(String),

    /// A referenced entity no longer exists
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A whole-hour grid slot already holds a session
    #[error("slot {day} {hour}:00 is already occupied")]
    SlotOccupied { day: String, hour: u32 },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}
