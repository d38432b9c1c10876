//! Tree generation error types.

use super::models::ChampionshipId;
use thiserror::Error;

/// Tree generation errors
#[derive(Debug, Error)]
pub enum TreeGenerationError {
    /// Not enough fighters to give every area its minimum
    #[error(
        "Insufficient participants: {participants} for {areas} area(s), need at least {min_per_area} per area"
    )]
    InsufficientParticipants {
        participants: usize,
        areas: usize,
        min_per_area: usize,
    },

    /// Settings outside the allowed values
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Championship not found
    #[error("Championship not found: {0}")]
    ChampionshipNotFound(ChampionshipId),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure of a non-SQL round store
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TreeGenerationError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            TreeGenerationError::Database(_) | TreeGenerationError::Storage(_) => {
                "Internal server error".to_string()
            }
            TreeGenerationError::ChampionshipNotFound(_) => "Championship not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tree generation
pub type TreeResult<T> = Result<T, TreeGenerationError>;
