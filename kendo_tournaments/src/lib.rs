//! # Kendo Tournaments
//!
//! Generation of the first rounds of a championship tree.
//!
//! A flat pool of competitors or teams is turned into first-stage matches:
//! fighters of the same entity are spread apart, byes pad the pool to a
//! valid bracket size, the pool is split across fighting areas and cut into
//! groups for the chosen format (round robin, direct elimination, or direct
//! elimination with a preliminary round robin stage).
//!
//! ## Core Modules
//!
//! - [`tree`]: the seeding pipeline and the [`TreeGenerator`] that runs it
//! - [`db`]: connection pooling and the repositories the generator uses

/// Seeding pipeline, models and generator.
pub mod tree;
pub use tree::{
    Participant, Round, Slot, TournamentSettings, TreeGenerationError, TreeGenerator, TreeResult,
    TreeType,
};

/// Database connection and repositories.
pub mod db;
