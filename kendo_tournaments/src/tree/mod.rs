//! Tree module: first-round generation for a championship.
//!
//! The pipeline runs in order:
//! - entity grouping and redistribution, so fighters of one club or
//!   federation do not meet early
//! - bracket sizing and homogeneous bye insertion
//! - splitting across fighting areas
//! - first-stage groups per format, with randomized match and seat order
//!
//! ## Example
//!
//! ```no_run
//! use kendo_tournaments::db::{Database, PgTreeRepository};
//! use kendo_tournaments::tree::{EntityLevel, TreeGenerator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let repository = Arc::new(PgTreeRepository::new(db.pool().clone()));
//!     let generator =
//!         TreeGenerator::from_repository(repository).with_group_by(Some(EntityLevel::Club));
//!
//!     let rounds = generator.generate_bracket(1).await?;
//!     println!("Generated {} rounds", rounds.len());
//!
//!     Ok(())
//! }
//! ```

pub mod areas;
pub mod byes;
pub mod errors;
pub mod generator;
pub mod grouping;
pub mod models;
pub mod rounds;

pub use errors::{TreeGenerationError, TreeResult};
pub use generator::{TreeGenerator, check_participants, plan_tree};
pub use models::{
    Affiliation, Championship, ChampionshipId, DEFAULT_PRELIMINARY_GROUP_SIZE, EntityGroup,
    EntityKey, EntityLevel, MIN_COMPETITORS_BY_AREA, Participant, ParticipantId, ParticipantKind,
    Round, RoundId, RoundPlan, Slot, TournamentSettings, TreePlan, TreeType,
};
