//! Tree generator: runs the seeding pipeline and persists the first rounds.

use super::areas::partition_areas;
use super::byes::{bye_count, bye_group, insert_byes, tree_size};
use super::errors::{TreeGenerationError, TreeResult};
use super::grouping::{group_by_entity, max_group_len, repart, singleton_groups};
use super::models::{
    ChampionshipId, EntityLevel, MIN_COMPETITORS_BY_AREA, Participant, Round, TournamentSettings,
    TreePlan,
};
use super::rounds::plan_rounds;
use crate::db::{ChampionshipSource, FighterSource, RoundStore};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;

/// Fail unless every area gets at least `MIN_COMPETITORS_BY_AREA` real fighters
pub fn check_participants(participant_count: usize, fighting_areas: usize) -> TreeResult<()> {
    if participant_count < MIN_COMPETITORS_BY_AREA * fighting_areas {
        return Err(TreeGenerationError::InsufficientParticipants {
            participants: participant_count,
            areas: fighting_areas,
            min_per_area: MIN_COMPETITORS_BY_AREA,
        });
    }
    Ok(())
}

/// Build the whole tree in memory
///
/// Fighters are grouped by entity (or kept apart one by one when `group_by`
/// is `None`), interleaved, padded with byes, split across areas and cut
/// into first-stage groups.
pub fn plan_tree<R: Rng + ?Sized>(
    participants: Vec<Participant>,
    settings: &TournamentSettings,
    group_by: Option<EntityLevel>,
    rng: &mut R,
) -> TreePlan {
    let fighter_count = participants.len();
    let group_size = settings.group_size();
    let byes = bye_group(bye_count(fighter_count, group_size));

    if fighter_count > tree_size(fighter_count, group_size) {
        warn!(
            "{fighter_count} fighters exceed the largest bracket for groups of {group_size}, no byes added"
        );
    }

    let groups = match group_by {
        Some(level) => group_by_entity(participants, |p| level.key_of(p)),
        None => singleton_groups(participants),
    };
    let max = max_group_len(&groups);
    debug!("{} entity group(s), biggest holds {max}", groups.len());

    let fighters = repart(groups, max);
    let bye_total = byes.len();
    let pool = insert_byes(fighters, byes);
    let bracket_size = pool.len();

    let areas = partition_areas(pool, settings.fighting_areas);
    let rounds = plan_rounds(&areas, settings, rng);

    TreePlan {
        bracket_size,
        bye_count: bye_total,
        areas,
        rounds,
    }
}

/// Generates championship trees against pluggable repositories
#[derive(Clone)]
pub struct TreeGenerator {
    fighters: Arc<dyn FighterSource>,
    championships: Arc<dyn ChampionshipSource>,
    rounds: Arc<dyn RoundStore>,
    group_by: Option<EntityLevel>,
}

impl TreeGenerator {
    /// Create a new tree generator
    pub fn new(
        fighters: Arc<dyn FighterSource>,
        championships: Arc<dyn ChampionshipSource>,
        rounds: Arc<dyn RoundStore>,
    ) -> Self {
        Self {
            fighters,
            championships,
            rounds,
            group_by: None,
        }
    }

    /// Generator using one repository for every collaborator
    pub fn from_repository<R>(repository: Arc<R>) -> Self
    where
        R: FighterSource + ChampionshipSource + RoundStore + 'static,
    {
        Self::new(repository.clone(), repository.clone(), repository)
    }

    /// Keep fighters of the same entity apart at `level`
    pub fn with_group_by(mut self, level: Option<EntityLevel>) -> Self {
        self.group_by = level;
        self
    }

    /// Generate the first rounds of a championship
    ///
    /// Previous rounds are replaced as one unit: either the whole new tree is
    /// stored or nothing changes.
    ///
    /// # Errors
    ///
    /// * `TreeGenerationError::InsufficientParticipants` - fewer than
    ///   `MIN_COMPETITORS_BY_AREA` fighters per area; nothing is deleted
    /// * `TreeGenerationError::InvalidSettings` - stored settings out of range
    /// * `TreeGenerationError::Database` / `Storage` - the write failed and was rolled back
    pub async fn generate_bracket(&self, championship_id: ChampionshipId) -> TreeResult<Vec<Round>> {
        let championship = self.championships.get_championship(championship_id).await?;
        let settings = championship.settings;
        settings
            .validate()
            .map_err(TreeGenerationError::InvalidSettings)?;

        let participants = self.fighters.get_participants(championship_id).await?;
        check_participants(participants.len(), settings.fighting_areas)?;

        let plan = self.plan(participants, &settings);
        info!(
            "Championship {championship_id}: bracket of {} with {} bye(s) over {} area(s)",
            plan.bracket_size, plan.bye_count, settings.fighting_areas
        );

        let rounds = self
            .rounds
            .replace_rounds(championship_id, championship.kind, &plan.rounds)
            .await?;
        info!("Championship {championship_id}: {} round(s) stored", rounds.len());

        Ok(rounds)
    }

    /// Pure part of the pipeline with a fresh random source
    pub fn plan(&self, participants: Vec<Participant>, settings: &TournamentSettings) -> TreePlan {
        let mut rng = rand::rng();
        plan_tree(participants, settings, self.group_by, &mut rng)
    }

    /// Validate and store settings before a generation run
    pub async fn update_settings(
        &self,
        championship_id: ChampionshipId,
        settings: &TournamentSettings,
    ) -> TreeResult<()> {
        settings
            .validate()
            .map_err(TreeGenerationError::InvalidSettings)?;
        self.championships
            .save_settings(championship_id, settings)
            .await
    }

    /// Stored rounds of a championship
    pub async fn rounds(&self, championship_id: ChampionshipId) -> TreeResult<Vec<Round>> {
        self.rounds.rounds_for(championship_id).await
    }
}
