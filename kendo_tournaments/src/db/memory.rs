//! In-memory implementation of the tree repositories.
//!
//! Used by tests and benchmarks. Round writes are staged on a copy of the
//! state and only swapped in when the whole tree was written, which mirrors
//! the rollback behaviour of the PostgreSQL transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::repository::{ChampionshipSource, FighterSource, RoundStore, RoundWriter, write_rounds};
use crate::tree::{
    Championship, ChampionshipId, Participant, ParticipantId, ParticipantKind, Round, RoundId,
    RoundPlan, TournamentSettings, TreeGenerationError, TreeResult,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    championships: HashMap<ChampionshipId, Championship>,
    participants: HashMap<ChampionshipId, Vec<Participant>>,
    rounds: Vec<Round>,
    /// Roster each round's members were attached to
    rosters: HashMap<RoundId, ParticipantKind>,
    next_round_id: RoundId,
}

/// Tree repositories backed by process memory
#[derive(Clone, Default)]
pub struct MemoryTreeRepository {
    state: Arc<RwLock<MemoryState>>,
    /// Fail the n-th `create_round` call of every unit of work (0-indexed)
    fail_at_create: Option<usize>,
}

impl MemoryTreeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a championship and its participants
    pub async fn add_championship(&self, championship: Championship, participants: Vec<Participant>) {
        let mut state = self.state.write().await;
        state.participants.insert(championship.id, participants);
        state.championships.insert(championship.id, championship);
    }

    /// Make the `index`-th round creation of each write fail
    pub fn failing_at_create(mut self, index: usize) -> Self {
        self.fail_at_create = Some(index);
        self
    }

    /// Roster the members of `round_id` were attached to
    pub async fn roster_of(&self, round_id: RoundId) -> Option<ParticipantKind> {
        self.state.read().await.rosters.get(&round_id).copied()
    }

    /// Add rounds outside of a generation run
    pub async fn insert_round(
        &self,
        championship_id: ChampionshipId,
        area: u32,
        order: u32,
        member_ids: Vec<ParticipantId>,
    ) -> RoundId {
        let mut state = self.state.write().await;
        state.next_round_id += 1;
        let id = state.next_round_id;
        state.rounds.push(Round {
            id,
            championship_id,
            area,
            order,
            member_ids,
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl FighterSource for MemoryTreeRepository {
    async fn get_participants(
        &self,
        championship_id: ChampionshipId,
    ) -> TreeResult<Vec<Participant>> {
        self.state
            .read()
            .await
            .participants
            .get(&championship_id)
            .cloned()
            .ok_or(TreeGenerationError::ChampionshipNotFound(championship_id))
    }
}

#[async_trait]
impl ChampionshipSource for MemoryTreeRepository {
    async fn get_championship(&self, championship_id: ChampionshipId) -> TreeResult<Championship> {
        self.state
            .read()
            .await
            .championships
            .get(&championship_id)
            .cloned()
            .ok_or(TreeGenerationError::ChampionshipNotFound(championship_id))
    }

    async fn save_settings(
        &self,
        championship_id: ChampionshipId,
        settings: &TournamentSettings,
    ) -> TreeResult<()> {
        let mut state = self.state.write().await;
        let championship = state
            .championships
            .get_mut(&championship_id)
            .ok_or(TreeGenerationError::ChampionshipNotFound(championship_id))?;
        championship.settings = *settings;
        Ok(())
    }
}

#[async_trait]
impl RoundStore for MemoryTreeRepository {
    async fn replace_rounds(
        &self,
        championship_id: ChampionshipId,
        kind: ParticipantKind,
        plans: &[RoundPlan],
    ) -> TreeResult<Vec<Round>> {
        let mut state = self.state.write().await;

        let mut writer = MemoryRoundWriter {
            staged: state.clone(),
            creates: 0,
            fail_at_create: self.fail_at_create,
        };
        write_rounds(&mut writer, championship_id, kind, plans).await?;

        *state = writer.staged;
        Ok(rounds_of(&state, championship_id))
    }

    async fn rounds_for(&self, championship_id: ChampionshipId) -> TreeResult<Vec<Round>> {
        Ok(rounds_of(&*self.state.read().await, championship_id))
    }
}

fn rounds_of(state: &MemoryState, championship_id: ChampionshipId) -> Vec<Round> {
    let mut rounds: Vec<Round> = state
        .rounds
        .iter()
        .filter(|r| r.championship_id == championship_id)
        .cloned()
        .collect();
    rounds.sort_by_key(|r| (r.area, r.order));
    rounds
}

/// Writer working on a staged copy of the state
struct MemoryRoundWriter {
    staged: MemoryState,
    creates: usize,
    fail_at_create: Option<usize>,
}

#[async_trait]
impl RoundWriter for MemoryRoundWriter {
    async fn delete_all_rounds(&mut self, championship_id: ChampionshipId) -> TreeResult<u64> {
        let before = self.staged.rounds.len();
        let rosters = &mut self.staged.rosters;
        self.staged.rounds.retain(|r| {
            let keep = r.championship_id != championship_id;
            if !keep {
                rosters.remove(&r.id);
            }
            keep
        });
        Ok((before - self.staged.rounds.len()) as u64)
    }

    async fn create_round(
        &mut self,
        area: u32,
        order: u32,
        championship_id: ChampionshipId,
    ) -> TreeResult<RoundId> {
        if self.fail_at_create == Some(self.creates) {
            return Err(TreeGenerationError::Storage(format!(
                "injected failure creating round {order} of area {area}"
            )));
        }
        self.creates += 1;

        self.staged.next_round_id += 1;
        let id = self.staged.next_round_id;
        self.staged.rounds.push(Round {
            id,
            championship_id,
            area,
            order,
            member_ids: Vec::new(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn attach_members(
        &mut self,
        round_id: RoundId,
        member_ids: &[ParticipantId],
        kind: ParticipantKind,
    ) -> TreeResult<()> {
        let round = self
            .staged
            .rounds
            .iter_mut()
            .find(|r| r.id == round_id)
            .ok_or_else(|| TreeGenerationError::Storage(format!("round {round_id} not found")))?;
        round.member_ids.extend_from_slice(member_ids);
        self.staged.rosters.insert(round_id, kind);
        Ok(())
    }
}
