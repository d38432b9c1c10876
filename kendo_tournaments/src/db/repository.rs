//! Repository trait definitions for the tree generator's collaborators.
//!
//! The generator reads participants and championship settings, then replaces
//! the championship's rounds in a single unit of work. Each concern is a
//! trait so the PostgreSQL implementation can be swapped for the in-memory
//! one in tests.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::tree::{
    Affiliation, Championship, ChampionshipId, Participant, ParticipantId, ParticipantKind,
    Round, RoundId, RoundPlan, TournamentSettings, TreeGenerationError, TreeResult, TreeType,
};

/// Source of the participants entered in a championship
#[async_trait]
pub trait FighterSource: Send + Sync {
    /// Competitors or teams of the championship, in registration order
    async fn get_participants(
        &self,
        championship_id: ChampionshipId,
    ) -> TreeResult<Vec<Participant>>;
}

/// Source of championship settings
#[async_trait]
pub trait ChampionshipSource: Send + Sync {
    /// Championship with its settings (defaults when none are stored)
    async fn get_championship(&self, championship_id: ChampionshipId) -> TreeResult<Championship>;

    /// Store settings, as the settings form does before generation
    async fn save_settings(
        &self,
        championship_id: ChampionshipId,
        settings: &TournamentSettings,
    ) -> TreeResult<()>;
}

/// Round writes performed inside one unit of work
#[async_trait]
pub trait RoundWriter: Send {
    /// Delete every round of the championship, returning how many were removed
    async fn delete_all_rounds(&mut self, championship_id: ChampionshipId) -> TreeResult<u64>;

    /// Create an empty round
    async fn create_round(
        &mut self,
        area: u32,
        order: u32,
        championship_id: ChampionshipId,
    ) -> TreeResult<RoundId>;

    /// Attach members to the team or competitor roster of a round, in seat order
    async fn attach_members(
        &mut self,
        round_id: RoundId,
        member_ids: &[ParticipantId],
        kind: ParticipantKind,
    ) -> TreeResult<()>;
}

/// Persistence of generated rounds
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Replace all rounds of the championship with `plans`, atomically
    async fn replace_rounds(
        &self,
        championship_id: ChampionshipId,
        kind: ParticipantKind,
        plans: &[RoundPlan],
    ) -> TreeResult<Vec<Round>>;

    /// Rounds of the championship ordered by area then order
    async fn rounds_for(&self, championship_id: ChampionshipId) -> TreeResult<Vec<Round>>;
}

/// Delete the previous tree, then create every planned round with its members
///
/// Byes are never attached. Callers own the transaction boundary.
pub async fn write_rounds<W: RoundWriter + ?Sized>(
    writer: &mut W,
    championship_id: ChampionshipId,
    kind: ParticipantKind,
    plans: &[RoundPlan],
) -> TreeResult<Vec<RoundId>> {
    let deleted = writer.delete_all_rounds(championship_id).await?;
    if deleted > 0 {
        log::debug!("Deleted {deleted} previous round(s) of championship {championship_id}");
    }

    let mut round_ids = Vec::with_capacity(plans.len());
    for plan in plans {
        let round_id = writer
            .create_round(plan.area, plan.order, championship_id)
            .await?;
        let member_ids = plan.member_ids();
        if !member_ids.is_empty() {
            writer.attach_members(round_id, &member_ids, kind).await?;
        }
        round_ids.push(round_id);
    }

    Ok(round_ids)
}

/// Default PostgreSQL implementation of the tree repositories
#[derive(Clone)]
pub struct PgTreeRepository {
    pool: PgPool,
}

impl PgTreeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn championship_kind(
        &self,
        championship_id: ChampionshipId,
    ) -> TreeResult<ParticipantKind> {
        let row = sqlx::query(
            "SELECT cat.is_team
             FROM championships c JOIN categories cat ON cat.id = c.category_id
             WHERE c.id = $1",
        )
        .bind(championship_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TreeGenerationError::ChampionshipNotFound(championship_id))?;

        Ok(if row.get::<bool, _>("is_team") {
            ParticipantKind::Team
        } else {
            ParticipantKind::Competitor
        })
    }
}

fn settings_from_row(row: &PgRow) -> TreeResult<TournamentSettings> {
    let Some(has_preliminary) = row.get::<Option<bool>, _>("has_preliminary") else {
        return Ok(TournamentSettings::default());
    };

    let tree_code: i16 = row.get("tree_type");
    let tree_type = TreeType::from_code(tree_code).ok_or_else(|| {
        TreeGenerationError::InvalidSettings(format!("unknown tree type code {tree_code}"))
    })?;
    let group_size: i32 = row.get("preliminary_group_size");
    let areas: i32 = row.get("fighting_areas");

    Ok(TournamentSettings {
        has_preliminary,
        preliminary_group_size: usize::try_from(group_size).map_err(|_| {
            TreeGenerationError::InvalidSettings(format!("negative group size {group_size}"))
        })?,
        tree_type,
        fighting_areas: usize::try_from(areas).map_err(|_| {
            TreeGenerationError::InvalidSettings(format!("negative area count {areas}"))
        })?,
    })
}

#[async_trait]
impl FighterSource for PgTreeRepository {
    async fn get_participants(
        &self,
        championship_id: ChampionshipId,
    ) -> TreeResult<Vec<Participant>> {
        let kind = self.championship_kind(championship_id).await?;
        let table = if kind.is_team() { "teams" } else { "competitors" };

        let sql = format!(
            "SELECT id, name, federation_id, association_id, club_id
             FROM {table} WHERE championship_id = $1 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(championship_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Participant {
                id: r.get("id"),
                name: r.get("name"),
                kind,
                affiliation: Affiliation {
                    federation_id: r.get("federation_id"),
                    association_id: r.get("association_id"),
                    club_id: r.get("club_id"),
                },
            })
            .collect())
    }
}

#[async_trait]
impl ChampionshipSource for PgTreeRepository {
    async fn get_championship(&self, championship_id: ChampionshipId) -> TreeResult<Championship> {
        let row = sqlx::query(
            "SELECT c.id, cat.is_team, s.has_preliminary, s.preliminary_group_size,
                    s.tree_type, s.fighting_areas
             FROM championships c
             JOIN categories cat ON cat.id = c.category_id
             LEFT JOIN championship_settings s ON s.championship_id = c.id
             WHERE c.id = $1",
        )
        .bind(championship_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TreeGenerationError::ChampionshipNotFound(championship_id))?;

        let kind = if row.get::<bool, _>("is_team") {
            ParticipantKind::Team
        } else {
            ParticipantKind::Competitor
        };

        Ok(Championship {
            id: row.get("id"),
            kind,
            settings: settings_from_row(&row)?,
        })
    }

    async fn save_settings(
        &self,
        championship_id: ChampionshipId,
        settings: &TournamentSettings,
    ) -> TreeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO championship_settings
                (championship_id, has_preliminary, preliminary_group_size, tree_type, fighting_areas, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (championship_id)
            DO UPDATE SET
                has_preliminary = EXCLUDED.has_preliminary,
                preliminary_group_size = EXCLUDED.preliminary_group_size,
                tree_type = EXCLUDED.tree_type,
                fighting_areas = EXCLUDED.fighting_areas,
                updated_at = NOW()
            "#,
        )
        .bind(championship_id)
        .bind(settings.has_preliminary)
        .bind(settings.preliminary_group_size as i32)
        .bind(settings.tree_type.code())
        .bind(settings.fighting_areas as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RoundStore for PgTreeRepository {
    async fn replace_rounds(
        &self,
        championship_id: ChampionshipId,
        kind: ParticipantKind,
        plans: &[RoundPlan],
    ) -> TreeResult<Vec<Round>> {
        // Dropping the transaction on error rolls back the whole tree
        let mut tx = self.pool.begin().await?;

        let mut writer = PgRoundWriter::new(&mut *tx);
        write_rounds(&mut writer, championship_id, kind, plans).await?;

        tx.commit().await?;

        self.rounds_for(championship_id).await
    }

    async fn rounds_for(&self, championship_id: ChampionshipId) -> TreeResult<Vec<Round>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.championship_id, r.area, r.round_order, r.created_at,
                   COALESCE(
                       array_agg(m.member_id ORDER BY m.seat) FILTER (WHERE m.member_id IS NOT NULL),
                       '{}'
                   ) AS member_ids
            FROM rounds r
            LEFT JOIN (
                SELECT round_id, competitor_id AS member_id, seat FROM round_competitor
                UNION ALL
                SELECT round_id, team_id AS member_id, seat FROM round_team
            ) m ON m.round_id = r.id
            WHERE r.championship_id = $1
            GROUP BY r.id
            ORDER BY r.area, r.round_order
            "#,
        )
        .bind(championship_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Round {
                id: r.get("id"),
                championship_id: r.get("championship_id"),
                area: r.get::<i32, _>("area") as u32,
                order: r.get::<i32, _>("round_order") as u32,
                member_ids: r.get("member_ids"),
                created_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            })
            .collect())
    }
}

/// Round writer bound to one PostgreSQL connection, usually a transaction
pub struct PgRoundWriter<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgRoundWriter<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RoundWriter for PgRoundWriter<'_> {
    async fn delete_all_rounds(&mut self, championship_id: ChampionshipId) -> TreeResult<u64> {
        let result = sqlx::query("DELETE FROM rounds WHERE championship_id = $1")
            .bind(championship_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create_round(
        &mut self,
        area: u32,
        order: u32,
        championship_id: ChampionshipId,
    ) -> TreeResult<RoundId> {
        let row = sqlx::query(
            "INSERT INTO rounds (championship_id, area, round_order) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(championship_id)
        .bind(area as i32)
        .bind(order as i32)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(row.get("id"))
    }

    async fn attach_members(
        &mut self,
        round_id: RoundId,
        member_ids: &[ParticipantId],
        kind: ParticipantKind,
    ) -> TreeResult<()> {
        let (table, column) = match kind {
            ParticipantKind::Team => ("round_team", "team_id"),
            ParticipantKind::Competitor => ("round_competitor", "competitor_id"),
        };

        let sql = format!(
            "INSERT INTO {table} (round_id, {column}, seat)
             SELECT $1, m.member_id, m.seat::INT
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS m(member_id, seat)"
        );
        sqlx::query(&sql)
            .bind(round_id)
            .bind(member_ids)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}
