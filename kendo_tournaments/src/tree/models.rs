//! Tree generation data models: participants, settings, planned and persisted rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Championship ID type
pub type ChampionshipId = i64;

/// Competitor or team ID type
pub type ParticipantId = i64;

/// Round ID type
pub type RoundId = i64;

/// Organizational entity key (federation, association or club ID)
pub type EntityKey = i64;

/// Minimum number of real participants each fighting area must receive
pub const MIN_COMPETITORS_BY_AREA: usize = 2;

/// Preliminary group size used when a championship has no stored settings
pub const DEFAULT_PRELIMINARY_GROUP_SIZE: usize = 3;

/// Group size used to pad brackets that have no preliminary stage
pub const ELIMINATION_GROUP_SIZE: usize = 2;

/// Allowed preliminary group sizes
pub const PRELIMINARY_GROUP_SIZES: [usize; 3] = [3, 4, 5];

/// Allowed fighting area counts
pub const FIGHTING_AREA_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// Whether a championship is fought by individuals or by teams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    Competitor,
    Team,
}

impl ParticipantKind {
    pub fn is_team(self) -> bool {
        self == ParticipantKind::Team
    }
}

/// Organizational affiliations of a participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub federation_id: Option<EntityKey>,
    pub association_id: Option<EntityKey>,
    pub club_id: Option<EntityKey>,
}

/// Affiliation level used to keep fighters of the same entity apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLevel {
    /// Countries for an international tournament
    Federation,
    /// States or regions for a national tournament
    Association,
    /// Clubs for a local tournament
    Club,
}

impl EntityLevel {
    /// Entity key of `participant` at this level
    pub fn key_of(self, participant: &Participant) -> Option<EntityKey> {
        let affiliation = &participant.affiliation;
        match self {
            EntityLevel::Federation => affiliation.federation_id,
            EntityLevel::Association => affiliation.association_id,
            EntityLevel::Club => affiliation.club_id,
        }
    }
}

impl std::str::FromStr for EntityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "federation" => Ok(EntityLevel::Federation),
            "association" => Ok(EntityLevel::Association),
            "club" => Ok(EntityLevel::Club),
            other => Err(format!("unknown entity level: {other}")),
        }
    }
}

/// A competitor or a team entered in a championship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    pub affiliation: Affiliation,
}

impl Participant {
    /// Individual competitor without affiliation
    pub fn competitor(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ParticipantKind::Competitor,
            affiliation: Affiliation::default(),
        }
    }

    /// Team without affiliation
    pub fn team(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            kind: ParticipantKind::Team,
            ..Self::competitor(id, name)
        }
    }

    pub fn with_affiliation(mut self, affiliation: Affiliation) -> Self {
        self.affiliation = affiliation;
        self
    }
}

/// One bracket position: a real fighter or a bye
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Fighter(Participant),
    /// Placeholder with no opponent; carries no identifier
    Bye,
}

impl Slot {
    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }

    pub fn participant(&self) -> Option<&Participant> {
        match self {
            Slot::Fighter(participant) => Some(participant),
            Slot::Bye => None,
        }
    }
}

/// Participants sharing one entity key, in source order
pub type EntityGroup = Vec<Participant>;

/// Tree format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeType {
    RoundRobin,
    #[default]
    DirectElimination,
}

impl TreeType {
    /// Storage code (0 = round robin, 1 = direct elimination)
    pub fn code(self) -> i16 {
        match self {
            TreeType::RoundRobin => 0,
            TreeType::DirectElimination => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(TreeType::RoundRobin),
            1 => Some(TreeType::DirectElimination),
            _ => None,
        }
    }
}

impl std::str::FromStr for TreeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "round-robin" | "0" => Ok(TreeType::RoundRobin),
            "direct-elimination" | "1" => Ok(TreeType::DirectElimination),
            other => Err(format!("unknown tree type: {other}")),
        }
    }
}

/// Championship settings, read once per generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Round robin groups are fought before the elimination tree
    pub has_preliminary: bool,
    /// Fighters per preliminary group (3, 4 or 5)
    pub preliminary_group_size: usize,
    /// Tree format
    pub tree_type: TreeType,
    /// Number of fighting areas (1, 2, 4 or 8)
    pub fighting_areas: usize,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            has_preliminary: false,
            preliminary_group_size: DEFAULT_PRELIMINARY_GROUP_SIZE,
            tree_type: TreeType::DirectElimination,
            fighting_areas: 1,
        }
    }
}

impl TournamentSettings {
    /// Group size the bracket is padded to
    ///
    /// Championships without a preliminary stage are padded with pairs,
    /// round robin included.
    pub fn group_size(&self) -> usize {
        if self.has_preliminary {
            self.preliminary_group_size
        } else {
            ELIMINATION_GROUP_SIZE
        }
    }

    /// Check the values the settings form allows
    pub fn validate(&self) -> Result<(), String> {
        if !PRELIMINARY_GROUP_SIZES.contains(&self.preliminary_group_size) {
            return Err(format!(
                "preliminary group size must be one of {:?}, got {}",
                PRELIMINARY_GROUP_SIZES, self.preliminary_group_size
            ));
        }
        if !FIGHTING_AREA_COUNTS.contains(&self.fighting_areas) {
            return Err(format!(
                "fighting areas must be one of {:?}, got {}",
                FIGHTING_AREA_COUNTS, self.fighting_areas
            ));
        }
        Ok(())
    }
}

/// Championship as seen by the tree generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Championship {
    pub id: ChampionshipId,
    /// Roster that round members are attached to
    pub kind: ParticipantKind,
    pub settings: TournamentSettings,
}

/// A first-stage group that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlan {
    /// Fighting area (1-indexed)
    pub area: u32,
    /// Match order within the area (1-indexed)
    pub order: u32,
    /// Seats in randomized order, byes included
    pub slots: Vec<Slot>,
}

impl RoundPlan {
    /// IDs of the real fighters, in seat order
    pub fn member_ids(&self) -> Vec<ParticipantId> {
        self.slots
            .iter()
            .filter_map(Slot::participant)
            .map(|p| p.id)
            .collect()
    }

    pub fn bye_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_bye()).count()
    }
}

/// Full output of the pure part of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePlan {
    /// Padded bracket size
    pub bracket_size: usize,
    /// Byes inserted to reach the bracket size
    pub bye_count: usize,
    /// Padded pool split per fighting area
    pub areas: Vec<Vec<Slot>>,
    /// First-stage groups of every area
    pub rounds: Vec<RoundPlan>,
}

/// Persisted first-stage group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub championship_id: ChampionshipId,
    pub area: u32,
    pub order: u32,
    pub member_ids: Vec<ParticipantId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_size_follows_format() {
        let mut settings = TournamentSettings::default();
        assert_eq!(settings.group_size(), 2);

        settings.tree_type = TreeType::RoundRobin;
        assert_eq!(settings.group_size(), 2);

        settings.has_preliminary = true;
        settings.preliminary_group_size = 5;
        assert_eq!(settings.group_size(), 5);
    }

    #[test]
    fn test_validate_rejects_unsupported_values() {
        let valid = TournamentSettings::default();
        assert!(valid.validate().is_ok());

        let bad_group = TournamentSettings {
            preliminary_group_size: 0,
            ..valid
        };
        assert!(bad_group.validate().is_err());

        let bad_areas = TournamentSettings {
            fighting_areas: 3,
            ..valid
        };
        assert!(bad_areas.validate().is_err());
    }

    #[test]
    fn test_entity_level_key_of() {
        let p = Participant::competitor(1, "Musashi").with_affiliation(Affiliation {
            federation_id: Some(10),
            association_id: None,
            club_id: Some(30),
        });

        assert_eq!(EntityLevel::Federation.key_of(&p), Some(10));
        assert_eq!(EntityLevel::Association.key_of(&p), None);
        assert_eq!(EntityLevel::Club.key_of(&p), Some(30));
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("club".parse::<EntityLevel>(), Ok(EntityLevel::Club));
        assert!("dojo".parse::<EntityLevel>().is_err());
        assert_eq!("round-robin".parse::<TreeType>(), Ok(TreeType::RoundRobin));
        assert_eq!(
            "direct_elimination".parse::<TreeType>(),
            Ok(TreeType::DirectElimination)
        );
        assert_eq!(TreeType::from_code(TreeType::RoundRobin.code()), Some(TreeType::RoundRobin));
        assert_eq!(TreeType::from_code(7), None);
    }

    #[test]
    fn test_round_plan_skips_byes() {
        let plan = RoundPlan {
            area: 1,
            order: 1,
            slots: vec![
                Slot::Bye,
                Slot::Fighter(Participant::competitor(7, "Kojiro")),
            ],
        };

        assert_eq!(plan.member_ids(), vec![7]);
        assert_eq!(plan.bye_count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let settings = TournamentSettings {
            tree_type: TreeType::RoundRobin,
            ..TournamentSettings::default()
        };
        let json = serde_json::to_value(settings).unwrap();
        assert_eq!(json["tree_type"], "round_robin");

        assert_eq!(serde_json::to_value(Slot::Bye).unwrap(), "bye");
        let fighter = serde_json::to_value(Slot::Fighter(Participant::competitor(3, "Sato"))).unwrap();
        assert_eq!(fighter["fighter"]["id"], 3);
    }
}
