//! Tournament, its configuration, and the entities it owns: brackets, stops, teams and
//! stop-scoped roster rows.

use crate::models::game::GameSlot;
use crate::models::player::PlayerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;
/// Unique identifier for a bracket (skill division).
pub type BracketId = Uuid;
/// Unique identifier for a stop (dated event within a tournament).
pub type StopId = Uuid;
/// Unique identifier for a team (one club's entry in one bracket).
pub type TeamId = Uuid;

/// Per-tournament settings the core reads.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    /// Roster cap per bracket. `None` or `Some(0)` means unlimited.
    #[serde(default)]
    pub max_team_size: Option<u32>,
    /// Game slots created for each non-bye match.
    #[serde(default = "GameSlot::base_slots")]
    pub game_slots: Vec<GameSlot>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            max_team_size: None,
            game_slots: GameSlot::base_slots(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub config: TournamentConfig,
}

impl Tournament {
    pub fn new(name: impl Into<String>, config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
        }
    }
}

/// A named skill division (e.g. "Advanced"). Scopes rosters, matchups and caps.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub id: BracketId,
    pub tournament_id: TournamentId,
    pub name: String,
    /// Display/scheduling order within the tournament.
    #[serde(default)]
    pub idx: u32,
    /// Overrides the tournament's `max_team_size` for this bracket when set.
    #[serde(default)]
    pub max_roster_size: Option<u32>,
}

impl Bracket {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>, idx: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            idx,
            max_roster_size: None,
        }
    }

    /// Effective roster cap; `None` when unlimited.
    pub fn roster_cap(&self, config: &TournamentConfig) -> Option<u32> {
        self.max_roster_size
            .or(config.max_team_size)
            .filter(|cap| *cap > 0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub tournament_id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl Stop {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            start_date: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub bracket_id: BracketId,
    pub name: String,
}

impl Team {
    pub fn new(tournament_id: TournamentId, bracket_id: BracketId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            bracket_id,
            name: name.into(),
        }
    }
}

/// Roster membership: a player on a team's roster for one stop.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTeamPlayer {
    pub stop_id: StopId,
    pub team_id: TeamId,
    pub player_id: PlayerId,
}
