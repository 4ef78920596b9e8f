//! Round, Match and Game: the schedule produced for a stop and the per-slot games played in it.

use crate::models::player::PlayerId;
use crate::models::tournament::{BracketId, StopId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RoundId = Uuid;
pub type MatchId = Uuid;
pub type GameId = Uuid;

/// Four players per team per match: positions 0-1 MALE, 2-3 FEMALE.
pub type Lineup = [PlayerId; 4];

/// Side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TeamPosition {
    A,
    B,
}

impl TeamPosition {
    pub fn other(self) -> Self {
        match self {
            TeamPosition::A => TeamPosition::B,
            TeamPosition::B => TeamPosition::A,
        }
    }
}

impl std::fmt::Display for TeamPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamPosition::A => write!(f, "A"),
            TeamPosition::B => write!(f, "B"),
        }
    }
}

/// Which game of a match this is.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum GameSlot {
    #[serde(rename = "MENS_DOUBLES")]
    MensDoubles,
    #[serde(rename = "WOMENS_DOUBLES")]
    WomensDoubles,
    #[serde(rename = "MIXED_1")]
    Mixed1,
    #[serde(rename = "MIXED_2")]
    Mixed2,
    #[serde(rename = "TIEBREAKER")]
    Tiebreaker,
}

impl GameSlot {
    /// The four slots every non-bye match is created with by default.
    pub fn base_slots() -> Vec<GameSlot> {
        vec![
            GameSlot::MensDoubles,
            GameSlot::WomensDoubles,
            GameSlot::Mixed1,
            GameSlot::Mixed2,
        ]
    }

    pub fn is_tiebreaker(self) -> bool {
        self == GameSlot::Tiebreaker
    }

    /// Lineup positions that play this slot. The tiebreaker is not drawn from fixed positions.
    pub fn positions(self) -> Option<[usize; 2]> {
        match self {
            GameSlot::MensDoubles => Some([0, 1]),
            GameSlot::WomensDoubles => Some([2, 3]),
            GameSlot::Mixed1 => Some([0, 2]),
            GameSlot::Mixed2 => Some([1, 3]),
            GameSlot::Tiebreaker => None,
        }
    }
}

impl std::fmt::Display for GameSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameSlot::MensDoubles => "MENS_DOUBLES",
            GameSlot::WomensDoubles => "WOMENS_DOUBLES",
            GameSlot::Mixed1 => "MIXED_1",
            GameSlot::Mixed2 => "MIXED_2",
            GameSlot::Tiebreaker => "TIEBREAKER",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for GameSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MENS_DOUBLES" => Ok(GameSlot::MensDoubles),
            "WOMENS_DOUBLES" => Ok(GameSlot::WomensDoubles),
            "MIXED_1" => Ok(GameSlot::Mixed1),
            "MIXED_2" => Ok(GameSlot::Mixed2),
            "TIEBREAKER" => Ok(GameSlot::Tiebreaker),
            other => Err(format!("unknown game slot '{other}'")),
        }
    }
}

/// Lifecycle of a single game. Only forward, one step at a time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    NotStarted,
    InProgress {
        #[serde(rename = "startedAt")]
        started_at: DateTime<Utc>,
    },
    Completed {
        #[serde(rename = "startedAt")]
        started_at: DateTime<Utc>,
        #[serde(rename = "endedAt")]
        ended_at: DateTime<Utc>,
    },
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::NotStarted => "NOT_STARTED",
            GameState::InProgress { .. } => "IN_PROGRESS",
            GameState::Completed { .. } => "COMPLETED",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One slot of a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub match_id: MatchId,
    pub slot: GameSlot,
    #[serde(flatten)]
    pub state: GameState,
    pub team_a_score: Option<u32>,
    pub team_b_score: Option<u32>,
    /// The pair playing for team A; set when the match lineup is confirmed.
    pub team_a_lineup: Option<[PlayerId; 2]>,
    pub team_b_lineup: Option<[PlayerId; 2]>,
    pub court_number: Option<String>,
    /// Lock version; bumped on every write.
    pub version: u64,
}

impl Game {
    pub fn new(match_id: MatchId, slot: GameSlot) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            slot,
            state: GameState::NotStarted,
            team_a_score: None,
            team_b_score: None,
            team_a_lineup: None,
            team_b_lineup: None,
            court_number: None,
            version: 0,
        }
    }

    pub fn has_started(&self) -> bool {
        !matches!(self.state, GameState::NotStarted)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, GameState::Completed { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            GameState::NotStarted => None,
            GameState::InProgress { started_at } | GameState::Completed { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            GameState::Completed { ended_at, .. } => Some(ended_at),
            _ => None,
        }
    }

    pub fn lineup_confirmed(&self) -> bool {
        self.team_a_lineup.is_some() && self.team_b_lineup.is_some()
    }

    /// Side with the strictly higher score, if both scores are present.
    pub fn leader(&self) -> Option<TeamPosition> {
        match (self.team_a_score, self.team_b_score) {
            (Some(a), Some(b)) if a > b => Some(TeamPosition::A),
            (Some(a), Some(b)) if b > a => Some(TeamPosition::B),
            _ => None,
        }
    }

    /// Winner of a completed game.
    pub fn winner(&self) -> Option<TeamPosition> {
        if self.is_complete() {
            self.leader()
        } else {
            None
        }
    }
}

/// Both teams' confirmed lineups for a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLineups {
    pub team_a: Lineup,
    pub team_b: Lineup,
}

/// A pairing of two teams (or a bye) within one round and bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub round_id: RoundId,
    pub bracket_id: BracketId,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub lineups: Option<MatchLineups>,
    /// Side that forfeited, if any.
    pub forfeit: Option<TeamPosition>,
    /// Side awarded the match on total points after a 2-2 split.
    #[serde(default)]
    pub points_winner: Option<TeamPosition>,
    /// Game ids in slot order; the tiebreaker, when derived, is appended last.
    pub games: Vec<GameId>,
}

impl Match {
    pub fn new(
        round_id: RoundId,
        bracket_id: BracketId,
        team_a: Option<TeamId>,
        team_b: Option<TeamId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_id,
            bracket_id,
            team_a,
            team_b,
            lineups: None,
            forfeit: None,
            points_winner: None,
            games: Vec::new(),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.team_a.is_none() || self.team_b.is_none()
    }

    pub fn team(&self, position: TeamPosition) -> Option<TeamId> {
        match position {
            TeamPosition::A => self.team_a,
            TeamPosition::B => self.team_b,
        }
    }

    pub fn set_team(&mut self, position: TeamPosition, team: Option<TeamId>) {
        match position {
            TeamPosition::A => self.team_a = team,
            TeamPosition::B => self.team_b = team,
        }
    }

    pub fn position_of(&self, team: TeamId) -> Option<TeamPosition> {
        if self.team_a == Some(team) {
            Some(TeamPosition::A)
        } else if self.team_b == Some(team) {
            Some(TeamPosition::B)
        } else {
            None
        }
    }
}

/// One bracket's share of a round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRound {
    pub bracket_id: BracketId,
    pub matches: Vec<MatchId>,
}

/// An ordered round within a stop. Matches are grouped per bracket once at generation time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    pub stop_id: StopId,
    pub idx: u32,
    pub brackets: Vec<BracketRound>,
}

impl Round {
    pub fn new(stop_id: StopId, idx: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            stop_id,
            idx,
            brackets: Vec::new(),
        }
    }

    pub fn bracket(&self, bracket_id: BracketId) -> Option<&BracketRound> {
        self.brackets.iter().find(|b| b.bracket_id == bracket_id)
    }

    pub fn match_ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.brackets.iter().flat_map(|b| b.matches.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.iter().all(|b| b.matches.is_empty())
    }
}
