//! Errors returned by every core operation.

use crate::models::game::{GameId, GameSlot, GameState, MatchId, RoundId, TeamPosition};
use crate::models::player::{Gender, PlayerId};
use crate::models::tournament::{BracketId, StopId, TeamId};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = LeagueError> = std::result::Result<T, E>;

/// Kind of entity a lookup failed for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum EntityKind {
    Tournament,
    Bracket,
    Stop,
    Team,
    Player,
    Round,
    Match,
    Game,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Tournament => "Tournament",
            EntityKind::Bracket => "Bracket",
            EntityKind::Stop => "Stop",
            EntityKind::Team => "Team",
            EntityKind::Player => "Player",
            EntityKind::Round => "Round",
            EntityKind::Match => "Match",
            EntityKind::Game => "Game",
        };
        f.write_str(s)
    }
}

/// Which roster ceiling was hit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapScope {
    /// The roster for one stop.
    Stop,
    /// Distinct players across all of the team's stop rosters.
    Bracket,
    /// Limit supplied by the caller.
    Client,
}

/// Why a lineup was rejected. Positions are 0-based indexes into the 4-player lineup.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LineupViolation {
    #[error("position {position} must be {expected}, but {player} is not")]
    WrongGender {
        position: usize,
        player: PlayerId,
        expected: Gender,
    },
    #[error("player {player} appears more than once (position {position})")]
    DuplicatePlayer { position: usize, player: PlayerId },
    #[error("player {player} at position {position} is already in the opposing lineup")]
    PlayerInBothLineups { position: usize, player: PlayerId },
    #[error("player {player} at position {position} is not on the team's roster for this stop")]
    NotOnRoster { position: usize, player: PlayerId },
    #[error("no lineup supplied for this team")]
    Missing,
}

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("{}", capacity_message(.scope, .count, .cap))]
    CapacityExceeded { scope: CapScope, count: usize, cap: u32 },

    #[error(
        "Some players are already assigned to a different team in this tournament: {}",
        join_ids(.player_ids)
    )]
    CrossBracketConflict { player_ids: Vec<PlayerId> },

    #[error("Invalid lineup for team {team_id}: {violation}")]
    InvalidLineup {
        team_id: TeamId,
        violation: LineupViolation,
    },

    #[error("Match {match_id} has started; lineups can no longer be changed")]
    MatchLocked { match_id: MatchId },

    #[error("Cannot move a team from bracket {found} into bracket {expected}")]
    BracketMismatch { expected: BracketId, found: BracketId },

    #[error("Match {match_id} has a game in progress; matchups can no longer be changed")]
    MatchInProgress { match_id: MatchId },

    #[error("Game {game_id} is tied {score}-{score}; a winner is required to complete it")]
    TiedScore { game_id: GameId, score: u32 },

    #[error("Stop {stop_id} already has a schedule ({rounds} rounds); regenerate with overwrite")]
    AlreadyGenerated { stop_id: StopId, rounds: usize },

    #[error("Bracket {bracket_name} has no registered teams")]
    NoTeamsInBracket {
        bracket_id: BracketId,
        bracket_name: String,
    },

    #[error("Game {game_id} was modified concurrently (expected version {expected}, found {actual})")]
    ConcurrentModification {
        game_id: GameId,
        expected: u64,
        actual: u64,
    },

    #[error("Cannot {action} game {game_id} while it is {state}")]
    InvalidTransition {
        game_id: GameId,
        state: GameState,
        action: &'static str,
    },

    #[error("Game {game_id} needs both scores before it can be completed")]
    IncompleteScore { game_id: GameId },

    #[error("Game {game_id} ({slot}) cannot start before both lineups are confirmed")]
    LineupRequired { game_id: GameId, slot: GameSlot },

    #[error("Match {match_id} is a bye")]
    ByeMatch { match_id: MatchId },

    #[error("{kind} {id} does not belong to this tournament")]
    TournamentMismatch { kind: EntityKind, id: Uuid },

    #[error("Team {team_id} is scheduled more than once in round {round_id}")]
    DuplicateTeam { team_id: TeamId, round_id: RoundId },

    #[error("Match {match_id} does not need a tiebreaker (wins {wins_a}-{wins_b})")]
    TiebreakerNotRequired {
        match_id: MatchId,
        wins_a: usize,
        wins_b: usize,
    },

    #[error("Team {position} already forfeited match {match_id}")]
    AlreadyForfeited {
        match_id: MatchId,
        position: TeamPosition,
    },

    #[error("{0}")]
    InvalidInput(String),
}

impl LeagueError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        LeagueError::NotFound { kind, id }
    }
}

fn capacity_message(scope: &CapScope, count: &usize, cap: &u32) -> String {
    match scope {
        CapScope::Stop => format!("Bracket exceeds its limit for this stop ({count}/{cap})"),
        CapScope::Bracket => {
            format!("Bracket limit exceeded across all stops ({count}/{cap} unique players)")
        }
        CapScope::Client => format!("Too many players for this stop ({count}/{cap})"),
    }
}

fn join_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_shows_count_and_cap() {
        let err = LeagueError::CapacityExceeded {
            scope: CapScope::Stop,
            count: 6,
            cap: 5,
        };
        assert_eq!(err.to_string(), "Bracket exceeds its limit for this stop (6/5)");
    }
}
