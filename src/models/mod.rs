//! Data structures for the team tournament: players, tournament structure, rosters, schedule.

mod error;
mod game;
mod player;
mod tournament;

pub use error::{CapScope, EntityKind, LeagueError, LineupViolation, Result};
pub use game::{
    BracketRound, Game, GameId, GameSlot, GameState, Lineup, Match, MatchId, MatchLineups, Round,
    RoundId, TeamPosition,
};
pub use player::{Gender, Player, PlayerId};
pub use tournament::{
    Bracket, BracketId, Stop, StopId, StopTeamPlayer, Team, TeamId, Tournament, TournamentConfig,
    TournamentId,
};
