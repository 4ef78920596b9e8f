//! Team pickleball tournament web app: library with models, storage and business logic.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod seed;
pub mod store;

pub use logic::{
    apply_game_mutation, apply_matchup_updates, assign_lineup, bracket_unique_count, complete,
    confirm_matchups, copy_from_previous_stop, create_tiebreaker, decide_by_points, delete_round,
    delete_schedule, derive_tiebreaker, generate, match_outcome, move_round, remove_player_from_stop_roster,
    save_stop_lineups, set_court_number, set_forfeit, set_stop_roster, start, stop_roster,
    swap_teams, update_score,
};
pub use models::{
    Bracket, BracketId, Game, GameId, GameSlot, GameState, Gender, LeagueError, Lineup, Match,
    MatchId, Player, PlayerId, Round, RoundId, Stop, StopId, Team, TeamId, TeamPosition,
    Tournament, TournamentConfig, TournamentId,
};
pub use store::LeagueStore;
