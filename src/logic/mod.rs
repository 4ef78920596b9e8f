//! Tournament business logic: rosters, lineups, schedule, matchup edits, game lifecycle.

mod game;
mod lineup;
mod matchup;
mod roster;
mod schedule;
mod tiebreaker;

pub use game::{
    apply_game_mutation, complete, set_court_number, start, update_score, CompletionOutcome,
    GameMutation, MutationOutcome, MAX_SCORE,
};
pub use lineup::{assign_lineup, pairing, save_stop_lineups};
pub use matchup::{apply_matchup_updates, confirm_matchups, swap_teams, MatchupUpdate, TeamSlot};
pub use roster::{
    bracket_unique_count, copy_from_previous_stop, remove_player_from_stop_roster, roster_cap,
    roster_summary, set_stop_roster, stop_roster, RosterSummary,
};
pub use schedule::{
    compact_rounds, delete_round, delete_schedule, generate, move_round, round_robin,
    DeleteSummary, GenerateOptions, GenerateSummary, Pairing, SkippedBracket,
};
pub use tiebreaker::{
    create_tiebreaker, decide_by_points, derive_tiebreaker, match_outcome, set_forfeit,
    DecidedBy, MatchOutcome, MatchStatus, TiebreakerDecision,
};
