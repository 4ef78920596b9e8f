//! Deciding matches: the 2-2 tiebreaker, points decisions, forfeits, and the overall match
//! outcome.

use crate::models::{
    Game, GameId, GameSlot, LeagueError, Match, MatchId, Result, TeamId, TeamPosition,
};
use crate::store::LeagueStore;
use serde::Serialize;

/// Number of base games a match must have for the tiebreaker rule to apply.
const BASE_GAMES: usize = 4;
/// Base-game wins that decide a match outright.
const WINS_TO_DECIDE: usize = 3;

/// What the deriver concluded after looking at a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TiebreakerDecision {
    /// Not every base game is complete yet.
    NotReady,
    /// All base games are complete and one side won, or the match was settled by forfeit or
    /// on points.
    Decided,
    Created {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },
    AlreadyExists {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecidedBy {
    Forfeit,
    Games,
    Points,
    Tiebreaker,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub wins_a: usize,
    pub wins_b: usize,
    /// Points over the base games that have scores.
    pub points_a: u32,
    pub points_b: u32,
    pub winner: Option<TeamId>,
    pub decided_by: Option<DecidedBy>,
    /// All base games are complete at 2-2 and the tiebreaker has not finished.
    pub pending_tiebreaker: bool,
}

/// Summary of a match's games.
#[derive(Debug, Default)]
struct Tally {
    base_total: usize,
    base_completed: usize,
    wins_a: usize,
    wins_b: usize,
    points_a: u32,
    points_b: u32,
    any_started: bool,
    tiebreaker: Option<GameId>,
    tiebreaker_started: bool,
    tiebreaker_winner: Option<TeamPosition>,
}

impl Tally {
    fn of(games: &[&Game]) -> Self {
        let mut tally = Tally::default();
        for game in games {
            tally.any_started |= game.has_started();
            if game.slot.is_tiebreaker() {
                tally.tiebreaker = Some(game.id);
                tally.tiebreaker_started = game.has_started();
                tally.tiebreaker_winner = game.winner();
                continue;
            }
            tally.base_total += 1;
            tally.points_a = tally.points_a.saturating_add(game.team_a_score.unwrap_or(0));
            tally.points_b = tally.points_b.saturating_add(game.team_b_score.unwrap_or(0));
            if game.is_complete() {
                tally.base_completed += 1;
            }
            match game.winner() {
                Some(TeamPosition::A) => tally.wins_a += 1,
                Some(TeamPosition::B) => tally.wins_b += 1,
                None => {}
            }
        }
        tally
    }

    fn all_base_complete(&self) -> bool {
        self.base_total == BASE_GAMES && self.base_completed == BASE_GAMES
    }

    fn split(&self) -> bool {
        self.all_base_complete() && self.wins_a == 2 && self.wins_b == 2
    }

    fn points_leader(&self) -> Option<TeamPosition> {
        match self.points_a.cmp(&self.points_b) {
            std::cmp::Ordering::Greater => Some(TeamPosition::A),
            std::cmp::Ordering::Less => Some(TeamPosition::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

fn tally(store: &LeagueStore, match_id: MatchId) -> Result<Tally> {
    Ok(Tally::of(&store.games_of(match_id)?))
}

/// Look at a match after one of its games completed and append the TIEBREAKER game when the
/// four base games ended 2-2. Calling it again never creates a second tiebreaker, and an
/// existing tiebreaker is never removed.
pub fn derive_tiebreaker(store: &mut LeagueStore, match_id: MatchId) -> Result<TiebreakerDecision> {
    let m = store.get_match(match_id)?;
    let decided = m.forfeit.is_some() || m.points_winner.is_some();
    let tally = tally(store, match_id)?;

    match tally.tiebreaker {
        Some(game_id) => {
            if tally.all_base_complete() && !tally.split() {
                log::warn!(
                    "Match {} has tiebreaker {} but its base games ended {}-{}",
                    match_id,
                    game_id,
                    tally.wins_a,
                    tally.wins_b
                );
            }
            Ok(TiebreakerDecision::AlreadyExists { game_id })
        }
        None if decided => Ok(TiebreakerDecision::Decided),
        None if tally.split() => {
            let game = Game::new(match_id, GameSlot::Tiebreaker);
            let game_id = game.id;
            store.games.insert(game_id, game);
            store.match_mut(match_id)?.games.push(game_id);
            log::info!("Match {match_id} split 2-2, created tiebreaker {game_id}");
            Ok(TiebreakerDecision::Created { game_id })
        }
        None if tally.all_base_complete() => Ok(TiebreakerDecision::Decided),
        None => Ok(TiebreakerDecision::NotReady),
    }
}

/// Explicit request for a tiebreaker. Same as [`derive_tiebreaker`] except that asking while
/// the match is not split 2-2 is an error.
pub fn create_tiebreaker(store: &mut LeagueStore, match_id: MatchId) -> Result<GameId> {
    match derive_tiebreaker(store, match_id)? {
        TiebreakerDecision::Created { game_id } | TiebreakerDecision::AlreadyExists { game_id } => {
            Ok(game_id)
        }
        TiebreakerDecision::NotReady | TiebreakerDecision::Decided => {
            let tally = tally(store, match_id)?;
            Err(LeagueError::TiebreakerNotRequired {
                match_id,
                wins_a: tally.wins_a,
                wins_b: tally.wins_b,
            })
        }
    }
}

/// Record (or clear, with `None`) that `team` forfeits the match. Only possible before any
/// game of the match is complete.
pub fn set_forfeit(
    store: &mut LeagueStore,
    match_id: MatchId,
    team: Option<TeamPosition>,
) -> Result<Match> {
    let m = store.get_match(match_id)?;
    if m.is_bye() {
        return Err(LeagueError::ByeMatch { match_id });
    }
    if let (Some(current), Some(requested)) = (m.forfeit, team) {
        if current != requested {
            return Err(LeagueError::AlreadyForfeited {
                match_id,
                position: current,
            });
        }
    }
    if store.games_of(match_id)?.iter().any(|g| g.is_complete()) {
        return Err(LeagueError::InvalidInput(format!(
            "match {match_id} already has completed games; a forfeit can no longer be recorded"
        )));
    }

    let m = store.match_mut(match_id)?;
    m.forfeit = team;
    match team {
        Some(position) => log::info!("Team {position} forfeits match {match_id}"),
        None => log::info!("Forfeit cleared for match {match_id}"),
    }
    Ok(m.clone())
}

/// Settle a 2-2 split on total points over the four base games instead of playing the
/// tiebreaker. An unplayed tiebreaker game is removed; one that has started must be finished.
pub fn decide_by_points(store: &mut LeagueStore, match_id: MatchId) -> Result<MatchOutcome> {
    let m = store.get_match(match_id)?;
    if m.is_bye() {
        return Err(LeagueError::ByeMatch { match_id });
    }
    if m.points_winner.is_some() {
        return match_outcome(store, match_id);
    }
    let tally = tally(store, match_id)?;
    if !tally.split() {
        return Err(LeagueError::TiebreakerNotRequired {
            match_id,
            wins_a: tally.wins_a,
            wins_b: tally.wins_b,
        });
    }
    if tally.tiebreaker_started {
        return Err(LeagueError::InvalidInput(format!(
            "tiebreaker for match {match_id} has started; finish it instead"
        )));
    }
    let winner = tally.points_leader().ok_or_else(|| {
        LeagueError::InvalidInput(format!(
            "match {match_id} is level on points ({0}-{0}); play the tiebreaker",
            tally.points_a
        ))
    })?;

    if let Some(game_id) = tally.tiebreaker {
        store.games.remove(&game_id);
        store.match_mut(match_id)?.games.retain(|id| *id != game_id);
        log::debug!("Removed unplayed tiebreaker {game_id} from match {match_id}");
    }
    store.match_mut(match_id)?.points_winner = Some(winner);
    log::info!(
        "Match {} decided on points {}-{} for team {}",
        match_id,
        tally.points_a,
        tally.points_b,
        winner
    );
    match_outcome(store, match_id)
}

/// Status and winner of a match. Forfeit beats everything, then three base-game wins, then a
/// points decision, then a completed tiebreaker.
pub fn match_outcome(store: &LeagueStore, match_id: MatchId) -> Result<MatchOutcome> {
    let m = store.get_match(match_id)?;
    let tally = tally(store, match_id)?;
    let mut outcome = MatchOutcome {
        match_id,
        status: MatchStatus::NotStarted,
        wins_a: tally.wins_a,
        wins_b: tally.wins_b,
        points_a: tally.points_a,
        points_b: tally.points_b,
        winner: None,
        decided_by: None,
        pending_tiebreaker: false,
    };

    if m.is_bye() {
        // The team with the bye advances without playing.
        outcome.winner = m.team_a.or(m.team_b);
        if outcome.winner.is_some() {
            outcome.status = MatchStatus::Completed;
        }
        return Ok(outcome);
    }

    let decided = if let Some(loser) = m.forfeit {
        Some((loser.other(), DecidedBy::Forfeit))
    } else if tally.wins_a >= WINS_TO_DECIDE {
        Some((TeamPosition::A, DecidedBy::Games))
    } else if tally.wins_b >= WINS_TO_DECIDE {
        Some((TeamPosition::B, DecidedBy::Games))
    } else if let Some(position) = m.points_winner {
        Some((position, DecidedBy::Points))
    } else {
        tally
            .tiebreaker_winner
            .map(|position| (position, DecidedBy::Tiebreaker))
    };

    match decided {
        Some((position, by)) => {
            outcome.status = MatchStatus::Completed;
            outcome.winner = m.team(position);
            outcome.decided_by = Some(by);
        }
        None => {
            outcome.pending_tiebreaker = tally.split();
            if tally.any_started || outcome.pending_tiebreaker {
                outcome.status = MatchStatus::InProgress;
            }
        }
    }
    Ok(outcome)
}
