//! Game lifecycle: NOT_STARTED -> IN_PROGRESS -> COMPLETED, one step at a time.
//!
//! Every write is a conditional update on the game's lock version, so two requests racing to
//! start or complete the same game cannot both succeed.

use crate::logic::tiebreaker::{derive_tiebreaker, TiebreakerDecision};
use crate::models::{Game, GameId, GameState, LeagueError, Result};
use crate::store::LeagueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Highest score a single game may record.
pub const MAX_SCORE: u32 = 99;

/// A completed game and what completing it meant for the match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub game: Game,
    pub tiebreaker: TiebreakerDecision,
}

/// Partial update of one game. Absent fields are left alone; `null` clears a score or the
/// court number.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMutation {
    pub is_complete: Option<bool>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub team_a_score: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    pub team_b_score: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    pub court_number: Option<Option<String>>,
    /// Version the client last saw; the update is rejected if the game changed since.
    pub expected_version: Option<u64>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub game: Game,
    /// Set when the mutation completed the game.
    pub tiebreaker: Option<TiebreakerDecision>,
}

pub fn start(store: &mut LeagueStore, game_id: GameId, now: DateTime<Utc>) -> Result<Game> {
    let version = store.game(game_id)?.version;
    start_at(store, game_id, version, now)
}

/// Record scores on a game in progress. Either side may be `None`; a tie may be entered.
pub fn update_score(
    store: &mut LeagueStore,
    game_id: GameId,
    team_a_score: Option<u32>,
    team_b_score: Option<u32>,
) -> Result<Game> {
    let version = store.game(game_id)?.version;
    score_at(store, game_id, version, team_a_score, team_b_score)
}

/// Finish a game in progress. Both scores must be set and differ. Completion may append a
/// tiebreaker game to the match.
pub fn complete(
    store: &mut LeagueStore,
    game_id: GameId,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let version = store.game(game_id)?.version;
    complete_at(store, game_id, version, now)
}

pub fn set_court_number(
    store: &mut LeagueStore,
    game_id: GameId,
    court_number: Option<String>,
) -> Result<Game> {
    let version = store.game(game_id)?.version;
    court_at(store, game_id, version, court_number)
}

/// Apply a partial update as a sequence of lifecycle steps: court, start, scores, complete.
/// A supplied `startedAt`/`endedAt` becomes the transition time. Re-sending the timestamp a
/// game already started at is not a second start. If any step fails, none are kept.
pub fn apply_game_mutation(
    store: &mut LeagueStore,
    game_id: GameId,
    mutation: &GameMutation,
    now: DateTime<Utc>,
) -> Result<MutationOutcome> {
    let snapshot = store.game(game_id)?.clone();
    let version = mutation.expected_version.unwrap_or(snapshot.version);
    if version != snapshot.version {
        return Err(LeagueError::ConcurrentModification {
            game_id,
            expected: version,
            actual: snapshot.version,
        });
    }

    match run_mutation(store, &snapshot, mutation, now) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            store.games.insert(game_id, snapshot);
            Err(err)
        }
    }
}

fn run_mutation(
    store: &mut LeagueStore,
    before: &Game,
    mutation: &GameMutation,
    now: DateTime<Utc>,
) -> Result<MutationOutcome> {
    let game_id = before.id;
    let mut version = before.version;

    if let Some(court) = &mutation.court_number {
        version = court_at(store, game_id, version, court.clone())?.version;
    }

    if let Some(started_at) = mutation.started_at {
        if before.started_at() != Some(started_at) {
            version = start_at(store, game_id, version, started_at)?.version;
        }
    }

    if mutation.team_a_score.is_some() || mutation.team_b_score.is_some() {
        let current = store.game(game_id)?;
        let a = mutation.team_a_score.unwrap_or(current.team_a_score);
        let b = mutation.team_b_score.unwrap_or(current.team_b_score);
        version = score_at(store, game_id, version, a, b)?.version;
    }

    let wants_complete = mutation.is_complete == Some(true) || mutation.ended_at.is_some();
    if mutation.is_complete == Some(false) && before.is_complete() {
        return Err(LeagueError::InvalidTransition {
            game_id,
            state: before.state,
            action: "reopen",
        });
    }
    if wants_complete {
        let ended_at = mutation.ended_at.unwrap_or(now);
        let outcome = complete_at(store, game_id, version, ended_at)?;
        return Ok(MutationOutcome {
            game: outcome.game,
            tiebreaker: Some(outcome.tiebreaker),
        });
    }

    Ok(MutationOutcome {
        game: store.game(game_id)?.clone(),
        tiebreaker: None,
    })
}

fn start_at(
    store: &mut LeagueStore,
    game_id: GameId,
    version: u64,
    started_at: DateTime<Utc>,
) -> Result<Game> {
    let game = store.game(game_id)?;
    let m = store.get_match(game.match_id)?;
    if game.has_started() {
        return Err(LeagueError::InvalidTransition {
            game_id,
            state: game.state,
            action: "start",
        });
    }
    if m.is_bye() {
        return Err(LeagueError::ByeMatch { match_id: m.id });
    }
    if !game.slot.is_tiebreaker() && !game.lineup_confirmed() {
        return Err(LeagueError::LineupRequired {
            game_id,
            slot: game.slot,
        });
    }

    let game = store
        .update_game_if(game_id, version, |g| {
            g.state = GameState::InProgress { started_at };
            Ok(())
        })?
        .clone();
    log::info!("Game {} ({}) started", game.id, game.slot);
    Ok(game)
}

fn score_at(
    store: &mut LeagueStore,
    game_id: GameId,
    version: u64,
    team_a_score: Option<u32>,
    team_b_score: Option<u32>,
) -> Result<Game> {
    let too_high = [team_a_score, team_b_score]
        .into_iter()
        .flatten()
        .find(|score| *score > MAX_SCORE);
    if let Some(score) = too_high {
        return Err(LeagueError::InvalidInput(format!(
            "score {score} for game {game_id} is above the maximum of {MAX_SCORE}"
        )));
    }
    let game = store.update_game_if(game_id, version, |g| {
        if !matches!(g.state, GameState::InProgress { .. }) {
            return Err(LeagueError::InvalidTransition {
                game_id,
                state: g.state,
                action: "score",
            });
        }
        g.team_a_score = team_a_score;
        g.team_b_score = team_b_score;
        Ok(())
    })?;
    log::debug!(
        "Game {} score {:?}-{:?}",
        game.id,
        game.team_a_score,
        game.team_b_score
    );
    Ok(game.clone())
}

fn court_at(
    store: &mut LeagueStore,
    game_id: GameId,
    version: u64,
    court_number: Option<String>,
) -> Result<Game> {
    let court_number = court_number
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    store
        .update_game_if(game_id, version, |g| {
            if g.is_complete() {
                return Err(LeagueError::InvalidTransition {
                    game_id,
                    state: g.state,
                    action: "assign a court to",
                });
            }
            g.court_number = court_number;
            Ok(())
        })
        .cloned()
}

fn complete_at(
    store: &mut LeagueStore,
    game_id: GameId,
    version: u64,
    ended_at: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let game = store
        .update_game_if(game_id, version, |g| {
            let GameState::InProgress { started_at } = g.state else {
                return Err(LeagueError::InvalidTransition {
                    game_id,
                    state: g.state,
                    action: "complete",
                });
            };
            let (Some(a), Some(b)) = (g.team_a_score, g.team_b_score) else {
                return Err(LeagueError::IncompleteScore { game_id });
            };
            if a == b {
                return Err(LeagueError::TiedScore { game_id, score: a });
            }
            if ended_at < started_at {
                return Err(LeagueError::InvalidInput(format!(
                    "game {game_id} cannot end before it started"
                )));
            }
            g.state = GameState::Completed {
                started_at,
                ended_at,
            };
            Ok(())
        })?
        .clone();
    log::info!(
        "Game {} ({}) completed {}-{}",
        game.id,
        game.slot,
        game.team_a_score.unwrap_or(0),
        game.team_b_score.unwrap_or(0)
    );

    let tiebreaker = derive_tiebreaker(store, game.match_id)?;
    Ok(CompletionOutcome { game, tiebreaker })
}
