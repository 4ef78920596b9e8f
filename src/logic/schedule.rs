//! Schedule generation for a stop: a full round robin per bracket, rounds shared across
//! brackets, one game per configured slot in every non-bye match.

use crate::models::{
    BracketId, BracketRound, Game, GameSlot, LeagueError, Match, Result, Round, RoundId, StopId,
    TeamId,
};
use crate::store::LeagueStore;
use serde::{Deserialize, Serialize};

/// One entry of a round-robin round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pairing<T> {
    Match(T, T),
    Bye(T),
}

/// Round robin by the circle method: the first entrant stays fixed and the rest rotate one
/// step each round. With an odd count a phantom entrant is added and whoever meets it sits out.
///
/// `n` even gives `n - 1` rounds of `n / 2` matches; `n` odd gives `n` rounds, each with one bye.
pub fn round_robin<T: Copy>(entrants: &[T]) -> Vec<Vec<Pairing<T>>> {
    let mut circle: Vec<Option<T>> = entrants.iter().copied().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let n = circle.len();
    if n == 0 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let round = (0..n / 2)
            .filter_map(|i| match (circle[i], circle[n - 1 - i]) {
                (Some(a), Some(b)) => Some(Pairing::Match(a, b)),
                (Some(a), None) | (None, Some(a)) => Some(Pairing::Bye(a)),
                (None, None) => None,
            })
            .collect();
        rounds.push(round);
        // Keep index 0 fixed, move the last entrant to index 1.
        circle[1..].rotate_right(1);
    }
    rounds
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Delete any existing schedule for the stop first.
    #[serde(default)]
    pub overwrite: bool,
    /// Game slots per match; falls back to the tournament's configured slots.
    #[serde(default)]
    pub slots: Option<Vec<GameSlot>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedBracket {
    pub bracket_id: BracketId,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummary {
    pub rounds_created: usize,
    /// Includes byes.
    pub matches_created: usize,
    pub byes_created: usize,
    pub games_created: usize,
    pub brackets_skipped: Vec<SkippedBracket>,
}

/// Generate the round-robin schedule for every bracket of the stop's tournament.
///
/// Brackets without teams are skipped and reported, not fatal. Fails with
/// [`LeagueError::AlreadyGenerated`] when a schedule exists and `overwrite` is off; with
/// `overwrite` the existing rounds, matches and games are deleted first.
pub fn generate(
    store: &mut LeagueStore,
    stop_id: StopId,
    options: &GenerateOptions,
) -> Result<GenerateSummary> {
    let stop = store.stop(stop_id)?;
    let tournament = store.tournament(stop.tournament_id)?;
    let slots = resolve_slots(options.slots.as_deref(), &tournament.config.game_slots)?;

    let existing: Vec<RoundId> = store.rounds_of(stop_id).iter().map(|r| r.id).collect();
    if !existing.is_empty() && !options.overwrite {
        return Err(LeagueError::AlreadyGenerated {
            stop_id,
            rounds: existing.len(),
        });
    }

    let mut summary = GenerateSummary::default();
    let mut schedules: Vec<(BracketId, Vec<Vec<Pairing<TeamId>>>)> = Vec::new();
    for bracket in store.brackets_of(tournament.id) {
        let teams: Vec<TeamId> = store
            .teams_in_bracket(bracket.id)
            .iter()
            .map(|t| t.id)
            .collect();
        if teams.is_empty() {
            let err = LeagueError::NoTeamsInBracket {
                bracket_id: bracket.id,
                bracket_name: bracket.name.clone(),
            };
            log::warn!("Skipping bracket at stop {stop_id}: {err}");
            summary.brackets_skipped.push(SkippedBracket {
                bracket_id: bracket.id,
                reason: err.to_string(),
            });
            continue;
        }
        log::debug!(
            "Bracket {} at stop {}: {} teams",
            bracket.name,
            stop_id,
            teams.len()
        );
        schedules.push((bracket.id, round_robin(&teams)));
    }

    if !existing.is_empty() {
        log::warn!(
            "Overwriting schedule for stop {}: deleting {} rounds",
            stop_id,
            existing.len()
        );
        for round_id in existing {
            store.remove_round(round_id);
        }
    }

    let round_count = schedules.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    for idx in 0..round_count {
        let mut round = Round::new(stop_id, idx as u32);
        for (bracket_id, schedule) in &schedules {
            let Some(pairings) = schedule.get(idx) else {
                continue;
            };
            let mut bracket_round = BracketRound {
                bracket_id: *bracket_id,
                matches: Vec::with_capacity(pairings.len()),
            };
            for pairing in pairings {
                let (a, b) = match *pairing {
                    Pairing::Match(a, b) => (a, Some(b)),
                    Pairing::Bye(a) => (a, None),
                };
                let mut m = Match::new(round.id, *bracket_id, Some(a), b);
                if m.is_bye() {
                    summary.byes_created += 1;
                } else {
                    summary.games_created += seed_games(store, &mut m, &slots);
                }
                bracket_round.matches.push(m.id);
                store.matches.insert(m.id, m);
                summary.matches_created += 1;
            }
            round.brackets.push(bracket_round);
        }
        store.rounds.insert(round.id, round);
        summary.rounds_created += 1;
    }

    log::info!(
        "Generated schedule for stop {}: {} rounds, {} matches, {} games ({} brackets skipped)",
        stop_id,
        summary.rounds_created,
        summary.matches_created,
        summary.games_created,
        summary.brackets_skipped.len()
    );
    Ok(summary)
}

/// Create one unstarted game per slot for a match. Returns the number created.
pub(crate) fn seed_games(store: &mut LeagueStore, m: &mut Match, slots: &[GameSlot]) -> usize {
    for slot in slots {
        let game = Game::new(m.id, *slot);
        m.games.push(game.id);
        store.games.insert(game.id, game);
    }
    slots.len()
}

/// Slots for new matches: requested or configured, without the tiebreaker (which is only ever
/// derived), deduplicated, in canonical order.
pub(crate) fn resolve_slots(
    requested: Option<&[GameSlot]>,
    configured: &[GameSlot],
) -> Result<Vec<GameSlot>> {
    let mut slots: Vec<GameSlot> = requested
        .unwrap_or(configured)
        .iter()
        .copied()
        .filter(|s| !s.is_tiebreaker())
        .collect();
    slots.sort();
    slots.dedup();
    if slots.is_empty() {
        return Err(LeagueError::InvalidInput(
            "at least one non-tiebreaker game slot is required".into(),
        ));
    }
    Ok(slots)
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub rounds_removed: usize,
    pub matches_removed: usize,
    pub remaining_rounds: usize,
}

/// Delete a stop's schedule. Without a bracket everything goes; with one, only that bracket's
/// matches are removed, rounds left empty are pruned, and indices are optionally compacted.
pub fn delete_schedule(
    store: &mut LeagueStore,
    stop_id: StopId,
    bracket_id: Option<BracketId>,
    compact: bool,
) -> Result<DeleteSummary> {
    store.stop(stop_id)?;
    let rounds: Vec<RoundId> = store.rounds_of(stop_id).iter().map(|r| r.id).collect();
    let mut summary = DeleteSummary::default();

    match bracket_id {
        None => {
            for round_id in rounds {
                summary.matches_removed += store.round(round_id)?.match_ids().count();
                store.remove_round(round_id);
                summary.rounds_removed += 1;
            }
        }
        Some(bracket_id) => {
            store.bracket(bracket_id)?;
            for round_id in rounds {
                let round = store.round_mut(round_id)?;
                let removed: Vec<_> = round
                    .brackets
                    .iter()
                    .filter(|b| b.bracket_id == bracket_id)
                    .flat_map(|b| b.matches.iter().copied())
                    .collect();
                round.brackets.retain(|b| b.bracket_id != bracket_id);
                let now_empty = round.is_empty();
                summary.matches_removed += removed.len();
                for match_id in removed {
                    store.remove_match(match_id);
                }
                if now_empty {
                    store.remove_round(round_id);
                    summary.rounds_removed += 1;
                }
            }
            if compact {
                compact_rounds(store, stop_id);
            }
        }
    }

    summary.remaining_rounds = store.rounds_of(stop_id).len();
    log::info!(
        "Deleted {} matches and {} rounds at stop {}",
        summary.matches_removed,
        summary.rounds_removed,
        stop_id
    );
    Ok(summary)
}

/// Renumber a stop's rounds 0..n-1 keeping their order.
pub fn compact_rounds(store: &mut LeagueStore, stop_id: StopId) {
    let ordered: Vec<RoundId> = store.rounds_of(stop_id).iter().map(|r| r.id).collect();
    for (idx, round_id) in ordered.into_iter().enumerate() {
        if let Some(round) = store.rounds.get_mut(&round_id) {
            round.idx = idx as u32;
        }
    }
}

/// Move a round to a new position within its stop, shifting the rounds in between.
/// The target index is clamped to the last position. Returns the index applied.
pub fn move_round(store: &mut LeagueStore, round_id: RoundId, target: u32) -> Result<u32> {
    let (stop_id, current) = {
        let round = store.round(round_id)?;
        (round.stop_id, round.idx)
    };
    let last = store.rounds_of(stop_id).len().saturating_sub(1) as u32;
    let target = target.min(last);
    if target == current {
        return Ok(current);
    }

    for round in store.rounds.values_mut().filter(|r| r.stop_id == stop_id) {
        if round.id == round_id {
            round.idx = target;
        } else if target < current && round.idx >= target && round.idx < current {
            round.idx += 1;
        } else if target > current && round.idx > current && round.idx <= target {
            round.idx -= 1;
        }
    }
    log::info!("Moved round {round_id} from {current} to {target}");
    Ok(target)
}

/// Delete one round (with its matches and games) and close the gap in indices.
pub fn delete_round(store: &mut LeagueStore, round_id: RoundId) -> Result<()> {
    let (stop_id, idx) = {
        let round = store.round(round_id)?;
        (round.stop_id, round.idx)
    };
    store.remove_round(round_id);
    for round in store
        .rounds
        .values_mut()
        .filter(|r| r.stop_id == stop_id && r.idx > idx)
    {
        round.idx -= 1;
    }
    log::info!("Deleted round {round_id} at stop {stop_id}");
    Ok(())
}
