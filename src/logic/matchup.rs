//! Manual edits of a generated round: swapping teams between match slots of one bracket.
//!
//! Matchups freeze as soon as any game of an involved match starts. Every edit clears the
//! lineups of the matches it touches, since lineups belong to the teams that were there.

use crate::logic::schedule::{resolve_slots, seed_games};
use crate::models::{
    BracketId, EntityKind, LeagueError, MatchId, Result, RoundId, TeamId, TeamPosition,
};
use crate::store::LeagueStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One side of one match in a round, addressed the way a bracket board shows it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSlot {
    pub bracket_id: BracketId,
    pub match_index: usize,
    pub position: TeamPosition,
}

/// Batch form: set both sides of a match. `None` leaves the side empty (a bye).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupUpdate {
    pub match_id: MatchId,
    pub team_a_id: Option<TeamId>,
    pub team_b_id: Option<TeamId>,
}

/// Exchange the teams in two slots of the same round and bracket. Swapping a slot with itself
/// is a no-op.
pub fn swap_teams(
    store: &mut LeagueStore,
    round_id: RoundId,
    a: TeamSlot,
    b: TeamSlot,
) -> Result<()> {
    if a.bracket_id != b.bracket_id {
        return Err(LeagueError::BracketMismatch {
            expected: a.bracket_id,
            found: b.bracket_id,
        });
    }
    let match_a = match_at(store, round_id, a)?;
    let match_b = match_at(store, round_id, b)?;
    if match_a == match_b && a.position == b.position {
        return Ok(());
    }
    for match_id in [match_a, match_b] {
        if store.match_started(match_id)? {
            return Err(LeagueError::MatchInProgress { match_id });
        }
    }

    let team_a = store.get_match(match_a)?.team(a.position);
    let team_b = store.get_match(match_b)?.team(b.position);
    store.match_mut(match_a)?.set_team(a.position, team_b);
    store.match_mut(match_b)?.set_team(b.position, team_a);

    refresh_after_edit(store, match_a)?;
    if match_b != match_a {
        refresh_after_edit(store, match_b)?;
    }
    log::info!(
        "Swapped {:?} ({}) with {:?} ({}) in round {}",
        team_a,
        match_a,
        team_b,
        match_b,
        round_id
    );
    Ok(())
}

/// Apply several matchup edits to one round at once. All updates are validated against the
/// round as it would look afterwards before anything is written. Returns the number of
/// matches updated.
pub fn apply_matchup_updates(
    store: &mut LeagueStore,
    round_id: RoundId,
    updates: &[MatchupUpdate],
) -> Result<usize> {
    let round = store.round(round_id)?;

    let mut planned: HashMap<MatchId, (Option<TeamId>, Option<TeamId>)> = HashMap::new();
    for match_id in round.match_ids() {
        let m = store.get_match(match_id)?;
        planned.insert(match_id, (m.team_a, m.team_b));
    }

    for update in updates {
        let m = store.get_match(update.match_id)?;
        if m.round_id != round_id {
            return Err(LeagueError::not_found(EntityKind::Match, update.match_id));
        }
        if store.match_started(m.id)? {
            return Err(LeagueError::MatchInProgress { match_id: m.id });
        }
        for team_id in [update.team_a_id, update.team_b_id].into_iter().flatten() {
            let team = store.team(team_id)?;
            if team.bracket_id != m.bracket_id {
                return Err(LeagueError::BracketMismatch {
                    expected: m.bracket_id,
                    found: team.bracket_id,
                });
            }
        }
        planned.insert(m.id, (update.team_a_id, update.team_b_id));
    }

    let mut scheduled: HashMap<TeamId, MatchId> = HashMap::new();
    for (match_id, (a, b)) in &planned {
        for team_id in [a, b].into_iter().flatten() {
            if scheduled.insert(*team_id, *match_id).is_some() {
                return Err(LeagueError::DuplicateTeam {
                    team_id: *team_id,
                    round_id,
                });
            }
        }
    }

    for update in updates {
        let m = store.match_mut(update.match_id)?;
        m.team_a = update.team_a_id;
        m.team_b = update.team_b_id;
        refresh_after_edit(store, update.match_id)?;
    }
    log::info!(
        "Applied {} matchup updates to round {}",
        updates.len(),
        round_id
    );
    Ok(updates.len())
}

/// Leave matchup editing for a round. Swaps are saved as they happen, so this only checks
/// the round exists and records the event.
pub fn confirm_matchups(store: &LeagueStore, round_id: RoundId) -> Result<()> {
    let round = store.round(round_id)?;
    log::info!(
        "Matchups confirmed for round {} (index {}) at stop {}",
        round.id,
        round.idx,
        round.stop_id
    );
    Ok(())
}

fn match_at(store: &LeagueStore, round_id: RoundId, slot: TeamSlot) -> Result<MatchId> {
    let round = store.round(round_id)?;
    let bracket = round
        .bracket(slot.bracket_id)
        .ok_or_else(|| LeagueError::not_found(EntityKind::Bracket, slot.bracket_id))?;
    bracket.matches.get(slot.match_index).copied().ok_or_else(|| {
        LeagueError::InvalidInput(format!(
            "round {} has no match {} in bracket {}",
            round_id, slot.match_index, slot.bracket_id
        ))
    })
}

/// Bring a match's games in line with its teams after an edit: lineups and any recorded
/// decision are cleared, a match that became a bye loses its (unstarted) games, and a bye that
/// became a real match gets fresh games for the tournament's slots.
fn refresh_after_edit(store: &mut LeagueStore, match_id: MatchId) -> Result<()> {
    let m = store.match_mut(match_id)?;
    // Decisions are stored by side, so they no longer name the right team.
    if let Some(position) = m.forfeit.take() {
        log::info!("Cleared forfeit by team {position} on edited match {match_id}");
    }
    m.points_winner = None;
    let (is_bye, game_ids, round_id) = (m.is_bye(), m.games.clone(), m.round_id);

    if is_bye {
        for game_id in &game_ids {
            store.games.remove(game_id);
        }
        let m = store.match_mut(match_id)?;
        m.games.clear();
        m.lineups = None;
        return Ok(());
    }

    if game_ids.is_empty() {
        let stop_id = store.round(round_id)?.stop_id;
        let tournament_id = store.stop(stop_id)?.tournament_id;
        let slots = resolve_slots(None, &store.tournament(tournament_id)?.config.game_slots)?;
        let mut m = store.get_match(match_id)?.clone();
        m.lineups = None;
        let created = seed_games(store, &mut m, &slots);
        log::debug!("Seeded {created} games for match {match_id} after it stopped being a bye");
        store.matches.insert(match_id, m);
        return Ok(());
    }

    for game_id in game_ids {
        let version = store.game(game_id)?.version;
        store.update_game_if(game_id, version, |g| {
            g.team_a_lineup = None;
            g.team_b_lineup = None;
            Ok(())
        })?;
    }
    store.match_mut(match_id)?.lineups = None;
    Ok(())
}
