//! Stop rosters: who may play for a team at a stop, under the bracket's player cap.
//!
//! A team's roster is stop-scoped but its cap is enforced twice: on the roster for one stop
//! alone, and on the union of distinct players across all of the team's stop rosters.

use crate::models::{
    CapScope, EntityKind, LeagueError, Player, PlayerId, Result, StopId, StopTeamPlayer, TeamId,
};
use crate::store::LeagueStore;
use serde::Serialize;
use std::collections::HashSet;

/// Roster for one (stop, team) plus the figures needed to display the caps.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub items: Vec<Player>,
    pub count: usize,
    /// Distinct players across all of the team's stop rosters.
    pub unique_across_stops: usize,
    pub cap: Option<u32>,
}

/// Effective roster cap for a team's bracket (`None` = unlimited).
pub fn roster_cap(store: &LeagueStore, team_id: TeamId) -> Result<Option<u32>> {
    let team = store.team(team_id)?;
    let bracket = store.bracket(team.bracket_id)?;
    let tournament = store.tournament(team.tournament_id)?;
    Ok(bracket.roster_cap(&tournament.config))
}

/// Players on the team's roster for the stop, in the order they were added.
pub fn stop_roster(store: &LeagueStore, stop_id: StopId, team_id: TeamId) -> Result<Vec<Player>> {
    check_same_tournament(store, stop_id, team_id)?;
    roster_ids(store, stop_id, team_id)
        .into_iter()
        .map(|id| store.player(id).cloned())
        .collect()
}

/// The stop roster together with the team's cross-stop count and cap.
pub fn roster_summary(store: &LeagueStore, stop_id: StopId, team_id: TeamId) -> Result<RosterSummary> {
    let items = stop_roster(store, stop_id, team_id)?;
    Ok(RosterSummary {
        count: items.len(),
        items,
        unique_across_stops: bracket_unique_count(store, team_id)?,
        cap: roster_cap(store, team_id)?,
    })
}

/// Count of distinct players ever assigned to this team across all stops.
pub fn bracket_unique_count(store: &LeagueStore, team_id: TeamId) -> Result<usize> {
    store.team(team_id)?;
    Ok(store
        .roster
        .iter()
        .filter(|r| r.team_id == team_id)
        .map(|r| r.player_id)
        .collect::<HashSet<_>>()
        .len())
}

/// Replace the team's roster at this stop.
///
/// Duplicate ids are dropped (first occurrence wins). Fails when the list exceeds the caller's
/// `client_limit`, the bracket cap for this stop, or the bracket cap over the union of all of
/// the team's stops; and when any player is already rostered for another team of the same
/// tournament. Lineups already confirmed at other stops are left alone.
pub fn set_stop_roster(
    store: &mut LeagueStore,
    stop_id: StopId,
    team_id: TeamId,
    player_ids: &[PlayerId],
    client_limit: Option<u32>,
) -> Result<RosterSummary> {
    check_same_tournament(store, stop_id, team_id)?;
    let tournament_id = store.team(team_id)?.tournament_id;

    let mut seen = HashSet::new();
    let player_ids: Vec<PlayerId> = player_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if let Some(limit) = client_limit.filter(|l| *l > 0) {
        if player_ids.len() > limit as usize {
            return Err(LeagueError::CapacityExceeded {
                scope: CapScope::Client,
                count: player_ids.len(),
                cap: limit,
            });
        }
    }

    for id in &player_ids {
        store.player(*id)?;
    }

    let cap = roster_cap(store, team_id)?;
    if let Some(cap) = cap {
        if player_ids.len() > cap as usize {
            return Err(LeagueError::CapacityExceeded {
                scope: CapScope::Stop,
                count: player_ids.len(),
                cap,
            });
        }
    }

    let mut conflicts: Vec<PlayerId> = Vec::new();
    for row in &store.roster {
        if row.team_id == team_id || !seen.contains(&row.player_id) {
            continue;
        }
        let other_tournament = store.team(row.team_id)?.tournament_id;
        if other_tournament == tournament_id && !conflicts.contains(&row.player_id) {
            conflicts.push(row.player_id);
        }
    }
    if !conflicts.is_empty() {
        return Err(LeagueError::CrossBracketConflict {
            player_ids: conflicts,
        });
    }

    // The current stop's rows are about to be replaced, so only other stops count.
    let mut union: HashSet<PlayerId> = store
        .roster
        .iter()
        .filter(|r| r.team_id == team_id && r.stop_id != stop_id)
        .map(|r| r.player_id)
        .collect();
    union.extend(player_ids.iter().copied());
    if let Some(cap) = cap {
        if union.len() > cap as usize {
            return Err(LeagueError::CapacityExceeded {
                scope: CapScope::Bracket,
                count: union.len(),
                cap,
            });
        }
    }

    store
        .roster
        .retain(|r| !(r.stop_id == stop_id && r.team_id == team_id));
    store
        .roster
        .extend(player_ids.iter().map(|&player_id| StopTeamPlayer {
            stop_id,
            team_id,
            player_id,
        }));

    log::info!(
        "Saved roster for team {} at stop {}: {} players ({} unique across stops)",
        team_id,
        stop_id,
        player_ids.len(),
        union.len()
    );

    let items = player_ids
        .iter()
        .map(|id| store.player(*id).cloned())
        .collect::<Result<Vec<_>>>()?;
    Ok(RosterSummary {
        count: items.len(),
        items,
        unique_across_stops: union.len(),
        cap,
    })
}

/// Copy the roster from one stop to another verbatim, subject to the same checks as
/// [`set_stop_roster`] at the destination.
pub fn copy_from_previous_stop(
    store: &mut LeagueStore,
    team_id: TeamId,
    from_stop_id: StopId,
    to_stop_id: StopId,
) -> Result<RosterSummary> {
    check_same_tournament(store, from_stop_id, team_id)?;
    let ids = roster_ids(store, from_stop_id, team_id);
    log::debug!(
        "Copying {} players for team {} from stop {} to stop {}",
        ids.len(),
        team_id,
        from_stop_id,
        to_stop_id
    );
    set_stop_roster(store, to_stop_id, team_id, &ids, None)
}

/// Remove one player from the team's roster at this stop. Removing an absent player is a no-op.
pub fn remove_player_from_stop_roster(
    store: &mut LeagueStore,
    stop_id: StopId,
    team_id: TeamId,
    player_id: PlayerId,
) -> Result<()> {
    check_same_tournament(store, stop_id, team_id)?;
    let before = store.roster.len();
    store.roster.retain(|r| {
        !(r.stop_id == stop_id && r.team_id == team_id && r.player_id == player_id)
    });
    if store.roster.len() < before {
        log::info!("Removed player {player_id} from team {team_id} at stop {stop_id}");
    }
    Ok(())
}

/// Whether the player is on the team's roster at the stop.
pub(crate) fn is_rostered(
    store: &LeagueStore,
    stop_id: StopId,
    team_id: TeamId,
    player_id: PlayerId,
) -> bool {
    store
        .roster
        .iter()
        .any(|r| r.stop_id == stop_id && r.team_id == team_id && r.player_id == player_id)
}

fn roster_ids(store: &LeagueStore, stop_id: StopId, team_id: TeamId) -> Vec<PlayerId> {
    store
        .roster
        .iter()
        .filter(|r| r.stop_id == stop_id && r.team_id == team_id)
        .map(|r| r.player_id)
        .collect()
}

fn check_same_tournament(store: &LeagueStore, stop_id: StopId, team_id: TeamId) -> Result<()> {
    let stop = store.stop(stop_id)?;
    let team = store.team(team_id)?;
    if stop.tournament_id != team.tournament_id {
        return Err(LeagueError::TournamentMismatch {
            kind: EntityKind::Stop,
            id: stop_id,
        });
    }
    Ok(())
}
