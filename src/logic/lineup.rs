//! Lineups: two men and two women per team per match, fanned out to the four base games.

use crate::logic::roster::is_rostered;
use crate::models::{
    EntityKind, Gender, GameSlot, LeagueError, Lineup, LineupViolation, Match, MatchId,
    MatchLineups, PlayerId, Result, StopId, TeamId,
};
use crate::store::LeagueStore;
use std::collections::{HashMap, HashSet};

/// Required gender for each lineup position.
const POSITION_GENDERS: [Gender; 4] = [Gender::Male, Gender::Male, Gender::Female, Gender::Female];

/// The pair from a 4-slot lineup that plays `slot` (e.g. MENS_DOUBLES -> positions 0 and 1).
/// Returns `None` for the tiebreaker.
pub fn pairing<T: Copy>(lineup: &[T; 4], slot: GameSlot) -> Option<[T; 2]> {
    slot.positions().map(|[i, j]| [lineup[i], lineup[j]])
}

/// Set both teams' lineups for a match.
///
/// Each lineup must hold 4 distinct rostered players, MALE at positions 0-1 and FEMALE at 2-3,
/// and no player may appear in both lineups. Replaces any earlier lineup as long as no game of
/// the match has started.
pub fn assign_lineup(
    store: &mut LeagueStore,
    match_id: MatchId,
    team_a: Lineup,
    team_b: Lineup,
) -> Result<MatchLineups> {
    let lineups = MatchLineups { team_a, team_b };
    validate(store, match_id, &lineups)?;
    apply(store, match_id, lineups)?;
    log::info!("Confirmed lineups for match {match_id}");
    Ok(lineups)
}

/// Save lineups for many matches of a stop at once: `{ matchId: { teamId: [4 players] } }`.
/// Either every match is saved or none is. Returns the number of matches saved.
pub fn save_stop_lineups(
    store: &mut LeagueStore,
    stop_id: StopId,
    lineups: &HashMap<MatchId, HashMap<TeamId, Lineup>>,
) -> Result<usize> {
    store.stop(stop_id)?;

    let mut prepared = Vec::with_capacity(lineups.len());
    for (match_id, by_team) in lineups {
        let m = store.get_match(*match_id)?;
        if store.round(m.round_id)?.stop_id != stop_id {
            return Err(LeagueError::not_found(EntityKind::Match, *match_id));
        }
        if m.is_bye() {
            return Err(LeagueError::ByeMatch {
                match_id: *match_id,
            });
        }
        let (a, b) = teams_of(m)?;
        if let Some(extra) = by_team.keys().find(|t| **t != a && **t != b) {
            return Err(LeagueError::InvalidInput(format!(
                "team {extra} does not play in match {match_id}"
            )));
        }
        let team_a = *by_team.get(&a).ok_or(LeagueError::InvalidLineup {
            team_id: a,
            violation: LineupViolation::Missing,
        })?;
        let team_b = *by_team.get(&b).ok_or(LeagueError::InvalidLineup {
            team_id: b,
            violation: LineupViolation::Missing,
        })?;
        let pair = MatchLineups { team_a, team_b };
        validate(store, *match_id, &pair)?;
        prepared.push((*match_id, pair));
    }

    for (match_id, pair) in &prepared {
        apply(store, *match_id, *pair)?;
    }
    log::info!(
        "Saved lineups for {} matches at stop {}",
        prepared.len(),
        stop_id
    );
    Ok(prepared.len())
}

fn teams_of(m: &Match) -> Result<(TeamId, TeamId)> {
    match (m.team_a, m.team_b) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(LeagueError::ByeMatch { match_id: m.id }),
    }
}

fn validate(store: &LeagueStore, match_id: MatchId, lineups: &MatchLineups) -> Result<()> {
    let m = store.get_match(match_id)?;
    let (team_a, team_b) = teams_of(m)?;
    if store.match_started(match_id)? {
        return Err(LeagueError::MatchLocked { match_id });
    }
    let stop_id = store.round(m.round_id)?.stop_id;

    let a_players: HashSet<PlayerId> = lineups.team_a.iter().copied().collect();
    if let Some((position, player)) = lineups
        .team_b
        .iter()
        .enumerate()
        .find(|(_, p)| a_players.contains(p))
    {
        return Err(LeagueError::InvalidLineup {
            team_id: team_b,
            violation: LineupViolation::PlayerInBothLineups {
                position,
                player: *player,
            },
        });
    }

    validate_team(store, stop_id, team_a, &lineups.team_a)?;
    validate_team(store, stop_id, team_b, &lineups.team_b)
}

fn validate_team(
    store: &LeagueStore,
    stop_id: StopId,
    team_id: TeamId,
    lineup: &Lineup,
) -> Result<()> {
    let invalid = |violation| LeagueError::InvalidLineup { team_id, violation };
    let mut seen = HashSet::new();
    for (position, player_id) in lineup.iter().copied().enumerate() {
        if !seen.insert(player_id) {
            return Err(invalid(LineupViolation::DuplicatePlayer {
                position,
                player: player_id,
            }));
        }
        let player = store.player(player_id)?;
        let expected = POSITION_GENDERS[position];
        if player.gender != expected {
            return Err(invalid(LineupViolation::WrongGender {
                position,
                player: player_id,
                expected,
            }));
        }
        if !is_rostered(store, stop_id, team_id, player_id) {
            return Err(invalid(LineupViolation::NotOnRoster {
                position,
                player: player_id,
            }));
        }
    }
    Ok(())
}

fn apply(store: &mut LeagueStore, match_id: MatchId, lineups: MatchLineups) -> Result<()> {
    let game_ids = store.get_match(match_id)?.games.clone();
    for game_id in game_ids {
        let game = store.game(game_id)?;
        let (slot, version) = (game.slot, game.version);
        if slot.is_tiebreaker() {
            continue;
        }
        store.update_game_if(game_id, version, |g| {
            g.team_a_lineup = pairing(&lineups.team_a, slot);
            g.team_b_lineup = pairing(&lineups.team_b, slot);
            Ok(())
        })?;
    }
    store.match_mut(match_id)?.lineups = Some(lineups);
    Ok(())
}
