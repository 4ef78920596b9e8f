//! Integration tests for lineup assignment.

mod common;

use chrono::Utc;
use common::{League, ReadyMatch};
use pickleball_tournament_web::logic::{self, assign_lineup, pairing, save_stop_lineups};
use pickleball_tournament_web::models::LineupViolation;
use pickleball_tournament_web::{GameSlot, Gender, LeagueError, Lineup, MatchId, TeamId};
use std::collections::HashMap;

struct Setup {
    league: League,
    match_id: MatchId,
    team_a: TeamId,
    team_b: TeamId,
    lineup_a: Lineup,
    lineup_b: Lineup,
}

fn setup() -> Setup {
    let mut league = League::new(None);
    let bracket = league.bracket("Advanced");
    let first = league.team(bracket, "Dink Dynasty");
    let second = league.team(bracket, "Kitchen Crew");
    let first_lineup = league.lineup_for(first, league.stop_a, "First");
    let second_lineup = league.lineup_for(second, league.stop_a, "Second");
    league.generate(league.stop_a);
    let match_id = league.match_ids(league.stop_a)[0];
    let m = league.store.get_match(match_id).unwrap();
    let (team_a, team_b) = (m.team_a.unwrap(), m.team_b.unwrap());
    let (lineup_a, lineup_b) = if team_a == first {
        (first_lineup, second_lineup)
    } else {
        (second_lineup, first_lineup)
    };
    Setup {
        league,
        match_id,
        team_a,
        team_b,
        lineup_a,
        lineup_b,
    }
}

#[test]
fn valid_lineup_fans_out_to_base_games() {
    let mut s = setup();
    assign_lineup(&mut s.league.store, s.match_id, s.lineup_a, s.lineup_b).unwrap();

    for game in s.league.store.games_of(s.match_id).unwrap() {
        assert_eq!(game.team_a_lineup, pairing(&s.lineup_a, game.slot));
        assert_eq!(game.team_b_lineup, pairing(&s.lineup_b, game.slot));
        assert!(game.lineup_confirmed());
    }
    let m = s.league.store.get_match(s.match_id).unwrap();
    assert_eq!(m.lineups.unwrap().team_a, s.lineup_a);
}

#[test]
fn wrong_gender_names_the_position() {
    let mut s = setup();
    let mut bad = s.lineup_a;
    bad.swap(1, 2);
    let err = assign_lineup(&mut s.league.store, s.match_id, bad, s.lineup_b).unwrap_err();
    match err {
        LeagueError::InvalidLineup {
            team_id,
            violation: LineupViolation::WrongGender {
                position, expected, ..
            },
        } => {
            assert_eq!(team_id, s.team_a);
            assert_eq!(position, 1);
            assert_eq!(expected, Gender::Male);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_player_within_a_lineup_is_rejected() {
    let mut s = setup();
    let mut bad = s.lineup_b;
    bad[3] = bad[2];
    let err = assign_lineup(&mut s.league.store, s.match_id, s.lineup_a, bad).unwrap_err();
    assert!(matches!(
        err,
        LeagueError::InvalidLineup {
            violation: LineupViolation::DuplicatePlayer { position: 3, .. },
            ..
        }
    ));
}

#[test]
fn player_in_both_lineups_is_rejected() {
    let mut s = setup();
    let mut bad = s.lineup_b;
    bad[0] = s.lineup_a[0];
    let err = assign_lineup(&mut s.league.store, s.match_id, s.lineup_a, bad).unwrap_err();
    assert!(matches!(
        err,
        LeagueError::InvalidLineup {
            violation: LineupViolation::PlayerInBothLineups { position: 0, .. },
            ..
        }
    ));
}

#[test]
fn unrostered_player_is_rejected() {
    let mut s = setup();
    let outsider = s.league.players("Outsider", Gender::Female, 1)[0];
    let mut bad = s.lineup_a;
    bad[2] = outsider;
    let err = assign_lineup(&mut s.league.store, s.match_id, bad, s.lineup_b).unwrap_err();
    assert!(matches!(
        err,
        LeagueError::InvalidLineup {
            violation: LineupViolation::NotOnRoster { position: 2, .. },
            ..
        }
    ));
    // Nothing was written.
    assert!(s.league.store.get_match(s.match_id).unwrap().lineups.is_none());
}

#[test]
fn reassignment_allowed_until_a_game_starts() {
    let mut ready = ReadyMatch::new();
    let m = ready.league.store.get_match(ready.match_id).unwrap();
    let lineups = m.lineups.unwrap();

    let mut swapped = lineups.team_a;
    swapped.swap(0, 1);
    assign_lineup(
        &mut ready.league.store,
        ready.match_id,
        swapped,
        lineups.team_b,
    )
    .unwrap();

    let game = ready.game(GameSlot::MensDoubles);
    logic::start(&mut ready.league.store, game, Utc::now()).unwrap();
    let err = assign_lineup(
        &mut ready.league.store,
        ready.match_id,
        lineups.team_a,
        lineups.team_b,
    )
    .unwrap_err();
    assert!(matches!(err, LeagueError::MatchLocked { .. }));
}

#[test]
fn batch_save_is_all_or_nothing() {
    let mut s = setup();
    let mut by_team = HashMap::new();
    by_team.insert(s.team_a, s.lineup_a);
    by_team.insert(s.team_b, s.lineup_b);
    let mut good = HashMap::new();
    good.insert(s.match_id, by_team.clone());
    assert_eq!(
        save_stop_lineups(&mut s.league.store, s.league.stop_a, &good).unwrap(),
        1
    );

    // Missing team B: rejected, earlier lineups stay as they were.
    let mut partial = HashMap::new();
    let mut only_a = HashMap::new();
    let mut changed = s.lineup_a;
    changed.swap(2, 3);
    only_a.insert(s.team_a, changed);
    partial.insert(s.match_id, only_a);
    let err = save_stop_lineups(&mut s.league.store, s.league.stop_a, &partial).unwrap_err();
    assert!(matches!(
        err,
        LeagueError::InvalidLineup {
            violation: LineupViolation::Missing,
            ..
        }
    ));
    let m = s.league.store.get_match(s.match_id).unwrap();
    assert_eq!(m.lineups.unwrap().team_a, s.lineup_a);
}

#[test]
fn batch_save_rejects_match_from_another_stop() {
    let mut s = setup();
    let mut by_team = HashMap::new();
    by_team.insert(s.team_a, s.lineup_a);
    by_team.insert(s.team_b, s.lineup_b);
    let mut lineups = HashMap::new();
    lineups.insert(s.match_id, by_team);
    let err = save_stop_lineups(&mut s.league.store, s.league.stop_b, &lineups).unwrap_err();
    assert!(matches!(err, LeagueError::NotFound { .. }));
}
