//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::Utc;
use pickleball_tournament_web::logic::{self, GenerateOptions};
use pickleball_tournament_web::{
    Bracket, BracketId, GameId, GameSlot, Gender, LeagueStore, Lineup, MatchId, Player, PlayerId,
    Stop, StopId, Team, TeamId, Tournament, TournamentConfig, TournamentId,
};

/// One tournament with two stops, built up step by step.
pub struct League {
    pub store: LeagueStore,
    pub tournament: TournamentId,
    pub stop_a: StopId,
    pub stop_b: StopId,
}

impl League {
    pub fn new(max_team_size: Option<u32>) -> Self {
        let mut store = LeagueStore::new();
        let tournament = store.insert_tournament(Tournament::new(
            "Summer Series",
            TournamentConfig {
                max_team_size,
                ..TournamentConfig::default()
            },
        ));
        let stop_a = store
            .insert_stop(Stop::new(tournament, "Stop A"))
            .unwrap();
        let stop_b = store
            .insert_stop(Stop::new(tournament, "Stop B"))
            .unwrap();
        Self {
            store,
            tournament,
            stop_a,
            stop_b,
        }
    }

    pub fn bracket(&mut self, name: &str) -> BracketId {
        let idx = self.store.brackets_of(self.tournament).len() as u32;
        self.store
            .insert_bracket(Bracket::new(self.tournament, name, idx))
            .unwrap()
    }

    pub fn team(&mut self, bracket: BracketId, name: &str) -> TeamId {
        self.store
            .insert_team(Team::new(self.tournament, bracket, name))
            .unwrap()
    }

    pub fn players(&mut self, prefix: &str, gender: Gender, n: usize) -> Vec<PlayerId> {
        (0..n)
            .map(|i| {
                self.store
                    .insert_player(Player::new(format!("{prefix} {i}"), gender))
            })
            .collect()
    }

    /// Two men and two women rostered for `team` at `stop`, in lineup order.
    pub fn lineup_for(&mut self, team: TeamId, stop: StopId, prefix: &str) -> Lineup {
        let men = self.players(&format!("{prefix} M"), Gender::Male, 2);
        let women = self.players(&format!("{prefix} F"), Gender::Female, 2);
        let lineup = [men[0], men[1], women[0], women[1]];
        logic::set_stop_roster(&mut self.store, stop, team, &lineup, None).unwrap();
        lineup
    }

    pub fn generate(&mut self, stop: StopId) {
        logic::generate(&mut self.store, stop, &GenerateOptions::default()).unwrap();
    }

    /// Match ids of a stop, round by round, bracket by bracket.
    pub fn match_ids(&self, stop: StopId) -> Vec<MatchId> {
        self.store
            .rounds_of(stop)
            .iter()
            .flat_map(|r| r.match_ids().collect::<Vec<_>>())
            .collect()
    }

    pub fn game_ids(&self, match_id: MatchId) -> Vec<GameId> {
        self.store.get_match(match_id).unwrap().games.clone()
    }

    pub fn game_in_slot(&self, match_id: MatchId, slot: GameSlot) -> GameId {
        self.store
            .games_of(match_id)
            .unwrap()
            .into_iter()
            .find(|g| g.slot == slot)
            .map(|g| g.id)
            .unwrap()
    }
}

/// A bracket with two rostered teams playing one match at stop A, lineups confirmed.
pub struct ReadyMatch {
    pub league: League,
    pub bracket: BracketId,
    pub home: TeamId,
    pub away: TeamId,
    pub match_id: MatchId,
}

impl ReadyMatch {
    pub fn new() -> Self {
        let mut league = League::new(None);
        let bracket = league.bracket("Advanced");
        let home = league.team(bracket, "Dink Dynasty");
        let away = league.team(bracket, "Kitchen Crew");
        let home_lineup = league.lineup_for(home, league.stop_a, "Home");
        let away_lineup = league.lineup_for(away, league.stop_a, "Away");
        league.generate(league.stop_a);
        let match_id = league.match_ids(league.stop_a)[0];

        let m = league.store.get_match(match_id).unwrap();
        let (a, b) = if m.team_a == Some(home) {
            (home_lineup, away_lineup)
        } else {
            (away_lineup, home_lineup)
        };
        logic::assign_lineup(&mut league.store, match_id, a, b).unwrap();

        Self {
            league,
            bracket,
            home,
            away,
            match_id,
        }
    }

    pub fn game(&self, slot: GameSlot) -> GameId {
        self.league.game_in_slot(self.match_id, slot)
    }

    /// Start, score and complete one game.
    pub fn play(&mut self, slot: GameSlot, a: u32, b: u32) -> logic::CompletionOutcome {
        let game = self.game(slot);
        let store = &mut self.league.store;
        logic::start(store, game, Utc::now()).unwrap();
        logic::update_score(store, game, Some(a), Some(b)).unwrap();
        logic::complete(store, game, Utc::now()).unwrap()
    }
}
