//! Loading the entities managed outside the core (tournaments, brackets, stops, teams,
//! players and initial rosters) into a [`LeagueStore`].

use crate::logic::set_stop_roster;
use crate::models::{
    Bracket, Gender, LeagueError, Player, PlayerId, Stop, StopId, StopTeamPlayer, Team, TeamId,
    Tournament,
};
use crate::store::LeagueStore;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid players CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("players CSV row {row}: {message}")]
    InvalidPlayer { row: usize, message: String },
    #[error(transparent)]
    League(#[from] LeagueError),
}

/// Contents of a seed file. Every list is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueSeed {
    pub tournaments: Vec<Tournament>,
    pub brackets: Vec<Bracket>,
    pub stops: Vec<Stop>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    /// Initial roster rows; saved per (stop, team) with the usual cap checks.
    pub roster: Vec<StopTeamPlayer>,
}

impl LeagueSeed {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        Self::from_reader(open(path)?)
    }

    /// Insert everything into the store, parents before children.
    pub fn load_into(self, store: &mut LeagueStore) -> Result<(), SeedError> {
        for tournament in self.tournaments {
            store.insert_tournament(tournament);
        }
        for bracket in self.brackets {
            store.insert_bracket(bracket)?;
        }
        for stop in self.stops {
            store.insert_stop(stop)?;
        }
        for team in self.teams {
            store.insert_team(team)?;
        }
        for player in self.players {
            store.insert_player(player);
        }

        let mut groups: Vec<((StopId, TeamId), Vec<PlayerId>)> = Vec::new();
        for row in self.roster {
            let key = (row.stop_id, row.team_id);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, ids)) => ids.push(row.player_id),
                None => groups.push((key, vec![row.player_id])),
            }
        }
        for ((stop_id, team_id), ids) in groups {
            set_stop_roster(store, stop_id, team_id, &ids, None)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    name: String,
    gender: String,
    #[serde(default)]
    id: Option<Uuid>,
}

/// Read players from CSV with a `name,gender[,id]` header. Rows without an id get a fresh one.
pub fn read_players_csv<R: Read>(reader: R) -> Result<Vec<Player>, SeedError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut players = Vec::new();
    for (idx, row) in csv.deserialize::<PlayerRow>().enumerate() {
        let row = row?;
        // Header is line 1.
        let line = idx + 2;
        if row.name.is_empty() {
            return Err(SeedError::InvalidPlayer {
                row: line,
                message: "name is empty".into(),
            });
        }
        let gender: Gender = row
            .gender
            .parse()
            .map_err(|message| SeedError::InvalidPlayer { row: line, message })?;
        let mut player = Player::new(row.name, gender);
        if let Some(id) = row.id {
            player.id = id;
        }
        players.push(player);
    }
    Ok(players)
}

pub fn load_players_csv(path: &Path, store: &mut LeagueStore) -> Result<usize, SeedError> {
    let players = read_players_csv(open(path)?)?;
    let count = players.len();
    for player in players {
        store.insert_player(player);
    }
    Ok(count)
}

fn open(path: &Path) -> Result<File, SeedError> {
    File::open(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_players_with_and_without_ids() {
        let data = "name,gender,id\n\
                    Ann Lee, F ,\n\
                    Bob Ray,MALE,6f9619ff-8b86-d011-b42d-00cf4fc964ff\n";
        let players = read_players_csv(data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Ann Lee");
        assert_eq!(players[0].gender, Gender::Female);
        assert_eq!(
            players[1].id.to_string(),
            "6f9619ff-8b86-d011-b42d-00cf4fc964ff"
        );
    }

    #[test]
    fn rejects_unknown_gender_with_row_number() {
        let data = "name,gender\nAnn,F\nCat,X\n";
        let err = read_players_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SeedError::InvalidPlayer { row: 3, .. }));
    }

    #[test]
    fn seed_roster_goes_through_cap_checks() {
        let tournament = Tournament::new(
            "Cup",
            crate::models::TournamentConfig {
                max_team_size: Some(1),
                ..Default::default()
            },
        );
        let bracket = Bracket::new(tournament.id, "Open", 0);
        let stop = Stop::new(tournament.id, "Stop 1");
        let team = Team::new(tournament.id, bracket.id, "Pickle Pros");
        let p1 = Player::new("Ann", Gender::Female);
        let p2 = Player::new("Bob", Gender::Male);
        let roster = [&p1, &p2]
            .iter()
            .map(|p| StopTeamPlayer {
                stop_id: stop.id,
                team_id: team.id,
                player_id: p.id,
            })
            .collect();
        let seed = LeagueSeed {
            tournaments: vec![tournament],
            brackets: vec![bracket],
            stops: vec![stop],
            teams: vec![team],
            players: vec![p1, p2],
            roster,
        };

        let mut store = LeagueStore::new();
        let err = seed.load_into(&mut store).unwrap_err();
        assert!(matches!(
            err,
            SeedError::League(LeagueError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn parses_seed_json() {
        let json = r#"{
            "tournaments": [{"id": "00000000-0000-0000-0000-000000000001", "name": "Cup",
                             "config": {"maxTeamSize": 8}}],
            "brackets": [{"id": "00000000-0000-0000-0000-000000000002",
                          "tournamentId": "00000000-0000-0000-0000-000000000001",
                          "name": "Advanced"}]
        }"#;
        let seed = LeagueSeed::from_reader(json.as_bytes()).unwrap();
        assert_eq!(seed.tournaments[0].config.max_team_size, Some(8));
        assert_eq!(seed.tournaments[0].config.game_slots.len(), 4);
        assert_eq!(seed.brackets[0].idx, 0);

        let mut store = LeagueStore::new();
        seed.load_into(&mut store).unwrap();
        assert_eq!(store.brackets_of(store.tournaments.keys().copied().next().unwrap()).len(), 1);
    }
}
