//! In-memory tables for everything the engines read and write.
//!
//! Every mutating operation in [`crate::logic`] takes `&mut LeagueStore` for its whole duration,
//! so one call is one transaction. Operations validate first and write last; a failed call
//! leaves the tables untouched. Games additionally carry a lock version so that writes issued
//! from stale reads (another request, another instance) are rejected instead of applied.

use crate::models::{
    Bracket, BracketId, EntityKind, Game, GameId, LeagueError, Match, MatchId, Player, PlayerId,
    Result, Round, RoundId, Stop, StopId, StopTeamPlayer, Team, TeamId, Tournament, TournamentId,
};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct LeagueStore {
    pub(crate) tournaments: HashMap<TournamentId, Tournament>,
    pub(crate) brackets: HashMap<BracketId, Bracket>,
    pub(crate) stops: HashMap<StopId, Stop>,
    pub(crate) teams: HashMap<TeamId, Team>,
    pub(crate) players: HashMap<PlayerId, Player>,
    /// Roster rows in insertion order (roster order is significant for display).
    pub(crate) roster: Vec<StopTeamPlayer>,
    pub(crate) rounds: HashMap<RoundId, Round>,
    pub(crate) matches: HashMap<MatchId, Match>,
    pub(crate) games: HashMap<GameId, Game>,
}

impl LeagueStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Registration of entities managed outside the core (tournament/club/player CRUD).

    pub fn insert_tournament(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn insert_bracket(&mut self, bracket: Bracket) -> Result<BracketId> {
        self.tournament(bracket.tournament_id)?;
        let id = bracket.id;
        self.brackets.insert(id, bracket);
        Ok(id)
    }

    pub fn insert_stop(&mut self, stop: Stop) -> Result<StopId> {
        self.tournament(stop.tournament_id)?;
        let id = stop.id;
        self.stops.insert(id, stop);
        Ok(id)
    }

    pub fn insert_team(&mut self, team: Team) -> Result<TeamId> {
        let bracket = self.bracket(team.bracket_id)?;
        if bracket.tournament_id != team.tournament_id {
            return Err(LeagueError::TournamentMismatch {
                kind: EntityKind::Bracket,
                id: bracket.id,
            });
        }
        let id = team.id;
        self.teams.insert(id, team);
        Ok(id)
    }

    pub fn insert_player(&mut self, player: Player) -> PlayerId {
        let id = player.id;
        self.players.insert(id, player);
        id
    }

    // Lookups.

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament> {
        self.tournaments
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Tournament, id))
    }

    pub fn bracket(&self, id: BracketId) -> Result<&Bracket> {
        self.brackets
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Bracket, id))
    }

    pub fn stop(&self, id: StopId) -> Result<&Stop> {
        self.stops
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Stop, id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Team, id))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Player, id))
    }

    pub fn round(&self, id: RoundId) -> Result<&Round> {
        self.rounds
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Round, id))
    }

    pub fn get_match(&self, id: MatchId) -> Result<&Match> {
        self.matches
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Match, id))
    }

    pub fn game(&self, id: GameId) -> Result<&Game> {
        self.games
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Game, id))
    }

    pub(crate) fn round_mut(&mut self, id: RoundId) -> Result<&mut Round> {
        self.rounds
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Round, id))
    }

    pub(crate) fn match_mut(&mut self, id: MatchId) -> Result<&mut Match> {
        self.matches
            .get_mut(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Match, id))
    }

    /// Brackets of a tournament in display order.
    pub fn brackets_of(&self, tournament_id: TournamentId) -> Vec<&Bracket> {
        let mut brackets: Vec<_> = self
            .brackets
            .values()
            .filter(|b| b.tournament_id == tournament_id)
            .collect();
        brackets.sort_by(|a, b| a.idx.cmp(&b.idx).then_with(|| a.name.cmp(&b.name)));
        brackets
    }

    /// Teams entered in a bracket, ordered by name so schedules are reproducible.
    pub fn teams_in_bracket(&self, bracket_id: BracketId) -> Vec<&Team> {
        let mut teams: Vec<_> = self
            .teams
            .values()
            .filter(|t| t.bracket_id == bracket_id)
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        teams
    }

    /// Rounds of a stop ordered by index.
    pub fn rounds_of(&self, stop_id: StopId) -> Vec<&Round> {
        let mut rounds: Vec<_> = self
            .rounds
            .values()
            .filter(|r| r.stop_id == stop_id)
            .collect();
        rounds.sort_by_key(|r| r.idx);
        rounds
    }

    /// Games of a match in the match's slot order.
    pub fn games_of(&self, match_id: MatchId) -> Result<Vec<&Game>> {
        let m = self.get_match(match_id)?;
        m.games.iter().map(|id| self.game(*id)).collect()
    }

    /// Whether any game of the match has left NOT_STARTED.
    pub fn match_started(&self, match_id: MatchId) -> Result<bool> {
        Ok(self.games_of(match_id)?.iter().any(|g| g.has_started()))
    }

    /// Conditional write of one game row: applies `f` only if the stored version still equals
    /// `expected_version`, then bumps the version. `f` may reject the write; nothing is
    /// changed in that case.
    pub(crate) fn update_game_if<F>(
        &mut self,
        game_id: GameId,
        expected_version: u64,
        f: F,
    ) -> Result<&Game>
    where
        F: FnOnce(&mut Game) -> Result<()>,
    {
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Game, game_id))?;
        if game.version != expected_version {
            return Err(LeagueError::ConcurrentModification {
                game_id,
                expected: expected_version,
                actual: game.version,
            });
        }
        let mut next = game.clone();
        f(&mut next)?;
        next.version = expected_version + 1;
        *game = next;
        Ok(game)
    }

    /// Removes a match and all its games.
    pub(crate) fn remove_match(&mut self, match_id: MatchId) {
        if let Some(m) = self.matches.remove(&match_id) {
            for game_id in m.games {
                self.games.remove(&game_id);
            }
        }
    }

    /// Removes a round with everything under it.
    pub(crate) fn remove_round(&mut self, round_id: RoundId) {
        if let Some(round) = self.rounds.remove(&round_id) {
            for match_id in round.match_ids() {
                self.remove_match(match_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameSlot, TournamentConfig};
    use uuid::Uuid;

    #[test]
    fn conditional_update_rejects_stale_version() {
        let mut store = LeagueStore::new();
        let game = Game::new(Uuid::new_v4(), GameSlot::MensDoubles);
        let id = game.id;
        store.games.insert(id, game);

        store
            .update_game_if(id, 0, |g| {
                g.court_number = Some("3".into());
                Ok(())
            })
            .unwrap();
        let err = store.update_game_if(id, 0, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            LeagueError::ConcurrentModification { expected: 0, actual: 1, .. }
        ));
        assert_eq!(store.game(id).unwrap().version, 1);
    }

    #[test]
    fn rejected_write_leaves_row_untouched() {
        let mut store = LeagueStore::new();
        let game = Game::new(Uuid::new_v4(), GameSlot::MensDoubles);
        let id = game.id;
        store.games.insert(id, game);

        let result = store.update_game_if(id, 0, |g| {
            g.team_a_score = Some(4);
            Err(LeagueError::InvalidInput("nope".into()))
        });
        assert!(result.is_err());
        let g = store.game(id).unwrap();
        assert_eq!(g.team_a_score, None);
        assert_eq!(g.version, 0);
    }

    #[test]
    fn team_must_share_tournament_with_bracket() {
        let mut store = LeagueStore::new();
        let t1 = store.insert_tournament(Tournament::new("One", TournamentConfig::default()));
        let t2 = store.insert_tournament(Tournament::new("Two", TournamentConfig::default()));
        let bracket = store.insert_bracket(Bracket::new(t1, "Advanced", 0)).unwrap();
        let err = store.insert_team(Team::new(t2, bracket, "Stray")).unwrap_err();
        assert!(matches!(err, LeagueError::TournamentMismatch { .. }));
    }
}
