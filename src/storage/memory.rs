use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{StorageError, TournamentStore};
use crate::models::{
    Event, EventId, Game, GameId, NewEvent, NewGame, NewPlayer, NewTeam, Player, PlayerId,
    PlayerStat, RecordedGoal, Side, StatId, StatKind, Team, TeamId,
};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    teams: Vec<Team>,
    players: Vec<Player>,
    games: Vec<Game>,
    stats: Vec<PlayerStat>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory implementation of [`TournamentStore`] for development and
/// testing. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for InMemoryStore {
    async fn create_event(&self, event: &NewEvent) -> Result<Event, StorageError> {
        let mut tables = self.tables.write().await;
        let event = Event {
            id: EventId::new(tables.next_id()),
            name: event.name.clone(),
            date: event.date,
            event_url: event.event_url.to_string(),
            created_at: Utc::now(),
        };
        tables.events.push(event.clone());
        debug!(event_id = %event.id, "Created event in memory");
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StorageError> {
        let tables = self.tables.read().await;
        let mut events = tables.events.clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn create_team(&self, team: &NewTeam) -> Result<Team, StorageError> {
        let mut tables = self.tables.write().await;
        if tables
            .teams
            .iter()
            .any(|t| t.event_id == team.event_id && t.name == team.name)
        {
            warn!(event_id = %team.event_id, name = %team.name, "Team already exists in memory");
            return Err(StorageError::Conflict(format!(
                "Team {} already exists in event {}",
                team.name, team.event_id
            )));
        }
        let team = Team {
            id: TeamId::new(tables.next_id()),
            name: team.name.clone(),
            event_id: team.event_id,
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn teams_for_event(&self, event_id: EventId) -> Result<Vec<Team>, StorageError> {
        let tables = self.tables.read().await;
        let mut teams: Vec<Team> = tables
            .teams
            .iter()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(teams)
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.teams.iter().position(|t| t.id == id) else {
            return Err(StorageError::NotFound {
                entity: "Team",
                id: id.get(),
            });
        };

        if tables
            .games
            .iter()
            .any(|g| g.home_team_id == id || g.away_team_id == id)
        {
            warn!(team_id = %id, "Refusing to delete team with games");
            return Err(StorageError::Conflict(format!("Team {} still has games", id)));
        }
        let roster: Vec<PlayerId> = tables
            .players
            .iter()
            .filter(|p| p.team_id == id)
            .map(|p| p.id)
            .collect();
        if tables
            .stats
            .iter()
            .any(|s| s.team_id == id || roster.contains(&s.player_id))
        {
            warn!(team_id = %id, "Refusing to delete team with statistics");
            return Err(StorageError::Conflict(format!(
                "Team {} has recorded statistics",
                id
            )));
        }

        tables.players.retain(|p| p.team_id != id);
        tables.teams.remove(index);
        debug!(team_id = %id, players = roster.len(), "Deleted team from memory");
        Ok(())
    }

    async fn create_player(&self, player: &NewPlayer) -> Result<Player, StorageError> {
        let mut tables = self.tables.write().await;
        if tables
            .players
            .iter()
            .any(|p| p.team_id == player.team_id && p.name == player.name)
        {
            warn!(team_id = %player.team_id, name = %player.name, "Player already exists in memory");
            return Err(StorageError::Conflict(format!(
                "Player {} already exists in team {}",
                player.name, player.team_id
            )));
        }
        let player = Player {
            id: PlayerId::new(tables.next_id()),
            name: player.name.clone(),
            team_id: player.team_id,
        };
        tables.players.push(player.clone());
        Ok(player)
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.players.iter().find(|p| p.id == id).cloned())
    }

    async fn players_for_team(&self, team_id: TeamId) -> Result<Vec<Player>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .iter()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn delete_player(&self, id: PlayerId) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.players.iter().position(|p| p.id == id) else {
            return Err(StorageError::NotFound {
                entity: "Player",
                id: id.get(),
            });
        };
        if tables.stats.iter().any(|s| s.player_id == id) {
            warn!(player_id = %id, "Refusing to delete player with statistics");
            return Err(StorageError::Conflict(format!(
                "Player {} has recorded statistics",
                id
            )));
        }
        tables.players.remove(index);
        Ok(())
    }

    async fn players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create_game(&self, game: &NewGame) -> Result<Game, StorageError> {
        let mut tables = self.tables.write().await;
        let game = Game {
            id: GameId::new(tables.next_id()),
            event_id: game.event_id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            home_goals: game.home_goals,
            away_goals: game.away_goals,
            created_at: Utc::now(),
        };
        tables.games.push(game.clone());
        Ok(game)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.games.iter().find(|g| g.id == id).cloned())
    }

    async fn games_for_event(&self, event_id: EventId) -> Result<Vec<Game>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .games
            .iter()
            .filter(|g| g.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn stats_for_games(
        &self,
        game_ids: &[GameId],
        kinds: &[StatKind],
    ) -> Result<Vec<PlayerStat>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stats
            .iter()
            .filter(|s| game_ids.contains(&s.game_id) && kinds.contains(&s.kind))
            .cloned()
            .collect())
    }

    async fn stats_for_game(&self, game_id: GameId) -> Result<Vec<PlayerStat>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stats
            .iter()
            .filter(|s| s.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn record_goal(&self, goal: &RecordedGoal) -> Result<Game, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.games.iter().position(|g| g.id == goal.game_id) else {
            return Err(StorageError::NotFound {
                entity: "Game",
                id: goal.game_id.get(),
            });
        };

        let created_at = Utc::now();
        let goal_id = StatId::new(tables.next_id());
        tables.stats.push(PlayerStat {
            id: goal_id,
            game_id: goal.game_id,
            player_id: goal.scorer_id,
            team_id: goal.team_id,
            kind: goal.kind,
            minute: goal.minute,
            goal_stat_id: None,
            created_at,
        });

        if let Some(assist) = goal.assist_player_id {
            let id = StatId::new(tables.next_id());
            tables.stats.push(PlayerStat {
                id,
                game_id: goal.game_id,
                player_id: assist,
                team_id: goal.team_id,
                kind: StatKind::Assist,
                minute: goal.minute,
                goal_stat_id: Some(goal_id),
                created_at,
            });
        }

        let game = &mut tables.games[index];
        match goal.side {
            Side::Home => game.home_goals = game.home_goals.saturating_add(1),
            Side::Away => game.away_goals = game.away_goals.saturating_add(1),
        }
        Ok(game.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    #[tokio::test]
    async fn test_ids_are_unique_across_tables() {
        let store = InMemoryStore::new();
        let event = store
            .create_event(&NewEvent {
                name: "Cup".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                event_url: Url::parse("https://example.com").unwrap(),
            })
            .await
            .unwrap();
        let team = store
            .create_team(&NewTeam {
                name: "Red".to_string(),
                event_id: event.id,
            })
            .await
            .unwrap();

        assert_ne!(event.id.get(), team.id.get());
    }

    #[tokio::test]
    async fn test_record_goal_updates_score() {
        let store = InMemoryStore::new();
        let game = store
            .create_game(&NewGame {
                event_id: EventId::new(1),
                home_team_id: TeamId::new(1),
                away_team_id: TeamId::new(2),
                home_goals: 0,
                away_goals: 0,
            })
            .await
            .unwrap();

        let updated = store
            .record_goal(&RecordedGoal {
                game_id: game.id,
                scorer_id: PlayerId::new(5),
                team_id: TeamId::new(2),
                side: Side::Away,
                kind: StatKind::Penalty,
                minute: 90,
                assist_player_id: Some(PlayerId::new(6)),
            })
            .await
            .unwrap();

        assert_eq!(updated.away_goals, 1);
        let stats = store.stats_for_game(game.id).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].goal_stat_id, Some(stats[0].id));
    }

    async fn roster(store: &InMemoryStore) -> (Team, Player, Game) {
        let red = store
            .create_team(&NewTeam {
                name: "Red".to_string(),
                event_id: EventId::new(1),
            })
            .await
            .unwrap();
        let blue = store
            .create_team(&NewTeam {
                name: "Blue".to_string(),
                event_id: EventId::new(1),
            })
            .await
            .unwrap();
        let player = store
            .create_player(&NewPlayer {
                name: "Ivan".to_string(),
                team_id: blue.id,
            })
            .await
            .unwrap();
        let game = store
            .create_game(&NewGame {
                event_id: EventId::new(1),
                home_team_id: red.id,
                away_team_id: blue.id,
                home_goals: 0,
                away_goals: 0,
            })
            .await
            .unwrap();
        (blue, player, game)
    }

    #[tokio::test]
    async fn test_record_goal_saturates_score() {
        let store = InMemoryStore::new();
        let game = store
            .create_game(&NewGame {
                event_id: EventId::new(1),
                home_team_id: TeamId::new(1),
                away_team_id: TeamId::new(2),
                home_goals: u32::MAX,
                away_goals: 0,
            })
            .await
            .unwrap();

        let updated = store
            .record_goal(&RecordedGoal {
                game_id: game.id,
                scorer_id: PlayerId::new(5),
                team_id: TeamId::new(1),
                side: Side::Home,
                kind: StatKind::Goal,
                minute: 3,
                assist_player_id: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.home_goals, u32::MAX);
    }

    #[tokio::test]
    async fn test_delete_player() {
        let store = InMemoryStore::new();
        let (blue, player, game) = roster(&store).await;

        let spare = store
            .create_player(&NewPlayer {
                name: "Spare".to_string(),
                team_id: blue.id,
            })
            .await
            .unwrap();
        store.delete_player(spare.id).await.unwrap();
        assert!(store.get_player(spare.id).await.unwrap().is_none());

        store
            .record_goal(&RecordedGoal {
                game_id: game.id,
                scorer_id: player.id,
                team_id: blue.id,
                side: Side::Away,
                kind: StatKind::Goal,
                minute: 10,
                assist_player_id: None,
            })
            .await
            .unwrap();
        let err = store.delete_player(player.id).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let err = store.delete_player(spare.id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "Player", .. }));
    }

    #[tokio::test]
    async fn test_delete_team() {
        let store = InMemoryStore::new();
        let (blue, _, _) = roster(&store).await;

        let err = store.delete_team(blue.id).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let green = store
            .create_team(&NewTeam {
                name: "Green".to_string(),
                event_id: EventId::new(1),
            })
            .await
            .unwrap();
        let keeper = store
            .create_player(&NewPlayer {
                name: "Keeper".to_string(),
                team_id: green.id,
            })
            .await
            .unwrap();

        store.delete_team(green.id).await.unwrap();
        assert!(store.get_team(green.id).await.unwrap().is_none());
        assert!(store.get_player(keeper.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_team_is_conflict() {
        let store = InMemoryStore::new();
        let team = NewTeam {
            name: "Red".to_string(),
            event_id: EventId::new(1),
        };
        store.create_team(&team).await.unwrap();
        let err = store.create_team(&team).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }
}
