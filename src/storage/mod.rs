//! Persistence for events, teams, players, games and statistics.
//!
//! Everything above this layer talks to a [`TournamentStore`], injected as an
//! `Arc<dyn TournamentStore>`:
//! - [`SqliteStore`] is the real store, a SQLite file accessed through sqlx
//! - [`InMemoryStore`] keeps the same tables in memory for development and tests

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Event, EventId, Game, GameId, NewEvent, NewGame, NewPlayer, NewTeam, Player, PlayerId,
    PlayerStat, RecordedGoal, StatKind, Team, TeamId,
};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

const MEMORY_PATH: &str = ":memory:";

impl StorageConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self { database_path }
    }

    /// A private database that disappears with the pool.
    pub fn in_memory() -> Self {
        Self::new(PathBuf::from(MEMORY_PATH))
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data.db"))
    }
}

/// The store capabilities the application needs.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn create_event(&self, event: &NewEvent) -> Result<Event, StorageError>;
    /// Newest first.
    async fn list_events(&self) -> Result<Vec<Event>, StorageError>;
    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError>;

    /// Fails with [`StorageError::Conflict`] if the event already has a team
    /// with that name.
    async fn create_team(&self, team: &NewTeam) -> Result<Team, StorageError>;
    async fn get_team(&self, id: TeamId) -> Result<Option<Team>, StorageError>;
    /// Sorted by name.
    async fn teams_for_event(&self, event_id: EventId) -> Result<Vec<Team>, StorageError>;
    /// Removes the team together with its roster. Fails with
    /// [`StorageError::Conflict`] while the team plays in any game or a
    /// statistic refers to it or one of its players.
    async fn delete_team(&self, id: TeamId) -> Result<(), StorageError>;

    /// Fails with [`StorageError::Conflict`] if the team already has a player
    /// with that name.
    async fn create_player(&self, player: &NewPlayer) -> Result<Player, StorageError>;
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StorageError>;
    async fn players_for_team(&self, team_id: TeamId) -> Result<Vec<Player>, StorageError>;
    /// Fails with [`StorageError::Conflict`] once the player has recorded
    /// statistics.
    async fn delete_player(&self, id: PlayerId) -> Result<(), StorageError>;
    /// Ids with no matching player are left out.
    async fn players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StorageError>;

    async fn create_game(&self, game: &NewGame) -> Result<Game, StorageError>;
    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError>;
    /// In creation order.
    async fn games_for_event(&self, event_id: EventId) -> Result<Vec<Game>, StorageError>;

    /// Statistics of the given kinds recorded in any of `game_ids`, in
    /// creation order.
    async fn stats_for_games(
        &self,
        game_ids: &[GameId],
        kinds: &[StatKind],
    ) -> Result<Vec<PlayerStat>, StorageError>;
    /// Every statistic of one game, in creation order.
    async fn stats_for_game(&self, game_id: GameId) -> Result<Vec<PlayerStat>, StorageError>;

    /// Atomically write the goal record, its optional assist, and bump the
    /// credited side's score. Returns the updated game.
    async fn record_goal(&self, goal: &RecordedGoal) -> Result<Game, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.database_path, PathBuf::from("./data.db"));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_storage_config_in_memory() {
        assert!(StorageConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_not_found_message() {
        let err = StorageError::NotFound {
            entity: "Game",
            id: 12,
        };
        assert_eq!(err.to_string(), "Game not found: 12");
    }
}
