use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::{compute_leaderboards, compute_standings, Board, CalculateError, NameDirectory};
use crate::models::{EventId, EventTable, GameId, PlayerId};
use crate::storage::{StorageError, TournamentStore};

/// Failures while building an event table.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Integrity(#[from] CalculateError),
}

/// Builds standings and leaderboards for an event from the store.
///
/// Holds no state besides the store handle; every call reads a fresh
/// snapshot and recomputes everything.
#[derive(Clone)]
pub struct StandingsEngine {
    store: Arc<dyn TournamentStore>,
}

impl StandingsEngine {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn event_table(&self, event_id: EventId) -> Result<EventTable, EngineError> {
        if self.store.get_event(event_id).await?.is_none() {
            return Err(EngineError::EventNotFound(event_id));
        }

        let teams = self.store.teams_for_event(event_id).await?;
        let games = self.store.games_for_event(event_id).await?;
        let standings = compute_standings(&teams, &games);

        let game_ids: Vec<GameId> = games.iter().map(|g| g.id).collect();
        let stats = self
            .store
            .stats_for_games(&game_ids, &Board::COUNTED_KINDS)
            .await?;

        let mut player_ids: Vec<PlayerId> = stats.iter().map(|s| s.player_id).collect();
        player_ids.sort();
        player_ids.dedup();
        let players = self.store.players_by_ids(&player_ids).await?;

        let names = NameDirectory::new(&players, &teams);
        let event_games: HashSet<GameId> = game_ids.into_iter().collect();
        let boards = compute_leaderboards(&event_games, &stats, &names).map_err(|e| {
            warn!(error = %e, "Inconsistent statistics for event");
            e
        })?;

        debug!(
            teams = standings.len(),
            games = games.len(),
            stats = stats.len(),
            "Computed event table"
        );

        Ok(EventTable {
            standings,
            top_scorers: boards.top_scorers,
            top_assists: boards.top_assists,
        })
    }
}
