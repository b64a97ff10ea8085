//! SQLite store.
//!
//! The schema is created on connect with `CREATE TABLE IF NOT EXISTS`, so
//! pointing the store at a fresh file is enough to get started.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::{StorageConfig, StorageError, TournamentStore};
use crate::models::{
    Event, EventId, Game, GameId, NewEvent, NewGame, NewPlayer, NewTeam, Player, PlayerId,
    PlayerStat, RecordedGoal, Side, StatId, StatKind, Team, TeamId,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        date TEXT NOT NULL,
        event_url TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        event_id INTEGER NOT NULL REFERENCES events(id),
        UNIQUE (event_id, name)
    )",
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        team_id INTEGER NOT NULL REFERENCES teams(id),
        UNIQUE (team_id, name)
    )",
    "CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id INTEGER NOT NULL REFERENCES events(id),
        home_team_id INTEGER NOT NULL REFERENCES teams(id),
        away_team_id INTEGER NOT NULL REFERENCES teams(id),
        home_goals INTEGER NOT NULL DEFAULT 0 CHECK (home_goals >= 0),
        away_goals INTEGER NOT NULL DEFAULT 0 CHECK (away_goals >= 0),
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS game_player_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id INTEGER NOT NULL REFERENCES games(id),
        player_id INTEGER NOT NULL REFERENCES players(id),
        team_id INTEGER NOT NULL REFERENCES teams(id),
        kind TEXT NOT NULL,
        minute INTEGER NOT NULL,
        goal_stat_id INTEGER REFERENCES game_player_stats(id),
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_teams_event ON teams (event_id)",
    "CREATE INDEX IF NOT EXISTS idx_players_team ON players (team_id)",
    "CREATE INDEX IF NOT EXISTS idx_games_event ON games (event_id)",
    "CREATE INDEX IF NOT EXISTS idx_stats_game_kind ON game_player_stats (game_id, kind)",
];

const EVENT_COLUMNS: &str = "id, name, date, event_url, created_at";
const GAME_COLUMNS: &str =
    "id, event_id, home_team_id, away_team_id, home_goals, away_goals, created_at";
const STAT_COLUMNS: &str =
    "id, game_id, player_id, team_id, kind, minute, goal_stat_id, created_at";

/// Store backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database and make sure the schema exists.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let pool = if config.is_in_memory() {
            // every connection to :memory: is its own database, so keep one
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .foreign_keys(true);
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let store = Self { pool };
        store.init_schema().await?;
        info!(path = %config.database_path.display(), "Opened SQLite store");
        Ok(store)
    }

    pub async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema ready");
        Ok(())
    }
}

fn conflict_or(err: sqlx::Error, message: impl FnOnce() -> String) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict(message())
        }
        _ => StorageError::Database(err),
    }
}

fn goals(row: &SqliteRow, column: &str) -> Result<u32, StorageError> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).map_err(|_| StorageError::Corrupt(format!("{} = {}", column, raw)))
}

fn event_from_row(row: &SqliteRow) -> Result<Event, StorageError> {
    Ok(Event {
        id: EventId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        date: row.try_get::<NaiveDate, _>("date")?,
        event_url: row.try_get("event_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn team_from_row(row: &SqliteRow) -> Result<Team, StorageError> {
    Ok(Team {
        id: TeamId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        event_id: EventId::new(row.try_get("event_id")?),
    })
}

fn player_from_row(row: &SqliteRow) -> Result<Player, StorageError> {
    Ok(Player {
        id: PlayerId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        team_id: TeamId::new(row.try_get("team_id")?),
    })
}

fn game_from_row(row: &SqliteRow) -> Result<Game, StorageError> {
    Ok(Game {
        id: GameId::new(row.try_get("id")?),
        event_id: EventId::new(row.try_get("event_id")?),
        home_team_id: TeamId::new(row.try_get("home_team_id")?),
        away_team_id: TeamId::new(row.try_get("away_team_id")?),
        home_goals: goals(row, "home_goals")?,
        away_goals: goals(row, "away_goals")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn stat_from_row(row: &SqliteRow) -> Result<PlayerStat, StorageError> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<StatKind>()
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;
    Ok(PlayerStat {
        id: StatId::new(row.try_get("id")?),
        game_id: GameId::new(row.try_get("game_id")?),
        player_id: PlayerId::new(row.try_get("player_id")?),
        team_id: TeamId::new(row.try_get("team_id")?),
        kind,
        minute: row.try_get("minute")?,
        goal_stat_id: row
            .try_get::<Option<i64>, _>("goal_stat_id")?
            .map(StatId::new),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn collect<T>(
    rows: Vec<SqliteRow>,
    map: fn(&SqliteRow) -> Result<T, StorageError>,
) -> Result<Vec<T>, StorageError> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl TournamentStore for SqliteStore {
    #[instrument(skip(self, event), fields(name = %event.name))]
    async fn create_event(&self, event: &NewEvent) -> Result<Event, StorageError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO events (name, date, event_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&event.name)
        .bind(event.date)
        .bind(event.event_url.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = EventId::new(result.last_insert_rowid());
        info!(event_id = %id, "Created event");
        Ok(Event {
            id,
            name: event.name.clone(),
            date: event.date,
            event_url: event.event_url.to_string(),
            created_at,
        })
    }

    async fn list_events(&self) -> Result<Vec<Event>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows, event_from_row)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(event_from_row).transpose()
    }

    #[instrument(skip(self, team), fields(event_id = %team.event_id, name = %team.name))]
    async fn create_team(&self, team: &NewTeam) -> Result<Team, StorageError> {
        let result = sqlx::query("INSERT INTO teams (name, event_id) VALUES (?, ?)")
            .bind(&team.name)
            .bind(team.event_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_or(e, || {
                    format!("Team {} already exists in event {}", team.name, team.event_id)
                })
            })?;

        let id = TeamId::new(result.last_insert_rowid());
        info!(team_id = %id, "Created team");
        Ok(Team {
            id,
            name: team.name.clone(),
            event_id: team.event_id,
        })
    }

    async fn get_team(&self, id: TeamId) -> Result<Option<Team>, StorageError> {
        let row = sqlx::query("SELECT id, name, event_id FROM teams WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(team_from_row).transpose()
    }

    async fn teams_for_event(&self, event_id: EventId) -> Result<Vec<Team>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, event_id FROM teams WHERE event_id = ? ORDER BY name ASC, id ASC",
        )
        .bind(event_id.get())
        .fetch_all(&self.pool)
        .await?;
        collect(rows, team_from_row)
    }

    #[instrument(skip(self))]
    async fn delete_team(&self, id: TeamId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query("SELECT id FROM teams WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StorageError::NotFound {
                entity: "Team",
                id: id.get(),
            });
        }

        let games: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM games WHERE home_team_id = ? OR away_team_id = ?",
        )
        .bind(id.get())
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await?
        .try_get("n")?;
        if games > 0 {
            warn!(games, "Refusing to delete team with games");
            return Err(StorageError::Conflict(format!("Team {} still has games", id)));
        }

        let stats: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM game_player_stats
             WHERE team_id = ? OR player_id IN (SELECT id FROM players WHERE team_id = ?)",
        )
        .bind(id.get())
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await?
        .try_get("n")?;
        if stats > 0 {
            warn!(stats, "Refusing to delete team with statistics");
            return Err(StorageError::Conflict(format!(
                "Team {} has recorded statistics",
                id
            )));
        }

        let players = sqlx::query("DELETE FROM players WHERE team_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(players, "Deleted team");
        Ok(())
    }

    #[instrument(skip(self, player), fields(team_id = %player.team_id, name = %player.name))]
    async fn create_player(&self, player: &NewPlayer) -> Result<Player, StorageError> {
        let result = sqlx::query("INSERT INTO players (name, team_id) VALUES (?, ?)")
            .bind(&player.name)
            .bind(player.team_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_or(e, || {
                    format!("Player {} already exists in team {}", player.name, player.team_id)
                })
            })?;

        let id = PlayerId::new(result.last_insert_rowid());
        info!(player_id = %id, "Created player");
        Ok(Player {
            id,
            name: player.name.clone(),
            team_id: player.team_id,
        })
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StorageError> {
        let row = sqlx::query("SELECT id, name, team_id FROM players WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(player_from_row).transpose()
    }

    async fn players_for_team(&self, team_id: TeamId) -> Result<Vec<Player>, StorageError> {
        let rows =
            sqlx::query("SELECT id, name, team_id FROM players WHERE team_id = ? ORDER BY id")
                .bind(team_id.get())
                .fetch_all(&self.pool)
                .await?;
        collect(rows, player_from_row)
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, id: PlayerId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        let stats: i64 =
            sqlx::query("SELECT COUNT(*) AS n FROM game_player_stats WHERE player_id = ?")
                .bind(id.get())
                .fetch_one(&mut *tx)
                .await?
                .try_get("n")?;
        if stats > 0 {
            warn!(stats, "Refusing to delete player with statistics");
            return Err(StorageError::Conflict(format!(
                "Player {} has recorded statistics",
                id
            )));
        }

        let deleted = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StorageError::NotFound {
                entity: "Player",
                id: id.get(),
            });
        }

        tx.commit().await?;
        info!("Deleted player");
        Ok(())
    }

    async fn players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name, team_id FROM players WHERE id IN (");
        {
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(id.get());
            }
        }
        query.push(") ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        collect(rows, player_from_row)
    }

    #[instrument(skip(self, game), fields(event_id = %game.event_id))]
    async fn create_game(&self, game: &NewGame) -> Result<Game, StorageError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO games (event_id, home_team_id, away_team_id, home_goals, away_goals, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(game.event_id.get())
        .bind(game.home_team_id.get())
        .bind(game.away_team_id.get())
        .bind(i64::from(game.home_goals))
        .bind(i64::from(game.away_goals))
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = GameId::new(result.last_insert_rowid());
        info!(game_id = %id, "Created game");
        Ok(Game {
            id,
            event_id: game.event_id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            home_goals: game.home_goals,
            away_goals: game.away_goals,
            created_at,
        })
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn games_for_event(&self, event_id: EventId) -> Result<Vec<Game>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM games WHERE event_id = ? ORDER BY id",
            GAME_COLUMNS
        ))
        .bind(event_id.get())
        .fetch_all(&self.pool)
        .await?;
        collect(rows, game_from_row)
    }

    async fn stats_for_games(
        &self,
        game_ids: &[GameId],
        kinds: &[StatKind],
    ) -> Result<Vec<PlayerStat>, StorageError> {
        if game_ids.is_empty() || kinds.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM game_player_stats WHERE game_id IN (",
            STAT_COLUMNS
        ));
        {
            let mut separated = query.separated(", ");
            for id in game_ids {
                separated.push_bind(id.get());
            }
        }
        query.push(") AND kind IN (");
        {
            let mut separated = query.separated(", ");
            for kind in kinds {
                separated.push_bind(kind.as_str());
            }
        }
        query.push(") ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        debug!(games = game_ids.len(), rows = rows.len(), "Fetched stats");
        collect(rows, stat_from_row)
    }

    async fn stats_for_game(&self, game_id: GameId) -> Result<Vec<PlayerStat>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM game_player_stats WHERE game_id = ? ORDER BY id",
            STAT_COLUMNS
        ))
        .bind(game_id.get())
        .fetch_all(&self.pool)
        .await?;
        collect(rows, stat_from_row)
    }

    #[instrument(skip(self, goal), fields(game_id = %goal.game_id, kind = %goal.kind))]
    async fn record_goal(&self, goal: &RecordedGoal) -> Result<Game, StorageError> {
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query("SELECT id FROM games WHERE id = ?")
            .bind(goal.game_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            warn!("Goal for unknown game");
            return Err(StorageError::NotFound {
                entity: "Game",
                id: goal.game_id.get(),
            });
        }

        let created_at = Utc::now();

        let goal_id = sqlx::query(
            "INSERT INTO game_player_stats (game_id, player_id, team_id, kind, minute, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(goal.game_id.get())
        .bind(goal.scorer_id.get())
        .bind(goal.team_id.get())
        .bind(goal.kind.as_str())
        .bind(goal.minute)
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        if let Some(assist) = goal.assist_player_id {
            sqlx::query(
                "INSERT INTO game_player_stats (game_id, player_id, team_id, kind, minute, goal_stat_id, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(goal.game_id.get())
            .bind(assist.get())
            .bind(goal.team_id.get())
            .bind(StatKind::Assist.as_str())
            .bind(goal.minute)
            .bind(goal_id)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }

        let bump = match goal.side {
            Side::Home => "UPDATE games SET home_goals = home_goals + 1 WHERE id = ?",
            Side::Away => "UPDATE games SET away_goals = away_goals + 1 WHERE id = ?",
        };
        sqlx::query(bump)
            .bind(goal.game_id.get())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(&format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS))
            .bind(goal.game_id.get())
            .fetch_one(&mut *tx)
            .await?;
        let game = game_from_row(&row)?;

        tx.commit().await?;
        info!(
            goal_stat_id = goal_id,
            home_goals = game.home_goals,
            away_goals = game.away_goals,
            "Recorded goal"
        );
        Ok(game)
    }
}
