//! Goal recording and per-game goal lists.
//!
//! A submitted goal is normalized before it reaches the store: the credited
//! team falls back to the home side, the minute is clamped, unknown goal
//! types become plain goals, and own goals never carry an assist.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::{
    clamp_minute, AssistRef, Game, GameId, GoalForm, GoalRow, PlayerId, RecordedGoal, Side,
    StatId, StatKind, TeamId,
};
use crate::storage::{StorageError, TournamentStore};

#[derive(Debug, Error)]
pub enum ScoresheetError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Scorer is required")]
    ScorerRequired,

    #[error("Scorer not found: {0}")]
    ScorerNotFound(PlayerId),

    #[error("Stat {stat} references missing {what} {id}")]
    Dangling {
        stat: StatId,
        what: &'static str,
        id: i64,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A game with its goal list.
#[derive(Debug, Clone, Serialize)]
pub struct GameSheet {
    pub game: Game,
    pub goals: Vec<GoalRow>,
}

/// Turn a submitted goal into the record to store.
///
/// `assist_exists` tells whether the submitted assist player resolved; an
/// unresolved assist is dropped rather than rejected.
pub fn normalize_goal(
    game: &Game,
    scorer_id: PlayerId,
    form: &GoalForm,
    assist_exists: bool,
) -> RecordedGoal {
    let (team_id, side) = match form.team_id.and_then(|t| game.side_of(t).map(|s| (t, s))) {
        Some(credited) => credited,
        None => (game.home_team_id, Side::Home),
    };
    let kind = StatKind::goal_kind_or_default(form.goal_type.as_deref());
    let minute = clamp_minute(form.minute.unwrap_or(0));

    let assist_player_id = form
        .assist_player_id
        .filter(|a| !a.is_unset() && *a != scorer_id)
        .filter(|_| kind != StatKind::OwnGoal && assist_exists);

    RecordedGoal {
        game_id: game.id,
        scorer_id,
        team_id,
        side,
        kind,
        minute,
        assist_player_id,
    }
}

/// Records goals and reads back goal lists through the injected store.
#[derive(Clone)]
pub struct Scoresheet {
    store: Arc<dyn TournamentStore>,
}

impl Scoresheet {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, form))]
    pub async fn record_goal(
        &self,
        game_id: GameId,
        form: GoalForm,
    ) -> Result<GameSheet, ScoresheetError> {
        let game = self
            .store
            .get_game(game_id)
            .await?
            .ok_or(ScoresheetError::GameNotFound(game_id))?;

        let scorer_id = form
            .player_id
            .filter(|p| !p.is_unset())
            .ok_or(ScoresheetError::ScorerRequired)?;
        if self.store.get_player(scorer_id).await?.is_none() {
            warn!(player_id = %scorer_id, "Rejected goal for unknown scorer");
            return Err(ScoresheetError::ScorerNotFound(scorer_id));
        }

        let assist_exists = match form.assist_player_id.filter(|a| !a.is_unset()) {
            Some(assist) => self.store.get_player(assist).await?.is_some(),
            None => false,
        };

        let goal = normalize_goal(&game, scorer_id, &form, assist_exists);
        let game = self.store.record_goal(&goal).await?;
        info!(
            game_id = %game.id,
            kind = %goal.kind,
            minute = goal.minute,
            assisted = goal.assist_player_id.is_some(),
            "Goal recorded"
        );

        let goals = self.goal_rows(&game).await?;
        Ok(GameSheet { game, goals })
    }

    /// Goals of a game in the order they were recorded, each with its assist.
    pub async fn goal_rows(&self, game: &Game) -> Result<Vec<GoalRow>, ScoresheetError> {
        let stats = self.store.stats_for_game(game.id).await?;

        let mut player_ids: Vec<PlayerId> = stats.iter().map(|s| s.player_id).collect();
        player_ids.sort();
        player_ids.dedup();
        let players: HashMap<PlayerId, String> = self
            .store
            .players_by_ids(&player_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let teams: HashMap<TeamId, String> = self
            .store
            .teams_for_event(game.event_id)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let player_name = |stat: StatId, id: PlayerId| {
            players
                .get(&id)
                .cloned()
                .ok_or(ScoresheetError::Dangling {
                    stat,
                    what: "player",
                    id: id.get(),
                })
        };
        let team_name = |stat: StatId, id: TeamId| {
            teams.get(&id).cloned().ok_or(ScoresheetError::Dangling {
                stat,
                what: "team",
                id: id.get(),
            })
        };

        let assists: HashMap<StatId, _> = stats
            .iter()
            .filter(|s| s.kind == StatKind::Assist)
            .filter_map(|s| s.goal_stat_id.map(|goal| (goal, s)))
            .collect();

        let mut rows = Vec::new();
        for stat in stats.iter().filter(|s| StatKind::GOALS.contains(&s.kind)) {
            let assist = match assists.get(&stat.id) {
                Some(a) => Some(AssistRef {
                    id: a.id,
                    player: player_name(a.id, a.player_id)?,
                    team: team_name(a.id, a.team_id)?,
                }),
                None => None,
            };
            rows.push(GoalRow {
                id: stat.id,
                minute: stat.minute,
                goal_type: stat.kind,
                scorer: player_name(stat.id, stat.player_id)?,
                scoring_team: team_name(stat.id, stat.team_id)?,
                assist,
            });
        }

        debug!(game_id = %game.id, goals = rows.len(), "Built goal rows");
        Ok(rows)
    }
}
