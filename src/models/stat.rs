//! Per-game player statistic records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{GameId, PlayerId, Side, StatId, TeamId};

/// Latest minute a statistic can be recorded at (extra time included).
pub const MAX_MINUTE: i64 = 200;

/// What a statistic record counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Goal,
    Penalty,
    OwnGoal,
    Assist,
}

impl StatKind {
    /// Kinds that put a goal on the scoreboard.
    pub const GOALS: [StatKind; 3] = [StatKind::Goal, StatKind::Penalty, StatKind::OwnGoal];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Goal => "goal",
            StatKind::Penalty => "penalty",
            StatKind::OwnGoal => "own_goal",
            StatKind::Assist => "assist",
        }
    }

    /// Parse a submitted goal type, falling back to a plain goal for anything
    /// that is not a goal kind.
    pub fn goal_kind_or_default(raw: Option<&str>) -> StatKind {
        match raw.map(str::parse::<StatKind>) {
            Some(Ok(kind)) if kind != StatKind::Assist => kind,
            _ => StatKind::Goal,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown statistic kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown stat kind: {0}")]
pub struct UnknownStatKind(pub String);

impl FromStr for StatKind {
    type Err = UnknownStatKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goal" => Ok(StatKind::Goal),
            "penalty" => Ok(StatKind::Penalty),
            "own_goal" | "own-goal" | "owngoal" => Ok(StatKind::OwnGoal),
            "assist" => Ok(StatKind::Assist),
            other => Err(UnknownStatKind(other.to_string())),
        }
    }
}

/// One statistic record for one player in one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub id: StatId,
    pub game_id: GameId,
    pub player_id: PlayerId,

    /// Team the record counts for; not necessarily the player's roster team
    pub team_id: TeamId,

    pub kind: StatKind,
    pub minute: i64,

    /// For assists, the goal record this assist supports
    pub goal_stat_id: Option<StatId>,

    pub created_at: DateTime<Utc>,
}

/// Clamp a submitted minute into `0..=MAX_MINUTE`.
pub fn clamp_minute(minute: i64) -> i64 {
    minute.clamp(0, MAX_MINUTE)
}

/// Raw goal submission for a game.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalForm {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub assist_player_id: Option<PlayerId>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub minute: Option<i64>,
    #[serde(default)]
    pub goal_type: Option<String>,
}

/// A normalized goal ready to be written atomically: the goal record, the
/// optional assist record and the score bump for `side`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedGoal {
    pub game_id: GameId,
    pub scorer_id: PlayerId,
    pub team_id: TeamId,
    pub side: Side,
    pub kind: StatKind,
    pub minute: i64,
    pub assist_player_id: Option<PlayerId>,
}

/// The assist attached to a goal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistRef {
    pub id: StatId,
    pub player: String,
    pub team: String,
}

/// One line of a game's goal list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalRow {
    pub id: StatId,
    pub minute: i64,
    pub goal_type: StatKind,
    pub scorer: String,
    pub scoring_team: String,
    pub assist: Option<AssistRef>,
}
