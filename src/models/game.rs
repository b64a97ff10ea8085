//! Game model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, GameId, TeamId, ValidationError};

/// A game between two teams of one event, with its current score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub event_id: EventId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_goals: u32,
    pub away_goals: u32,
    pub created_at: DateTime<Utc>,
}

/// Which side of a game a team played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Result of a game from the home team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl Outcome {
    /// The winning side, or `None` for a draw.
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::HomeWin => Some(Side::Home),
            Outcome::AwayWin => Some(Side::Away),
            Outcome::Draw => None,
        }
    }
}

impl Game {
    pub fn outcome(&self) -> Outcome {
        match self.home_goals.cmp(&self.away_goals) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// The side `team` played on, if it played in this game at all.
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.home_team_id {
            Some(Side::Home)
        } else if team == self.away_team_id {
            Some(Side::Away)
        } else {
            None
        }
    }
}

/// Highest score a game may be created with.
pub const MAX_GOALS: u32 = 999;

/// Raw game submission. Scores are optional and default to 0-0.
#[derive(Debug, Clone, Deserialize)]
pub struct GameForm {
    #[serde(default = "unset_event")]
    pub event_id: EventId,
    #[serde(default = "unset_team")]
    pub home_team_id: TeamId,
    #[serde(default = "unset_team")]
    pub away_team_id: TeamId,
    #[serde(default)]
    pub home_goals: Option<u32>,
    #[serde(default)]
    pub away_goals: Option<u32>,
}

fn unset_event() -> EventId {
    EventId::new(0)
}

fn unset_team() -> TeamId {
    TeamId::new(0)
}

/// A game whose ids are set and distinct. Team existence and event
/// membership still need checking against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub event_id: EventId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl GameForm {
    pub fn validate(self) -> Result<NewGame, ValidationError> {
        if self.event_id.is_unset() {
            return Err(ValidationError::Required("event_id"));
        }
        if self.home_team_id.is_unset() {
            return Err(ValidationError::Required("home_team_id"));
        }
        if self.away_team_id.is_unset() {
            return Err(ValidationError::Required("away_team_id"));
        }
        if self.home_team_id == self.away_team_id {
            return Err(ValidationError::SameTeams);
        }
        let home_goals = self.home_goals.unwrap_or(0);
        let away_goals = self.away_goals.unwrap_or(0);
        for goals in [home_goals, away_goals] {
            if goals > MAX_GOALS {
                return Err(ValidationError::ScoreOutOfRange(goals));
            }
        }
        Ok(NewGame {
            event_id: self.event_id,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_goals,
            away_goals,
        })
    }
}
