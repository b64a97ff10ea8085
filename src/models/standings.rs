//! Derived standings and leaderboard rows.
//!
//! None of these are persisted; they are rebuilt from teams, games and
//! statistic records on every request.

use serde::Serialize;

use super::{PlayerId, Team, TeamId};

/// Points for a win.
pub const POINTS_WIN: u32 = 3;
/// Points for a draw.
pub const POINTS_DRAW: u32 = 1;

/// Number of players shown on each leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// The team a standings row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

impl From<&Team> for TeamRef {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
        }
    }
}

/// A team's aggregated record within one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub team: TeamRef,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl StandingRow {
    /// A row with every counter at zero.
    pub fn empty(team: TeamRef) -> Self {
        Self {
            team,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }
}

/// One player on a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub player: String,

    /// Credited team's name
    pub team: String,

    pub count: u32,
}

/// Top scorers and top assist providers of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboards {
    pub top_scorers: Vec<LeaderboardEntry>,
    pub top_assists: Vec<LeaderboardEntry>,
}

/// Full standings snapshot for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTable {
    pub standings: Vec<StandingRow>,
    pub top_scorers: Vec<LeaderboardEntry>,
    pub top_assists: Vec<LeaderboardEntry>,
}
