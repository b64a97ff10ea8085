//! Standings and leaderboard calculation.
//!
//! Computes derived tables from stored event data:
//! - League standings (played, W/D/L, goals, points, ranking)
//! - Top scorers and top assist providers
//!
//! The functions in [`standings`] and [`leaderboard`] are pure and work on
//! snapshots handed to them; [`StandingsEngine`] fetches those snapshots from
//! an injected [`TournamentStore`](crate::storage::TournamentStore).

mod engine;
mod leaderboard;
mod standings;

pub use engine::*;
pub use leaderboard::*;
pub use standings::*;

use thiserror::Error;

use crate::models::{PlayerId, StatId, TeamId};

/// Data-integrity faults found while calculating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculateError {
    #[error("Stat {stat} references unknown player {player}")]
    UnknownPlayer { stat: StatId, player: PlayerId },

    #[error("Stat {stat} is credited to unknown team {team}")]
    UnknownTeam { stat: StatId, team: TeamId },
}
