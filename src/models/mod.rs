//! Core data models for the tracker.

mod event;
mod game;
mod ids;
mod stat;
mod standings;
mod team;

pub use event::*;
pub use game::*;
pub use ids::*;
pub use stat::*;
pub use standings::*;
pub use team::*;

use thiserror::Error;

/// Rejections raised while turning submitted input into a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Teams must be different")]
    SameTeams,

    #[error("Score out of range: {0}")]
    ScoreOutOfRange(u32),
}
