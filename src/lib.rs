//! # Lukyasha Tracker
//!
//! A small tournament tracker: events, teams, players, games and goals,
//! with league standings and scorer/assist leaderboards derived on demand.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (events, teams, games, stats, etc.)
//! - **calculate**: Standings and leaderboard computation
//! - **scoresheet**: Goal recording and per-game goal lists
//! - **storage**: The store trait with SQLite and in-memory backends
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod scoresheet;
pub mod storage;

pub use models::*;
