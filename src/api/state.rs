use std::sync::Arc;

use crate::calculate::StandingsEngine;
use crate::config::AppConfig;
use crate::scoresheet::Scoresheet;
use crate::storage::TournamentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TournamentStore>,
    pub engine: StandingsEngine,
    pub scoresheet: Scoresheet,
    pub static_dir: Option<String>,
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            engine: StandingsEngine::new(store.clone()),
            scoresheet: Scoresheet::new(store.clone()),
            store,
            static_dir: None,
            cors_origin: None,
        }
    }

    pub fn from_config(store: Arc<dyn TournamentStore>, config: &AppConfig) -> Self {
        Self {
            static_dir: Some(config.static_dir.clone()),
            cors_origin: Some(config.server.cors_origin.clone()),
            ..Self::new(store)
        }
    }
}
