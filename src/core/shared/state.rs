use serde::Serialize;

use crate::analysis::AnalysisService;
use crate::core::config::AppConfig;
use crate::core::shared::utils::DbPool;

/// Outcome of the one-time schema migration at startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStatus {
    pub initialized: bool,
    pub error: Option<String>,
}

impl DatabaseStatus {
    pub fn ready() -> Self {
        Self {
            initialized: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            initialized: false,
            error: Some(error.into()),
        }
    }
}

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub analysis: AnalysisService,
    pub db_status: DatabaseStatus,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db_status", &self.db_status)
            .finish_non_exhaustive()
    }
}
