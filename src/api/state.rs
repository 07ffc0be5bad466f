use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::google::oauth::TokenProvider;
use crate::pipeline::working_set::WorkingSet;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    // Access token cache shared by every outbound call; refresh is
    // single-flight behind its own async mutex
    pub token_provider: TokenProvider,
    // The set of emails the client currently has loaded
    pub working_set: WorkingSet,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            token_provider: TokenProvider::new(),
            working_set: WorkingSet::default(),
        }
    }
}
