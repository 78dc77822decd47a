pub mod api;
pub mod auth;
pub mod config;
pub mod db;

pub use db::DbPool;

use config::Config;

use crate::auth::tokens::TokenService;
use crate::db::AdminStore;

pub struct AppState {
    pub config: Config,
    pub store: AdminStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, store: AdminStore, tokens: TokenService) -> Self {
        Self {
            config,
            store,
            tokens,
        }
    }
}
