use std::sync::Arc;

use crate::config::Config;
use crate::store::ResultStore;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResultStore>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn ResultStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
