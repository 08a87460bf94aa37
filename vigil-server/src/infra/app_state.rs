use std::{fmt, sync::Arc};

use vigil_core::auth::AuthService;
use vigil_core::engine::EngineClient;
use vigil_core::refresh::RefreshGate;
use vigil_core::store::StoreHandles;
use vigil_core::watch::WatchAnalyzer;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreHandles,
    /// Present only when an alert engine target is configured; listings
    /// degrade to plain reads otherwise.
    pub gate: Option<Arc<RefreshGate>>,
    pub engine: Option<Arc<EngineClient>>,
    pub watch: Option<Arc<WatchAnalyzer>>,
    pub auth: Arc<AuthService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: StoreHandles,
        gate: Option<Arc<RefreshGate>>,
        engine: Option<Arc<EngineClient>>,
        watch: Option<Arc<WatchAnalyzer>>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            config,
            store,
            gate,
            engine,
            watch,
            auth,
        }
    }
}
