//! Document store access: repository ports plus the Postgres backend.
//!
//! Collections are stored as one table per collection with a JSONB payload
//! column where the document body is opaque to the backend.

pub mod ports;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

pub use ports::{
    AlertsRepository, DeclarationsRepository, InfoAlertsRepository,
    RefreshStateRepository, SettingsRepository, TasksRepository,
    UsersRepository,
};
pub use postgres::Store;

/// Bundle of repository handles passed to handlers and services.
///
/// Fields are trait objects so tests can swap in in-memory collections.
#[derive(Clone)]
pub struct StoreHandles {
    pub alerts: Arc<dyn AlertsRepository>,
    pub refresh_state: Arc<dyn RefreshStateRepository>,
    pub tasks: Arc<dyn TasksRepository>,
    pub info_alerts: Arc<dyn InfoAlertsRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub declarations: Arc<dyn DeclarationsRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for StoreHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandles").finish_non_exhaustive()
    }
}
