//! # Vigil Core
//!
//! Domain services for the Vigil compliance backend:
//!
//! - **Store** — repository ports over the document collections (`alerts`,
//!   `tasks`, `declarations`, `users`, `info_alerts`, `company_settings`,
//!   refresh metadata) with Postgres implementations.
//! - **Engine** — authenticated client for the external alert engine, with a
//!   three-tier credential chain.
//! - **Refresh** — the TTL gate deciding when a listing request re-triggers
//!   an engine scan, synchronously or fire-and-forget.
//! - **Agents** — the fiscal research agent consumed by the regulatory watch.
//! - **Auth** — password hashing and bearer-token issuance.

pub mod agents;
pub mod auth;
pub mod engine;
pub mod error;
pub mod export;
pub mod procedures;
pub mod refresh;
pub mod store;
pub mod watch;

pub use error::{CoreError, Result};
pub use refresh::{Clock, RefreshGate, SystemClock, TriggerReport};
pub use store::{Store, StoreHandles};
