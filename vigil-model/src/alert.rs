use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ids::AlertId;

/// An alert produced by the external alert engine.
///
/// The payload is opaque to the backend: it is surfaced to the frontend
/// verbatim and never filtered or mutated here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertRecord {
    pub id: AlertId,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

