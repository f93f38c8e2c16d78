use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub device_fingerprint: String,
    /// Unix timestamp (seconds) after which the session token is refused.
    pub session_expires_at: i64,
}

impl Player {
    /// A player known only by id, as seen from a join record.
    pub fn with_id(id: PlayerId) -> Self {
        Self {
            id,
            username: String::new(),
            device_fingerprint: String::new(),
            session_expires_at: 0,
        }
    }
}
