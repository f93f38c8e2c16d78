use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ConnectionError, Game, GameError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthenticateRequest {
    pub device_fingerprint: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthenticateResponse {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewGameRequest {
    pub number_of_players: u8,
}

/// Board positions (0-based, row-major) in the order the letters are read.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TakeTurnRequest {
    pub word: Vec<u8>,
}

/// Pushed to live listeners of a game.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    GameUpdate { game: Game },
    ConnectionFailed { reason: ConnectionError },
    Error { error: GameError },
}
