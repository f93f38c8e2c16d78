use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error code returned to clients; carries no backend detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    InvalidPlayerCount { requested: u8 },
    PlayerNotFound { player_id: String },
    GameNotFound { game_id: String },
    TableFull,
    AlreadyJoined,
    GameUnplayable,
    NotYourTurn,
    InvalidWord,
    WordRejected { word: String },
    WordAlreadyPlayed { word: String },
    AuthenticationRequired,
    InternalError { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ConnectionError {
    InvalidToken,
    SessionExpired,
    InternalError { message: String },
}
