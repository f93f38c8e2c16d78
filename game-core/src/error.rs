use game_types::{GameError, GameId, PlayerId};
use thiserror::Error;

use crate::letter_bank::LetterError;
use crate::store::StoreError;
use crate::word_validation::DictionaryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("number of players must be between 2 and 5, got {0}")]
    InvalidPlayerCount(u8),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("the table is full")]
    TableFull,
    #[error("player already joined this game")]
    AlreadyJoined,
    #[error("game is not playable")]
    GameUnplayable,
    #[error("not your turn")]
    NotYourTurn,
    #[error("positions don't make a word")]
    InvalidWord,
    #[error("'{0}' is not a valid word")]
    WordRejected(String),
    #[error("'{0}' has already been played")]
    WordAlreadyPlayed(String),
    #[error("no dictionary for language '{0}'")]
    DictionaryUnavailable(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Letters(#[from] LetterError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<&ServiceError> for GameError {
    fn from(error: &ServiceError) -> Self {
        match error {
            ServiceError::InvalidPlayerCount(requested) => GameError::InvalidPlayerCount {
                requested: *requested,
            },
            ServiceError::PlayerNotFound(id) => GameError::PlayerNotFound {
                player_id: id.to_string(),
            },
            ServiceError::GameNotFound(id) => GameError::GameNotFound {
                game_id: id.to_string(),
            },
            ServiceError::TableFull => GameError::TableFull,
            ServiceError::AlreadyJoined => GameError::AlreadyJoined,
            ServiceError::GameUnplayable => GameError::GameUnplayable,
            ServiceError::NotYourTurn => GameError::NotYourTurn,
            ServiceError::InvalidWord => GameError::InvalidWord,
            ServiceError::WordRejected(word) => GameError::WordRejected { word: word.clone() },
            ServiceError::WordAlreadyPlayed(word) => {
                GameError::WordAlreadyPlayed { word: word.clone() }
            }
            // Backend detail stays in the logs.
            ServiceError::DictionaryUnavailable(_)
            | ServiceError::Store(_)
            | ServiceError::Dictionary(_)
            | ServiceError::Letters(_) => GameError::InternalError {
                message: error.category().to_string(),
            },
        }
    }
}

impl ServiceError {
    /// Coarse grouping used by transports to pick a status code.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::InvalidPlayerCount(_) | ServiceError::InvalidWord => {
                ErrorCategory::InvalidInput
            }
            ServiceError::PlayerNotFound(_) | ServiceError::GameNotFound(_) => {
                ErrorCategory::NotFound
            }
            ServiceError::TableFull
            | ServiceError::AlreadyJoined
            | ServiceError::GameUnplayable
            | ServiceError::NotYourTurn => ErrorCategory::Conflict,
            ServiceError::WordRejected(_) | ServiceError::WordAlreadyPlayed(_) => {
                ErrorCategory::Rejected
            }
            ServiceError::Store(StoreError::NotFound { .. }) => ErrorCategory::NotFound,
            ServiceError::Dictionary(_) | ServiceError::DictionaryUnavailable(_) => {
                ErrorCategory::Dictionary
            }
            ServiceError::Store(_) | ServiceError::Letters(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    NotFound,
    Conflict,
    Rejected,
    Dictionary,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ErrorCategory::InvalidInput => "invalid input",
            ErrorCategory::NotFound => "not found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Rejected => "rejected",
            ErrorCategory::Dictionary => "dictionary unavailable",
            ErrorCategory::Internal => "internal error",
        };
        f.write_str(text)
    }
}
