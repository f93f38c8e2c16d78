use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::player::Player;

pub type GameId = Uuid;
pub type PlayerId = Uuid;

/// Side length of the square board.
pub const BOARD_SIZE: usize = 5;
/// Number of cells on the board (`BOARD_SIZE²`).
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    #[default]
    Created,
    Ongoing,
    End,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Created => "CREATED",
            GameState::Ongoing => "ONGOING",
            GameState::End => "END",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game state '{0}'")]
pub struct UnknownGameState(pub String);

impl FromStr for GameState {
    type Err = UnknownGameState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(GameState::Created),
            "ONGOING" => Ok(GameState::Ongoing),
            "END" => Ok(GameState::End),
            other => Err(UnknownGameState(other.to_string())),
        }
    }
}

/// The aggregate root. `board_base` holds one letter index per cell and
/// `board_positioning` one packed owner/strength value per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Game {
    pub id: GameId,
    /// Zero-based index into `players`, in join order.
    pub current_player_order: u8,
    pub number_of_players: u8,
    pub players: Vec<Player>,
    pub played_words: Vec<PlayedWord>,
    pub state: GameState,
    pub board_base: Vec<u8>,
    pub board_positioning: Vec<u8>,
}

impl Game {
    /// A fresh, ongoing game with nobody seated and an unclaimed board.
    pub fn new(id: GameId, number_of_players: u8, board_base: Vec<u8>) -> Self {
        Self {
            id,
            current_player_order: 0,
            number_of_players,
            players: Vec::new(),
            played_words: Vec::new(),
            state: GameState::Ongoing,
            board_base,
            board_positioning: vec![0; BOARD_CELLS],
        }
    }

    pub fn is_playable(&self) -> bool {
        self.state == GameState::Ongoing
    }
}

/// Join record; `ordering` is the player's zero-based turn slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GamePlayer {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub ordering: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayedWord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub word: String,
}
