//! Turn resolution: who may act, what a list of positions spells, and how the
//! board changes once a word is accepted.

use std::collections::HashSet;

use game_types::{Game, GamePlayer, GameState, MAX_PLAYERS, MIN_PLAYERS, PlayerId};
use thiserror::Error;

use crate::board::{encode_cell, is_board_filled, letter_at, positioning_space};
use crate::error::{ServiceError, ServiceResult};
use crate::letter_bank::{LetterBank, LetterError};

/// Largest cap whose packed cell value still fits a byte with five players.
pub const MAX_STRENGTH_LIMIT: u8 = 42;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("max strength must be between 2 and 42, got {0}")]
    MaxStrength(u8),
    #[error("language must not be empty")]
    EmptyLanguage,
    #[error(transparent)]
    Letters(#[from] LetterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    /// Key into the dictionary table and the letter distributions.
    pub language: String,
    pub max_strength: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            language: "id-id".to_string(),
            max_strength: 2,
        }
    }
}

impl GameRules {
    pub fn new(language: impl Into<String>, max_strength: u8) -> Result<Self, RulesError> {
        let rules = Self {
            language: language.into(),
            max_strength,
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.language.trim().is_empty() {
            return Err(RulesError::EmptyLanguage);
        }
        if !(2..=MAX_STRENGTH_LIMIT).contains(&self.max_strength) {
            return Err(RulesError::MaxStrength(self.max_strength));
        }
        // boards are drawn from this language's tiles
        LetterBank::new(&self.language)?;
        Ok(())
    }
}

pub fn validate_player_count(number_of_players: u8) -> ServiceResult<()> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&number_of_players) {
        Ok(())
    } else {
        Err(ServiceError::InvalidPlayerCount(number_of_players))
    }
}

/// Slot of `player_id` if the table is complete and it is their turn.
pub fn acting_slot(
    game: &Game,
    game_players: &[GamePlayer],
    player_id: PlayerId,
) -> ServiceResult<u8> {
    if game_players.len() < game.number_of_players as usize {
        return Err(ServiceError::NotYourTurn);
    }

    match game_players.get(game.current_player_order as usize) {
        Some(current) if current.player_id == player_id => Ok(game.current_player_order),
        _ => Err(ServiceError::NotYourTurn),
    }
}

/// Reads the letters under `positions`, in order.
pub fn spell_word(board_base: &[u8], positions: &[u8]) -> ServiceResult<String> {
    if positions.is_empty() {
        return Err(ServiceError::InvalidWord);
    }

    let mut seen = HashSet::with_capacity(positions.len());
    if !positions.iter().all(|position| seen.insert(*position)) {
        return Err(ServiceError::InvalidWord);
    }

    positions
        .iter()
        .map(|&position| letter_at(board_base, position).ok_or(ServiceError::InvalidWord))
        .collect()
}

pub fn next_turn(current: u8, joined: usize) -> u8 {
    ((current as usize + 1) % joined) as u8
}

/// Claims every position for `slot`, advances the turn pointer and ends the
/// game once the board is filled.
pub fn apply_word(game: &mut Game, positions: &[u8], slot: u8, joined: usize, max_strength: u8) {
    let space = positioning_space(joined);

    for &position in positions {
        let cell = &mut game.board_positioning[position as usize];
        *cell = encode_cell(*cell, space, slot, max_strength);
    }

    game.current_player_order = next_turn(game.current_player_order, joined);

    if is_board_filled(&game.board_positioning) {
        game.state = GameState::End;
    }
}
