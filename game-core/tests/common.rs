#![allow(dead_code)]

use game_core::{ALPHABET, WordListDictionary};
use game_types::{BOARD_CELLS, Game, GamePlayer, GameId};
use uuid::Uuid;

/// Creates a test dictionary with a known set of words
pub fn create_test_dictionary() -> WordListDictionary {
    WordListDictionary::new("kata\nbuku\nmeja\nkursi\nabc\nfgh\nklm\npqr\nuvw\nxy")
}

/// Board whose letters follow the alphabet, row by row: `abcde`, `fghij`...
pub fn alphabet_board() -> Vec<u8> {
    (0..BOARD_CELLS).map(|cell| (cell % ALPHABET.len()) as u8).collect()
}

/// Board spelling `text` from position 0, the rest filled with `a`.
pub fn board_spelling(text: &str) -> Vec<u8> {
    let mut board = vec![0u8; BOARD_CELLS];
    for (cell, letter) in text.chars().enumerate() {
        board[cell] = ALPHABET.find(letter).expect("letter in alphabet") as u8;
    }
    board
}

/// Creates an ongoing game with every seat taken
pub fn create_seated_game(seats: u8, board_base: Vec<u8>) -> (Game, Vec<GamePlayer>) {
    let game = Game::new(Uuid::new_v4(), seats, board_base);
    let players = seat_players(game.id, seats);
    (game, players)
}

pub fn seat_players(game_id: GameId, seats: u8) -> Vec<GamePlayer> {
    (0..seats)
        .map(|ordering| GamePlayer {
            game_id,
            player_id: Uuid::new_v4(),
            ordering,
        })
        .collect()
}
