//! Board codec: letter lookup and the packed owner/strength cell encoding.
//!
//! A positioning cell is `0` while vacant. Otherwise it packs the owning
//! slot and the strength into one integer using the positioning space
//! (`joined players + 1`) as modulus:
//!
//! ```text
//! value = (strength - 1) * space + (slot + 1)
//! ```

use game_types::BOARD_CELLS;

pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Letter shown at `position`, or `None` when the position is off the board
/// or the stored letter index is outside the alphabet.
pub fn letter_at(board_base: &[u8], position: u8) -> Option<char> {
    let position = position as usize;
    if position >= BOARD_CELLS {
        return None;
    }
    let letter = *board_base.get(position)? as usize;
    ALPHABET.as_bytes().get(letter).map(|&byte| byte as char)
}

/// Modulus used to pack a cell for a game with `joined` players.
pub fn positioning_space(joined: usize) -> u8 {
    joined as u8 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Zero-based turn slot of the owner.
    pub owner: u8,
    pub strength: u8,
}

pub fn encode(cell: Cell, positioning_space: u8) -> u8 {
    (cell.strength - 1) * positioning_space + cell.owner + 1
}

pub fn decode(value: u8, positioning_space: u8) -> Option<Cell> {
    if value == 0 {
        return None;
    }
    Some(Cell {
        owner: value % positioning_space - 1,
        strength: value / positioning_space + 1,
    })
}

/// New value of a cell after the player in `acting_slot` plays through it.
///
/// Vacant cells are claimed at strength 1, own cells are reinforced up to
/// `max_strength`, and foreign cells are weakened by one or flipped once
/// they are down to strength 1.
pub fn encode_cell(current: u8, positioning_space: u8, acting_slot: u8, max_strength: u8) -> u8 {
    let claimed = acting_slot + 1;
    if current == 0 {
        return claimed;
    }

    let owned_by = current % positioning_space;
    let strength = current / positioning_space + 1;

    if owned_by == claimed {
        if strength < max_strength {
            current + positioning_space
        } else {
            current
        }
    } else if strength > 1 {
        current - positioning_space
    } else {
        claimed
    }
}

/// True once every cell has an owner.
pub fn is_board_filled(board_positioning: &[u8]) -> bool {
    board_positioning.iter().all(|&cell| cell != 0)
}
