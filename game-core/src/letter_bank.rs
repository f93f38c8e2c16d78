use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LetterError {
    #[error("no letter tiles for language '{0}'")]
    UnknownLanguage(String),
    #[error("letter bank has {available} tiles, {requested} requested")]
    OutOfRange { requested: usize, available: usize },
}

/// Tile counts per alphabet letter, `a` through `z`.
fn distribution(language: &str) -> Option<[usize; 26]> {
    match language {
        "id-id" => Some([
            19, 4, 3, 4, 8, 5, 3, 2, 8, 1, 3, 3, 3, // a..m
            9, 3, 2, 0, 4, 3, 5, 5, 1, 1, 0, 2, 1, // n..z
        ]),
        _ => None,
    }
}

/// A bag of letter indices drawn without replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterBank(Vec<u8>);

impl LetterBank {
    /// Unshuffled bank for `language`, tiles grouped by letter.
    pub fn new(language: &str) -> Result<Self, LetterError> {
        let counts =
            distribution(language).ok_or_else(|| LetterError::UnknownLanguage(language.to_string()))?;

        let tiles = counts
            .iter()
            .enumerate()
            .flat_map(|(letter, &count)| std::iter::repeat(letter as u8).take(count))
            .collect();

        Ok(Self(tiles))
    }

    pub fn from_tiles(tiles: Vec<u8>) -> Self {
        Self(tiles)
    }

    pub fn shuffle(&mut self) {
        self.0.shuffle(&mut rand::thread_rng());
    }

    /// Removes `n` tiles from the front of the bank.
    pub fn pop(&mut self, n: usize) -> Result<Vec<u8>, LetterError> {
        if self.0.len() < n {
            return Err(LetterError::OutOfRange {
                requested: n,
                available: self.0.len(),
            });
        }
        Ok(self.0.drain(..n).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tiles(&self) -> &[u8] {
        &self.0
    }
}

/// Draws `cells` letters from a freshly shuffled bank.
pub fn random_board(language: &str, cells: usize) -> Result<Vec<u8>, LetterError> {
    let mut bank = LetterBank::new(language)?;
    bank.shuffle();
    bank.pop(cells)
}
