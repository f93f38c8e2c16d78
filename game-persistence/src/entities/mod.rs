pub mod prelude;

pub mod games;
pub mod games_players;
pub mod played_words;
pub mod players;
