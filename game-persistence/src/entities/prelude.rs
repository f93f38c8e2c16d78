pub use super::games::Entity as Games;
pub use super::games_players::Entity as GamesPlayers;
pub use super::played_words::Entity as PlayedWords;
pub use super::players::Entity as Players;
