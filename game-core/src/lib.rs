pub mod board;
pub mod error;
pub mod letter_bank;
pub mod store;
pub mod turn;
pub mod word_validation;

// Re-export main components
pub use board::*;
pub use error::*;
pub use letter_bank::*;
pub use store::*;
pub use turn::*;
pub use word_validation::*;
