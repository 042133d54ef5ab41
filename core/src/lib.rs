pub use catalog::*;
pub use engine::*;
pub use error::*;
pub use types::*;

pub mod connect_four;
pub mod flappy;
pub mod memory;
pub mod minesweeper;
pub mod pac_man;
pub mod pong;
pub mod snake;
pub mod tetris;
pub mod tic_tac_toe;
pub mod wordle;

mod catalog;
mod engine;
mod error;
mod types;
