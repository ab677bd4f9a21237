#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod coords;
pub mod game;
pub mod rng;
pub mod types;

pub use board::{Board, LayoutMode, PlayerMode};
pub use game::{Game, GameAction, GameConfig, GameState, PlayerId};
pub use rng::GameRng;
pub use types::{Color, Resource};
