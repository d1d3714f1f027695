mod board;

pub use board::{Board, TableSnapshot};
