//! Search algorithms: threat scanning and Monte-Carlo tree search

pub mod mcts;
pub mod scanner;

pub use mcts::MctsSearch;
pub use scanner::{scan_from_move, scan_full_board, ThreatReport};
