//! Gomoku engine with threat-guided Monte-Carlo tree search
//!
//! A tactical-search engine for 15x15 five-in-a-row built on three
//! pieces:
//! - [`board`]: a packed 256-bit board with incremental win detection,
//!   per-line occupancy masks and a frontier of playable cells
//! - [`tables`]: geometry, the exhaustive five-in-a-row pattern table
//!   and the tactical threat tables, built once per process
//! - [`search`]: a line scanner that classifies forcing moves, and an
//!   arena-based MCTS that expands forcing replies before falling back
//!   to random rollouts
//!
//! The [`engine`] module ties them together behind a small move-request
//! surface.
//!
//! # Quick Start
//!
//! ```
//! use gomoku::{Board, MctsEngine, Pos, Tables};
//! use std::sync::Arc;
//!
//! let tables = Arc::new(Tables::new());
//! let mut board = Board::new();
//! let mut engine = MctsEngine::new(Arc::clone(&tables));
//! engine.set_seed(1);
//!
//! // A human opens in the center, the engine answers
//! board.apply_move(Pos::new(7, 7).to_index(), &tables);
//! if let Some(reply) = engine.get_move(&board, 200) {
//!     board.apply_move(reply, &tables);
//! }
//! assert_eq!(board.move_count(), 2);
//! ```
//!
//! # Contract
//!
//! The engine never validates moves: [`Board::apply_move`] assumes an
//! empty cell and a game still in progress, and the hosting shell owns
//! every legality check. Degenerate situations are signalled through
//! `Option` and [`GameResult`], never by panicking.

pub mod board;
pub mod engine;
pub mod search;
pub mod tables;

// Re-export commonly used types for convenience
pub use board::{Bitboard, Board, GameResult, Pos, Side, BOARD_SIZE, CENTER, TOTAL_CELLS};
pub use engine::{MctsEngine, MoveResult, SearchType};
pub use tables::{Tables, ThreatLevel};
