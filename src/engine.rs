//! Main engine integrating the search components
//!
//! Thin orchestration over the tree search: the opening move and
//! forced single replies are answered directly, everything else goes
//! through the Monte-Carlo search, and callers can ask for timing and
//! arena statistics alongside the chosen move.
//!
//! # Example
//!
//! ```
//! use gomoku::{Board, MctsEngine, Tables};
//! use std::sync::Arc;
//!
//! let tables = Arc::new(Tables::new());
//! let mut engine = MctsEngine::new(Arc::clone(&tables));
//! engine.set_seed(42);
//!
//! let mut board = Board::new();
//! // Opening move is answered from the book: the center cell
//! let first = engine.get_move(&board, 100).unwrap();
//! board.apply_move(first, &tables);
//! assert_eq!(first, gomoku::CENTER);
//! ```

use std::sync::Arc;
use std::time::Instant;

use crate::board::{Board, CENTER};
use crate::search::mcts::{MctsSearch, EXPLORATION, MAX_NODES};
use crate::tables::Tables;

/// Which phase of the engine produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// First move of the game, played from the book (center)
    Opening,
    /// Exactly one playable cell, returned without searching
    OnlyMove,
    /// Monte-Carlo tree search result
    Tree,
}

/// Result of a move search with statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Best move found, if any
    pub best_move: Option<usize>,
    /// Phase that produced the move
    pub search_type: SearchType,
    /// Time taken in milliseconds
    pub time_ms: u64,
    /// Simulations run (zero for book and forced replies)
    pub simulations: u32,
    /// Arena nodes allocated by the search
    pub nodes: usize,
}

/// Monte-Carlo engine for Gomoku.
///
/// Holds the shared precomputed tables and the search state. One
/// instance serves a whole game; the search tree itself is rebuilt from
/// scratch on every call.
pub struct MctsEngine {
    search: MctsSearch,
}

impl MctsEngine {
    /// Engine with the default arena capacity and exploration constant.
    #[must_use]
    pub fn new(tables: Arc<Tables>) -> Self {
        Self::with_config(tables, MAX_NODES, EXPLORATION)
    }

    /// Engine with a custom node-arena capacity and UCB1 exploration
    /// constant.
    #[must_use]
    pub fn with_config(tables: Arc<Tables>, max_nodes: usize, exploration: f64) -> Self {
        Self {
            search: MctsSearch::with_config(tables, max_nodes, exploration),
        }
    }

    /// Seed the rollout RNG for reproducible searches.
    pub fn set_seed(&mut self, seed: u64) {
        self.search.set_seed(seed);
    }

    /// Get the best move for the side to move, or `None` when the
    /// position has no playable cell.
    ///
    /// The caller guarantees the position is not terminal.
    #[must_use]
    pub fn get_move(&mut self, board: &Board, iterations: u32) -> Option<usize> {
        self.get_move_with_stats(board, iterations).best_move
    }

    /// Get the best move together with search statistics.
    #[must_use]
    pub fn get_move_with_stats(&mut self, board: &Board, iterations: u32) -> MoveResult {
        let start = Instant::now();

        // Book opening: always the center
        if board.move_count() == 0 {
            return MoveResult {
                best_move: Some(CENTER),
                search_type: SearchType::Opening,
                time_ms: start.elapsed().as_millis() as u64,
                simulations: 0,
                nodes: 0,
            };
        }

        // A single playable cell needs no tree
        let mut frontier = board.frontier();
        if frontier.count() == 1 {
            return MoveResult {
                best_move: frontier.pop_lowest(),
                search_type: SearchType::OnlyMove,
                time_ms: start.elapsed().as_millis() as u64,
                simulations: 0,
                nodes: 0,
            };
        }

        let best_move = self.search.run(board, iterations);
        MoveResult {
            best_move,
            search_type: SearchType::Tree,
            time_ms: start.elapsed().as_millis() as u64,
            simulations: iterations,
            nodes: self.search.nodes_used(),
        }
    }
}
