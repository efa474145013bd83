//! Monte-Carlo tree search over an index-addressed node arena
//!
//! The tree lives in one flat arena that is bulk-reset before every
//! top-level search; nodes link parent / first-child / next-sibling by
//! index and are never freed individually. Each simulation walks the
//! tree depth-first on a private copy of the board:
//!
//! 1. A terminal board backs its exact value straight up.
//! 2. A node's first visit runs the threat scanner. When a forcing set
//!    exists (own forcing moves, or the opponent's urgent threats if
//!    those are stronger), the node expands to exactly those children
//!    and is sealed; otherwise a single uniform random rollout decides
//!    the value and the node stays a leaf for this search.
//! 3. Later visits widen the node from the board's frontier whenever
//!    the expansion pressure `C * sqrt(ln visits)` beats the best
//!    child's UCB1 score, playing one rollout per new child.
//! 4. Sealed nodes select the UCB1-best child, unvisited children
//!    having infinite priority.
//!
//! Values are counted from Black's perspective and doubled so that a
//! draw stays on integer half-points.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Bitboard, Board, GameResult, Side};
use crate::search::scanner;
use crate::tables::{Tables, ThreatLevel};

/// UCB1 exploration constant
pub const EXPLORATION: f64 = 2.0;

/// Rollouts stop after this many random moves
pub const ROLLOUT_DEPTH: usize = 100;

/// Default node-arena capacity
pub const MAX_NODES: usize = 10_000_000;

/// Null link in the arena
const NONE: u32 = u32::MAX;

/// One search-tree node. 24 bytes; links are arena indices.
#[derive(Debug, Clone)]
struct Node {
    parent: u32,
    first_child: u32,
    next_sibling: u32,
    /// Cell played to reach this node; unused on the root
    mv: u16,
    /// Doubled win total from Black's perspective (a draw adds 1)
    wins: i32,
    visits: u32,
    fully_expanded: bool,
}

/// Monte-Carlo tree search engine.
///
/// Owns the node arena and the rollout RNG; the precomputed tables are
/// shared read-only. Single-threaded: one search call runs at a time
/// and simulations mutate only private board copies plus the arena.
pub struct MctsSearch {
    tables: Arc<Tables>,
    nodes: Vec<Node>,
    max_nodes: usize,
    exploration: f64,
    rng: StdRng,
}

/// Game value from Black's perspective
#[inline]
fn value_of(result: GameResult) -> f64 {
    match result {
        GameResult::Win(Side::Black) => 1.0,
        GameResult::Win(Side::White) => 0.0,
        GameResult::Ongoing => 0.5,
    }
}

/// UCB1 score of a child for the side choosing among the children
fn ucb(wins: i32, visits: u32, parent_visits: u32, side: Side, exploration: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    // Wins are doubled and counted for Black; flip for White
    let mut rate = wins as f64 / (2.0 * visits as f64);
    if side == Side::White {
        rate = 1.0 - rate;
    }
    rate + exploration * ((parent_visits as f64).ln() / visits as f64).sqrt()
}

impl MctsSearch {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self::with_config(tables, MAX_NODES, EXPLORATION)
    }

    pub fn with_config(tables: Arc<Tables>, max_nodes: usize, exploration: f64) -> Self {
        Self {
            tables,
            nodes: Vec::new(),
            max_nodes,
            exploration,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Make rollouts reproducible
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Nodes allocated by the last search
    #[inline]
    pub fn nodes_used(&self) -> usize {
        self.nodes.len()
    }

    /// Run `iterations` simulations from `board` and return the most
    /// visited root reply, or `None` when the position has no replies.
    ///
    /// The arena is reset on entry; nothing persists between calls.
    pub fn run(&mut self, board: &Board, iterations: u32) -> Option<usize> {
        self.nodes.clear();
        let root = self.alloc_root()?;
        let opponent_last = board.last_move();

        for _ in 0..iterations {
            let mut scratch = board.clone();
            self.simulate(root, opponent_last, None, &mut scratch);
        }

        // Robust selection: most visits, not best win rate
        let mut best_move = None;
        let mut best_visits = 0u32;
        let mut child = self.nodes[root as usize].first_child;
        while child != NONE {
            let node = &self.nodes[child as usize];
            if best_move.is_none() || node.visits > best_visits {
                best_visits = node.visits;
                best_move = Some(node.mv as usize);
            }
            child = node.next_sibling;
        }
        best_move
    }

    fn alloc_root(&mut self) -> Option<u32> {
        if self.nodes.len() >= self.max_nodes {
            return None;
        }
        self.nodes.push(Node {
            parent: NONE,
            first_child: NONE,
            next_sibling: NONE,
            mv: u16::MAX,
            wins: 0,
            visits: 0,
            fully_expanded: false,
        });
        Some((self.nodes.len() - 1) as u32)
    }

    /// Push a child in front of the parent's sibling list.
    /// Returns `None` once the arena is at capacity; the search keeps
    /// going with the children it already has.
    fn alloc_child(&mut self, parent: u32, mv: u16) -> Option<u32> {
        if self.nodes.len() >= self.max_nodes {
            return None;
        }
        let id = self.nodes.len() as u32;
        let first = self.nodes[parent as usize].first_child;
        self.nodes.push(Node {
            parent,
            first_child: NONE,
            next_sibling: first,
            mv,
            wins: 0,
            visits: 0,
            fully_expanded: false,
        });
        self.nodes[parent as usize].first_child = id;
        Some(id)
    }

    #[inline]
    fn record(&mut self, node: u32, value: f64) {
        let n = &mut self.nodes[node as usize];
        n.wins += (value * 2.0) as i32;
        n.visits += 1;
    }

    /// UCB1-best existing child for `side`, with its score
    fn best_child(&self, node: u32, side: Side) -> (u32, f64) {
        let parent_visits = self.nodes[node as usize].visits;
        let mut best = NONE;
        let mut best_score = f64::NEG_INFINITY;
        let mut child = self.nodes[node as usize].first_child;
        while child != NONE {
            let n = &self.nodes[child as usize];
            let score = ucb(n.wins, n.visits, parent_visits, side, self.exploration);
            if score > best_score {
                best_score = score;
                best = child;
            }
            child = n.next_sibling;
        }
        (best, best_score)
    }

    /// One depth-first simulation pass.
    ///
    /// `opp_anchor` and `own_anchor` carry the two most recent moves
    /// above this node for the anchored threat scans, rotating one step
    /// per ply; `None` falls back to the exhaustive scan.
    fn simulate(
        &mut self,
        node: u32,
        opp_anchor: Option<usize>,
        own_anchor: Option<usize>,
        board: &mut Board,
    ) -> f64 {
        let tables = Arc::clone(&self.tables);

        if board.is_terminal() {
            let value = value_of(board.result());
            self.record(node, value);
            return value;
        }

        let side = board.side_to_move();

        if self.nodes[node as usize].fully_expanded {
            let (child, _) = self.best_child(node, side);
            if child == NONE {
                // Sealed with no children: the arena ran dry here
                return 0.5;
            }
            let mv = self.nodes[child as usize].mv as usize;
            board.apply_move(mv, &tables);
            let value = self.simulate(child, own_anchor, Some(mv), board);
            self.record(node, value);
            return value;
        }

        if self.nodes[node as usize].visits == 0 {
            // First visit: look for forcing moves before anything random
            let own = match own_anchor {
                Some(a) => scanner::scan_from_move(board, &tables, a, side, true),
                None => scanner::scan_full_board(board, &tables, side, true),
            };
            let opp = match opp_anchor {
                Some(a) => scanner::scan_from_move(board, &tables, a, side.opponent(), false),
                None => scanner::scan_full_board(board, &tables, side.opponent(), false),
            };

            let forced = if own.level >= opp.level && own.level > ThreatLevel::None {
                Some(own)
            } else if opp.level > ThreatLevel::None {
                Some(opp)
            } else {
                None
            };

            if let Some(report) = forced {
                for &mv in report.moves.iter() {
                    if self.alloc_child(node, mv).is_none() {
                        break;
                    }
                }
                self.nodes[node as usize].fully_expanded = true;

                let child = self.nodes[node as usize].first_child;
                if child != NONE {
                    let mv = self.nodes[child as usize].mv as usize;
                    board.apply_move(mv, &tables);
                    let value = self.simulate(child, own_anchor, Some(mv), board);
                    self.record(node, value);
                    return value;
                }
                // Arena exhausted before a single child: play it out
            }

            let value = self.rollout(board.clone());
            self.record(node, value);
            return value;
        }

        // Visited but not sealed: widen when the expansion pressure
        // beats every existing child
        let visits = self.nodes[node as usize].visits;
        let pressure = self.exploration * (visits as f64).ln().sqrt();
        let (best, best_score) = self.best_child(node, side);

        if best == NONE || pressure > best_score {
            let mut tried = Bitboard::new();
            let mut child = self.nodes[node as usize].first_child;
            while child != NONE {
                tried.set(self.nodes[child as usize].mv as usize);
                child = self.nodes[child as usize].next_sibling;
            }

            let mut untried = board.frontier() & !tried;
            if let Some(mv) = untried.pop_lowest() {
                if let Some(new_child) = self.alloc_child(node, mv as u16) {
                    board.apply_move(mv, &tables);
                    let value = self.rollout(board.clone());
                    self.record(new_child, value);
                    self.record(node, value);
                    return value;
                }
            } else {
                self.nodes[node as usize].fully_expanded = true;
            }
        }

        if best != NONE {
            let mv = self.nodes[best as usize].mv as usize;
            board.apply_move(mv, &tables);
            let value = self.simulate(best, own_anchor, Some(mv), board);
            self.record(node, value);
            return value;
        }

        0.5
    }

    /// Uniform random playout from `board`, bounded by [`ROLLOUT_DEPTH`]
    fn rollout(&mut self, mut board: Board) -> f64 {
        let tables = Arc::clone(&self.tables);
        let mut depth = 0;
        while !board.is_terminal() && depth < ROLLOUT_DEPTH {
            let mut moves = board.frontier();
            let count = moves.count();
            if count == 0 {
                return 0.5;
            }
            let target = self.rng.random_range(0..count);
            let mut mv = None;
            for _ in 0..=target {
                mv = moves.pop_lowest();
            }
            match mv {
                Some(m) => board.apply_move(m, &tables),
                None => return 0.5,
            }
            depth += 1;
        }
        value_of(board.result())
    }
}
