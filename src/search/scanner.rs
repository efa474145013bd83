//! Line scanning for forcing moves
//!
//! The scanner combines the static threat tables with live board state:
//! it walks lines, looks up each empty cell in the tables using the
//! scanning side's own occupancy mask, discards candidates the opponent
//! has spoiled, and reports the strongest severity found together with
//! every cell achieving it.
//!
//! Two modes: an anchored scan over the four lines through one cell
//! (cheap, used once a reference move exists) and an exhaustive scan
//! over all 88 lines (search root, or no anchor at this depth).

use smallvec::SmallVec;

use crate::board::{Board, Side};
use crate::tables::{Geometry, LineFamily, Tables, ThreatLevel};

/// Strongest severity found by a scan plus the cells achieving it.
#[derive(Debug, Clone)]
pub struct ThreatReport {
    pub level: ThreatLevel,
    pub moves: SmallVec<[u16; 16]>,
}

impl ThreatReport {
    fn none() -> Self {
        Self {
            level: ThreatLevel::None,
            moves: SmallVec::new(),
        }
    }
}

/// De-duplicated candidate cells, bucketed by severity.
///
/// A cell sits on up to four scanned lines, so the same candidate can
/// classify more than once; each bucket keeps one copy.
struct Buckets {
    moves: [SmallVec<[u16; 32]>; 4],
    best: ThreatLevel,
}

impl Buckets {
    fn new() -> Self {
        Self {
            moves: [
                SmallVec::new(),
                SmallVec::new(),
                SmallVec::new(),
                SmallVec::new(),
            ],
            best: ThreatLevel::None,
        }
    }

    fn add(&mut self, level: ThreatLevel, idx: u16) {
        if level == ThreatLevel::None {
            return;
        }
        let bucket = &mut self.moves[level as usize - 1];
        if !bucket.contains(&idx) {
            bucket.push(idx);
            self.best = self.best.max(level);
        }
    }

    fn into_report(self) -> ThreatReport {
        if self.best == ThreatLevel::None {
            return ThreatReport::none();
        }
        let bucket = self.best as usize - 1;
        let mut moves = SmallVec::new();
        moves.extend_from_slice(&self.moves[bucket]);
        ThreatReport {
            level: self.best,
            moves,
        }
    }
}

/// Whether the opponent spoils the shape matched at `p`.
///
/// Within the 9-cell window around the candidate, clipped to the line,
/// any cell the scanning side's pattern leaves empty must not hold an
/// opponent stone; the tables treat those cells as open.
fn opponent_blocks(own: u16, opp: u16, p: usize, line_len: usize) -> bool {
    let start = p.saturating_sub(4);
    let end = (p + 4).min(line_len - 1);
    for i in start..=end {
        if (own >> i) & 1 == 0 && (opp >> i) & 1 == 1 {
            return true;
        }
    }
    false
}

/// Classify every empty cell of one line into the buckets.
fn scan_line(
    board: &Board,
    tables: &Tables,
    family: LineFamily,
    line: usize,
    side: Side,
    own_turn: bool,
    buckets: &mut Buckets,
) {
    let own = board.line_mask(side, family, line);
    let opp = board.line_mask(side.opponent(), family, line);
    let combined = own | opp;
    let len = Geometry::line_len(family, line);

    for p in 0..len {
        if (combined >> p) & 1 == 1 {
            continue;
        }

        let t = tables.threats.threat_at(own, p);
        let w = tables.threats.winning_at(own, p);
        let mut level = t.max(w);
        if level == ThreatLevel::None {
            continue;
        }
        if opponent_blocks(own, opp, p, len) {
            continue;
        }
        if !own_turn {
            level = level.as_defense();
        }

        buckets.add(level, Geometry::line_cell(family, line, p) as u16);
    }
}

/// Anchored scan: the four lines through `anchor`.
///
/// `own_turn` selects the perspective: `true` reports `side`'s own
/// forcing moves at full severity, `false` reports them down-shifted as
/// defensive urgencies for the other side.
pub fn scan_from_move(
    board: &Board,
    tables: &Tables,
    anchor: usize,
    side: Side,
    own_turn: bool,
) -> ThreatReport {
    let mut buckets = Buckets::new();
    for (family, line) in tables.geometry.lines_through(anchor) {
        scan_line(board, tables, family, line, side, own_turn, &mut buckets);
    }
    buckets.into_report()
}

/// Exhaustive scan over every row, column and diagonal.
pub fn scan_full_board(
    board: &Board,
    tables: &Tables,
    side: Side,
    own_turn: bool,
) -> ThreatReport {
    let mut buckets = Buckets::new();
    for family in [
        LineFamily::Row,
        LineFamily::Col,
        LineFamily::Diag,
        LineFamily::Anti,
    ] {
        for line in 0..Geometry::line_count(family) {
            scan_line(board, tables, family, line, side, own_turn, &mut buckets);
        }
    }
    buckets.into_report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn setup(moves: &[(u8, u8)]) -> (Board, Tables) {
        let tables = Tables::new();
        let mut board = Board::new();
        for &(r, c) in moves {
            board.apply_move(Pos::new(r, c).to_index(), &tables);
        }
        (board, tables)
    }

    fn cells(report: &ThreatReport) -> Vec<usize> {
        let mut v: Vec<usize> = report.moves.iter().map(|&m| m as usize).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_anchored_scan_finds_own_completion() {
        // Black: four in a row at (7,5)..(7,8); White scattered on row 0
        let (board, tables) = setup(&[(7, 5), (0, 0), (7, 6), (0, 2), (7, 7), (0, 4), (7, 8)]);
        let anchor = Pos::new(7, 8).to_index();
        let report = scan_from_move(&board, &tables, anchor, Side::Black, true);
        assert_eq!(report.level, ThreatLevel::Five);
        assert_eq!(
            cells(&report),
            vec![Pos::new(7, 4).to_index(), Pos::new(7, 9).to_index()]
        );
    }

    #[test]
    fn test_enemy_four_reported_as_defense() {
        let (board, tables) = setup(&[(7, 5), (0, 0), (7, 6), (0, 2), (7, 7), (0, 4), (7, 8)]);
        let anchor = Pos::new(7, 8).to_index();
        // Scanning Black's shapes on behalf of White down-shifts a class
        let report = scan_from_move(&board, &tables, anchor, Side::Black, false);
        assert_eq!(report.level, ThreatLevel::BlockFour);
        assert_eq!(
            cells(&report),
            vec![Pos::new(7, 4).to_index(), Pos::new(7, 9).to_index()]
        );
    }

    #[test]
    fn test_full_board_scan_matches_anchored() {
        let (board, tables) = setup(&[(7, 5), (0, 0), (7, 6), (0, 2), (7, 7), (0, 4), (7, 8)]);
        let anchored = scan_from_move(
            &board,
            &tables,
            Pos::new(7, 8).to_index(),
            Side::Black,
            true,
        );
        let full = scan_full_board(&board, &tables, Side::Black, true);
        assert_eq!(full.level, anchored.level);
        assert_eq!(cells(&full), cells(&anchored));
    }

    #[test]
    fn test_vertical_live_three() {
        // Black: three in a column with both flanks open
        let (board, tables) = setup(&[(5, 3), (0, 14), (6, 3), (1, 14), (7, 3)]);
        let report = scan_full_board(&board, &tables, Side::Black, true);
        assert_eq!(report.level, ThreatLevel::LiveThree);
        assert_eq!(
            cells(&report),
            vec![Pos::new(4, 3).to_index(), Pos::new(8, 3).to_index()]
        );
    }

    #[test]
    fn test_opponent_stone_voids_broken_three() {
        // Black broken three .X.XX. on row 7 (X at 3, gap 4, XX at 5-6),
        // with a White stone on the trailing flank at (7,7)
        let (board, tables) = setup(&[(7, 3), (7, 7), (7, 5), (0, 0), (7, 6)]);
        let report = scan_full_board(&board, &tables, Side::Black, true);
        let gap = Pos::new(7, 4).to_index();
        assert!(
            !report.moves.contains(&(gap as u16)) || report.level < ThreatLevel::LiveThree,
            "spoiled gap must not be reported as a live three"
        );
        // The same shape with the flank open is reported at the gap
        let (clean, tables) = setup(&[(7, 3), (0, 0), (7, 5), (0, 2), (7, 6)]);
        let report = scan_full_board(&clean, &tables, Side::Black, true);
        assert_eq!(report.level, ThreatLevel::LiveThree);
        assert!(cells(&report).contains(&gap));
    }

    #[test]
    fn test_far_opponent_stone_does_not_block() {
        // White stone five cells past the candidate window
        let (board, tables) = setup(&[(7, 3), (7, 9), (7, 5), (0, 0), (7, 6)]);
        let report = scan_full_board(&board, &tables, Side::Black, true);
        assert_eq!(report.level, ThreatLevel::LiveThree);
        assert!(cells(&report).contains(&Pos::new(7, 4).to_index()));
    }

    #[test]
    fn test_quiet_board_reports_nothing() {
        let (board, tables) = setup(&[(7, 7), (8, 8)]);
        let report = scan_full_board(&board, &tables, Side::Black, true);
        assert_eq!(report.level, ThreatLevel::None);
        assert!(report.moves.is_empty());
    }

    #[test]
    fn test_diagonal_completion() {
        // Black four on the down diagonal
        let (board, tables) = setup(&[(4, 4), (0, 1), (5, 5), (0, 3), (6, 6), (0, 5), (7, 7)]);
        let report = scan_from_move(
            &board,
            &tables,
            Pos::new(7, 7).to_index(),
            Side::Black,
            true,
        );
        assert_eq!(report.level, ThreatLevel::Five);
        assert_eq!(
            cells(&report),
            vec![Pos::new(3, 3).to_index(), Pos::new(8, 8).to_index()]
        );
    }
}
