//! Line-oriented engine shell
//!
//! Reads commands from stdin and answers on stdout, one line each:
//!
//! - `uci`            identify the engine
//! - `init`           reset the board for a new game
//! - `update <idx>`   play a stone at cell index `row * 15 + col`
//! - `go [iters]`     search and print `bestmove <idx>` (-1 if none)
//! - `d`              display the board
//! - `quit`           exit
//!
//! All legality checks live here; the engine core deliberately trusts
//! its callers.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;

use gomoku::{Board, GameResult, MctsEngine, Side, Tables, BOARD_SIZE, TOTAL_CELLS};

#[derive(Parser)]
#[command(name = "gomoku", about = "Gomoku MCTS engine shell", version)]
struct Args {
    /// Default simulation count for `go`
    #[arg(long, default_value_t = 10_000)]
    iterations: u32,

    /// Seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let tables = Arc::new(Tables::new());
    let mut board = Board::new();
    let mut engine = MctsEngine::new(Arc::clone(&tables));
    if let Some(seed) = args.seed {
        engine.set_seed(seed);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };

        match cmd {
            "uci" => {
                writeln!(out, "id name gomoku {}", env!("CARGO_PKG_VERSION"))?;
                writeln!(out, "uciok")?;
            }
            "init" => {
                board = Board::new();
                writeln!(out, "ready")?;
            }
            "update" => match words.next().map(str::parse::<usize>) {
                Some(Ok(idx)) if idx < TOTAL_CELLS => {
                    if board.is_terminal() {
                        writeln!(out, "error: game already ended")?;
                    } else if board.get(idx).is_some() {
                        writeln!(out, "error: cell occupied")?;
                    } else {
                        board.apply_move(idx, &tables);
                        writeln!(out, "ok")?;
                    }
                }
                Some(Ok(_)) | Some(Err(_)) => writeln!(out, "error: invalid move")?,
                None => writeln!(out, "error: missing index")?,
            },
            "go" => {
                let iters = words
                    .next()
                    .and_then(|w| w.parse::<u32>().ok())
                    .unwrap_or(args.iterations);
                if board.is_terminal() {
                    writeln!(out, "error: game already ended")?;
                } else {
                    let result = engine.get_move_with_stats(&board, iters);
                    match result.best_move {
                        Some(mv) => writeln!(out, "bestmove {}", mv)?,
                        None => writeln!(out, "bestmove -1")?,
                    }
                }
            }
            "d" => display_board(&mut out, &board)?,
            "quit" => break,
            other => writeln!(out, "unknown command: {}", other)?,
        }
        out.flush()?;
    }

    Ok(())
}

fn display_board(out: &mut impl Write, board: &Board) -> io::Result<()> {
    write!(out, "   ")?;
    for c in 0..BOARD_SIZE {
        write!(out, "{:2}", c)?;
    }
    writeln!(out)?;

    for r in 0..BOARD_SIZE {
        write!(out, "{:2} ", r)?;
        for c in 0..BOARD_SIZE {
            let cell = match board.get(r * BOARD_SIZE + c) {
                Some(Side::Black) => " X",
                Some(Side::White) => " O",
                None => " .",
            };
            write!(out, "{}", cell)?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "Move count: {}, {} to move",
        board.move_count(),
        match board.side_to_move() {
            Side::Black => "Black",
            Side::White => "White",
        }
    )?;
    match board.result() {
        GameResult::Win(Side::Black) => writeln!(out, "Result: Black wins")?,
        GameResult::Win(Side::White) => writeln!(out, "Result: White wins")?,
        GameResult::Ongoing => {}
    }
    Ok(())
}
