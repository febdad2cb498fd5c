//! Runtime-reachable benchmark harness: times the search driver over a
//! fixed list of positions, the `bench`/`benchmark` USI command and CLI
//! flag's counterpart to the criterion harness in `benches/`.
//!
//! A position whose SFEN fails to parse is logged and skipped rather than
//! aborting the run; the harness always finishes and reports whatever it
//! managed to search.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::board::{find_best_move, Board, SearchState, DEFAULT_TT_MB};

/// Default fixed search depth when the caller doesn't name one.
pub const DEFAULT_DEPTH: u32 = 6;

/// Built-in positions: the start position plus a midgame, a tactical
/// quiescence-heavy position, and a hand-heavy endgame, mirroring the fixed
/// set the criterion benchmarks in `benches/engine_benchmarks.rs` use.
const BENCH_POSITIONS: &[(&str, &str)] = &[
    ("startpos", "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1"),
    ("midgame", "lnsgk1snl/1r4gb1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B3G1R1/LNSGK1SNL b Pp 1"),
    ("tactical", "4k4/9/9/9/p8/9/9/9/R3K4 b - 1"),
    ("hand_heavy", "4k4/9/9/9/9/9/9/9/4K4 b RBGSNLP 1"),
];

/// Timing for one benchmark position.
pub struct BenchPositionResult {
    pub name: &'static str,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub nps: u64,
}

/// Aggregate result of a full benchmark run.
pub struct BenchmarkSummary {
    pub depth: u32,
    pub positions: Vec<BenchPositionResult>,
    pub total_nodes: u64,
    pub total_elapsed_ms: u64,
}

impl BenchmarkSummary {
    #[must_use]
    pub fn total_nps(&self) -> u64 {
        if self.total_elapsed_ms == 0 {
            self.total_nodes
        } else {
            self.total_nodes * 1000 / self.total_elapsed_ms
        }
    }
}

/// Run the built-in suite to `depth`, with a fresh transposition table for
/// each position so every search starts cold.
#[must_use]
pub fn run(depth: u32) -> BenchmarkSummary {
    let stop = AtomicBool::new(false);
    let mut positions = Vec::with_capacity(BENCH_POSITIONS.len());
    let mut total_nodes = 0u64;
    let mut total_elapsed_ms = 0u64;

    for &(name, sfen) in BENCH_POSITIONS {
        let mut board = match Board::try_from_sfen(sfen) {
            Ok(board) => board,
            Err(e) => {
                eprintln!("info string benchmark position {name} failed to parse: {e}");
                continue;
            }
        };
        let mut state = SearchState::new(DEFAULT_TT_MB);

        let start = Instant::now();
        find_best_move(&mut board, &mut state, depth, &stop);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let nodes = state.stats.total_nodes;
        let nps = if elapsed_ms == 0 { nodes } else { nodes * 1000 / elapsed_ms };

        total_nodes += nodes;
        total_elapsed_ms += elapsed_ms;
        positions.push(BenchPositionResult { name, nodes, elapsed_ms, nps });
    }

    BenchmarkSummary { depth, positions, total_nodes, total_elapsed_ms }
}

/// Print a human-readable summary to stdout, in USI `info string` lines so
/// the output stays well-formed when piped through a GUI.
pub fn print_summary(summary: &BenchmarkSummary) {
    for pos in &summary.positions {
        println!(
            "info string bench {} depth {} nodes {} time {} nps {}",
            pos.name, summary.depth, pos.nodes, pos.elapsed_ms, pos.nps
        );
    }
    println!(
        "info string bench total depth {} nodes {} time {} nps {}",
        summary.depth,
        summary.total_nodes,
        summary.total_elapsed_ms,
        summary.total_nps()
    );
}
