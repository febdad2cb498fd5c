//! Alpha-beta search with iterative deepening.
//!
//! Core techniques: principal variation search with a transposition table,
//! killer moves and a history heuristic for quiet move ordering, MVV-LVA
//! plus static exchange evaluation for captures, null-move pruning guarded
//! against zugzwang, reverse futility pruning, late move reductions, and a
//! quiescence search with delta and SEE pruning. Lazy SMP and extra
//! continuation/capture history tables are left out; this is a
//! single-threaded core, matched to the single-engine-process framing
//! this engine runs under.

mod constants;
mod engine;
mod params;
mod tables;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::tt::TranspositionTable;

use super::{Board, Move, MAX_PLY};
pub use params::SearchParams;
use tables::SearchTables;

/// Result of a search: the chosen move plus, when requested, the reply the
/// transposition table expects from the opponent (for pondering).
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
}

/// Default transposition table size in MB.
pub const DEFAULT_TT_MB: usize = 256;

pub(crate) const MATE_SCORE: i32 = constants::MATE_THRESHOLD + MAX_PLY as i32;

/// Statistics accumulated over the course of a search.
#[derive(Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub seldepth: u32,
    pub total_nodes: u64,
    pub tt_hits: u64,
}

impl SearchStats {
    pub fn reset_search(&mut self) {
        *self = SearchStats::default();
    }

    pub fn reset_iteration(&mut self) {
        self.nodes = 0;
        self.seldepth = 0;
    }
}

/// State persisted across searches within a game: the transposition table,
/// killer/history tables, and tuning parameters.
pub struct SearchState {
    pub stats: SearchStats,
    pub(crate) tables: SearchTables,
    pub generation: u16,
    pub params: SearchParams,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState {
            stats: SearchStats::default(),
            tables: SearchTables::new(tt_mb),
            generation: 0,
            params: SearchParams::default(),
        }
    }

    /// Reset per-search bookkeeping before a new `go` command: bump the TT
    /// generation, clear killers, and decay (not clear) history so move
    /// ordering keeps some memory across moves within the same game.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.stats.reset_search();
        self.tables.clear_killers();
    }

    pub fn reset_tables(&mut self, tt_mb: usize) {
        self.tables.tt = TranspositionTable::new(tt_mb);
        self.tables.eval_hash.clear();
        self.stats.reset_search();
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SearchParams {
        &mut self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        self.tables.tt.hashfull_per_mille()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new(DEFAULT_TT_MB)
    }
}

/// Shared clock for a search, so a watchdog thread can extend or cut short
/// the allotted time (e.g. on `ponderhit`) without restarting the search.
pub struct SearchClock {
    start_time: Mutex<Instant>,
    soft_deadline: Mutex<Option<Instant>>,
    hard_deadline: Mutex<Option<Instant>>,
}

impl SearchClock {
    #[must_use]
    pub fn new(start_time: Instant, soft_deadline: Option<Instant>, hard_deadline: Option<Instant>) -> Self {
        SearchClock {
            start_time: Mutex::new(start_time),
            soft_deadline: Mutex::new(soft_deadline),
            hard_deadline: Mutex::new(hard_deadline),
        }
    }

    pub fn reset(&self, start_time: Instant, soft_deadline: Option<Instant>, hard_deadline: Option<Instant>) {
        *self.start_time.lock() = start_time;
        *self.soft_deadline.lock() = soft_deadline;
        *self.hard_deadline.lock() = hard_deadline;
    }

    #[must_use]
    pub fn snapshot(&self) -> (Instant, Option<Instant>, Option<Instant>) {
        (*self.start_time.lock(), *self.soft_deadline.lock(), *self.hard_deadline.lock())
    }
}

pub struct SearchLimits {
    pub clock: Arc<SearchClock>,
    pub stop: Arc<AtomicBool>,
}

/// Per-iteration progress, reported to a USI `info` line via the callback.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub score: i32,
    pub mate_in: Option<i32>,
    pub pv: String,
    pub seldepth: u32,
    pub tt_hits: u64,
    /// 1-based rank of this PV among the `MultiPV` lines being reported.
    pub multipv: u32,
}

pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Configuration for one search invocation.
#[derive(Clone, Default)]
pub struct SearchConfig {
    pub max_depth: Option<u32>,
    pub time_limit_ms: u64,
    pub node_limit: u64,
    pub extract_ponder: bool,
    pub info_callback: Option<SearchInfoCallback>,
    /// Root moves the search is restricted to (`go searchmoves`). `None`
    /// means every legal root move is considered.
    pub root_restrict: Option<Vec<Move>>,
    /// Number of distinct root lines to report, each found by excluding the
    /// previously reported moves and researching from scratch.
    pub multi_pv: u32,
}

impl SearchConfig {
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchConfig { max_depth: Some(max_depth), extract_ponder: true, multi_pv: 1, ..Default::default() }
    }

    #[must_use]
    pub fn time(time_limit_ms: u64) -> Self {
        SearchConfig { time_limit_ms, extract_ponder: true, multi_pv: 1, ..Default::default() }
    }

    #[must_use]
    pub fn from_limits(limits: &SearchLimits) -> Self {
        let (_, soft_deadline, _) = limits.clock.snapshot();
        let time_limit_ms = soft_deadline
            .map_or(0, |d| d.saturating_duration_since(Instant::now()).as_millis() as u64);
        SearchConfig { time_limit_ms, extract_ponder: true, multi_pv: 1, ..Default::default() }
    }

    #[must_use]
    pub fn with_ponder(mut self, extract_ponder: bool) -> Self {
        self.extract_ponder = extract_ponder;
        self
    }

    #[must_use]
    pub fn with_nodes(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }

    #[must_use]
    pub fn with_info_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }

    #[must_use]
    pub fn with_root_restrict(mut self, moves: Vec<Move>) -> Self {
        self.root_restrict = Some(moves);
        self
    }

    #[must_use]
    pub fn with_multi_pv(mut self, multi_pv: u32) -> Self {
        self.multi_pv = multi_pv.max(1);
        self
    }
}

fn extract_ponder_move(board: &mut Board, state: &mut SearchState, best_move: Move) -> Option<Move> {
    let undo = board.make_move(best_move);
    let mut run = engine::SearchRun {
        board,
        state,
        stop: &AtomicBool::new(false),
        start_time: Instant::now(),
        time_limit_ms: 0,
        node_limit: 0,
        nodes: 0,
        root_restrict: None,
    };
    let ponder = run.extract_pv(1).first().copied();
    board.unmake_move(undo);
    ponder
}

/// Run a search per `config`, returning the chosen move and (optionally)
/// the expected ponder reply.
///
/// When `config.multi_pv` is greater than one, the root line is searched
/// `multi_pv` times: each pass excludes the moves already reported and
/// researches from scratch, so each pass's `SearchIterationInfo` carries a
/// distinct, increasing `multipv` rank. The returned `best_move` is always
/// the first (best) line's choice.
pub fn search(board: &mut Board, state: &mut SearchState, config: SearchConfig, stop: &AtomicBool) -> SearchResult {
    let max_depth = config.max_depth.unwrap_or(64);
    let multi_pv = config.multi_pv.max(1);

    let best_move = if multi_pv <= 1 {
        engine::iterative_deepening(
            board,
            state,
            max_depth,
            config.time_limit_ms,
            config.node_limit,
            stop,
            config.info_callback.clone(),
            config.root_restrict.as_deref(),
            1,
        )
    } else {
        let mut excluded: Vec<Move> = Vec::new();
        let mut first_move = None;

        for pv_rank in 1..=multi_pv {
            let candidates: Vec<Move> = match &config.root_restrict {
                Some(allowed) => allowed.iter().copied().filter(|mv| !excluded.contains(mv)).collect(),
                None => board.generate_moves().iter().copied().filter(|mv| !excluded.contains(mv)).collect(),
            };
            if candidates.is_empty() {
                break;
            }

            let Some(mv) = engine::iterative_deepening(
                board,
                state,
                max_depth,
                config.time_limit_ms,
                config.node_limit,
                stop,
                config.info_callback.clone(),
                Some(candidates.as_slice()),
                pv_rank,
            ) else {
                break;
            };

            if pv_rank == 1 {
                first_move = Some(mv);
            }
            excluded.push(mv);

            if stop.load(std::sync::atomic::Ordering::Relaxed) {
                break;
            }
        }

        first_move
    };

    let ponder_move = if config.extract_ponder {
        best_move.and_then(|mv| extract_ponder_move(board, state, mv))
    } else {
        None
    };

    SearchResult { best_move, ponder_move }
}

/// Find the best move at a fixed depth, ignoring time.
pub fn find_best_move(board: &mut Board, state: &mut SearchState, max_depth: u32, stop: &AtomicBool) -> Option<Move> {
    search(board, state, SearchConfig::depth(max_depth).with_ponder(false), stop).best_move
}

/// Find the best move at a fixed depth, also returning a ponder move.
pub fn find_best_move_with_ponder(board: &mut Board, state: &mut SearchState, max_depth: u32, stop: &AtomicBool) -> SearchResult {
    search(board, state, SearchConfig::depth(max_depth), stop)
}

/// Find the best move within a time budget.
pub fn find_best_move_with_time(board: &mut Board, state: &mut SearchState, limits: &SearchLimits) -> Option<Move> {
    let config = SearchConfig::from_limits(limits).with_ponder(false);
    search(board, state, config, &limits.stop).best_move
}

/// Find the best move within a time budget, also returning a ponder move.
pub fn find_best_move_with_time_and_ponder(board: &mut Board, state: &mut SearchState, limits: &SearchLimits) -> SearchResult {
    let config = SearchConfig::from_limits(limits);
    search(board, state, config, &limits.stop)
}
