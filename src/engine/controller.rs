//! Engine controller implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::board::{
    search, Board, Move, SearchClock, SearchConfig, SearchInfoCallback, SearchResult, SearchState,
};
use crate::board::nnue;

/// Search thread stack size (32 MB), deep alpha-beta recursion needs more
/// than the default 8 MB thread stack.
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;
const HARD_STOP_MARGIN_MS: u64 = 5;

/// Maximum sleep duration when polling time limits (avoids excessive CPU wake-ups).
const MAX_POLL_SLEEP_MS: u64 = 5;

/// Poll interval when waiting for ponder to complete.
const PONDER_POLL_MS: u64 = 10;

/// Default NNUE weight file paths tried at startup.
const DEFAULT_NNUE_PATHS: &[&str] = &["shogi.nnue", "default.nnue"];

/// Active search job state.
pub struct SearchJob {
    /// Stop flag for the search.
    pub stop: Arc<AtomicBool>,
    /// Clock for time management.
    pub clock: Arc<SearchClock>,
    /// Whether we're currently pondering.
    pub pondering: Arc<AtomicBool>,
    /// Planned soft time limit (for ponderhit).
    pub planned_soft_time_ms: u64,
    /// Planned hard time limit (for ponderhit).
    pub planned_hard_time_ms: u64,
    /// Handle to the search thread.
    handle: JoinHandle<()>,
    /// Optional handle to the timer thread enforcing hard stops.
    timer_handle: Option<JoinHandle<()>>,
}

impl SearchJob {
    /// Stop the search and wait for the thread to finish.
    pub fn stop_and_wait(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
        if let Some(timer) = self.timer_handle {
            let _ = timer.join();
        }
    }

    /// Signal stop without waiting.
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        self.pondering.store(false, Ordering::Relaxed);
    }

    /// Handle ponderhit: transition from pondering to a real search clock.
    pub fn ponderhit(&self) {
        if self.pondering.load(Ordering::Relaxed) {
            let start = Instant::now();
            let hard_deadline = start + Duration::from_millis(self.planned_hard_time_ms);
            self.clock.reset(
                start,
                Some(start + Duration::from_millis(self.planned_soft_time_ms)),
                Some(hard_deadline),
            );

            let stop_timer = Arc::clone(&self.stop);
            thread::spawn(move || {
                let now = Instant::now();
                if hard_deadline > now {
                    thread::sleep(hard_deadline - now);
                }
                stop_timer.store(true, Ordering::Relaxed);
            });

            self.pondering.store(false, Ordering::Relaxed);
        }
    }
}

/// Parameters for starting a new search.
#[derive(Default)]
pub struct SearchParams {
    /// Maximum depth to search (None = unlimited).
    pub depth: Option<u32>,
    /// Soft time limit in milliseconds.
    pub soft_time_ms: u64,
    /// Hard time limit in milliseconds.
    pub hard_time_ms: u64,
    /// Node limit (0 = unlimited).
    pub node_limit: u64,
    /// Whether to ponder (think on the opponent's time).
    pub ponder: bool,
    /// Whether to search infinitely (until `stop`).
    pub infinite: bool,
    /// Root moves to restrict the search to (`go searchmoves`). `None`
    /// considers every legal root move.
    pub root_moves: Option<Vec<Move>>,
    /// Number of root lines to report (the `MultiPV` option).
    pub multi_pv: u32,
}

/// Engine controller managing search and game state.
pub struct EngineController {
    board: Board,
    search_state: Arc<Mutex<SearchState>>,
    current_job: Option<SearchJob>,
    info_callback: Option<SearchInfoCallback>,
}

impl EngineController {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        let controller = EngineController {
            board: Board::new(),
            search_state: Arc::new(Mutex::new(SearchState::new(tt_mb))),
            current_job: None,
            info_callback: None,
        };
        controller.try_load_default_nnue();
        controller
    }

    /// Try to load the first NNUE weight file found on the default search
    /// path. Silent on failure: the engine falls back to material eval.
    fn try_load_default_nnue(&self) {
        for path in DEFAULT_NNUE_PATHS {
            if std::path::Path::new(path).exists() && nnue::try_load(path).is_ok() {
                eprintln!("info string loaded NNUE file {path}");
                return;
            }
        }
    }

    /// Load an NNUE network from an explicit path (the `EvalFile` option).
    pub fn load_nnue<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), crate::board::ResourceError> {
        nnue::try_load(path)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.stop_search();
        self.board = board;
    }

    #[must_use]
    pub fn search_state(&self) -> &Arc<Mutex<SearchState>> {
        &self.search_state
    }

    pub fn new_game(&mut self) {
        self.stop_search();
        self.board = Board::new();
        self.search_state.lock().new_search();
    }

    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    pub fn signal_stop(&mut self) {
        if let Some(job) = &self.current_job {
            job.signal_stop();
        }
    }

    pub fn ponderhit(&mut self) {
        if let Some(job) = &self.current_job {
            job.ponderhit();
        }
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job.is_some()
    }

    fn build_deadlines(params: &SearchParams, start: Instant) -> (Option<Instant>, Option<Instant>) {
        if params.infinite || params.ponder {
            return (None, None);
        }
        let soft_deadline =
            (params.soft_time_ms > 0).then(|| start + Duration::from_millis(params.soft_time_ms));
        let hard_deadline = (params.hard_time_ms > 0).then(|| {
            start + Duration::from_millis(params.hard_time_ms.saturating_sub(HARD_STOP_MARGIN_MS))
        });
        (soft_deadline, hard_deadline)
    }

    fn build_search_config(&self, params: &SearchParams) -> SearchConfig {
        let mut config = params.depth.map_or_else(SearchConfig::default, SearchConfig::depth);
        if !params.infinite && !params.ponder && params.soft_time_ms > 0 {
            config.time_limit_ms = params.soft_time_ms;
        }
        if params.node_limit > 0 {
            config = config.with_nodes(params.node_limit);
        }
        if let Some(cb) = &self.info_callback {
            config = config.with_info_callback(cb.clone());
        }
        if let Some(moves) = &params.root_moves {
            config = config.with_root_restrict(moves.clone());
        }
        if params.multi_pv > 1 {
            config = config.with_multi_pv(params.multi_pv);
        }
        config
    }

    fn spawn_hard_stop_timer(hard_deadline: Option<Instant>, stop: Arc<AtomicBool>) -> Option<JoinHandle<()>> {
        hard_deadline.map(|deadline| {
            thread::spawn(move || loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let now = Instant::now();
                if now >= deadline {
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
                let sleep_for = (deadline - now).min(Duration::from_millis(MAX_POLL_SLEEP_MS));
                thread::sleep(sleep_for);
            })
        })
    }

    /// Start a search with the given parameters. `on_complete` runs on the
    /// search thread once the result is ready.
    pub fn start_search<F>(&mut self, params: SearchParams, on_complete: F)
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.stop_search();
        self.search_state.lock().new_search();

        let stop = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        let (soft_deadline, hard_deadline) = Self::build_deadlines(&params, start);
        let clock = Arc::new(SearchClock::new(start, soft_deadline, hard_deadline));
        let pondering = Arc::new(AtomicBool::new(params.ponder));

        let timer_handle = if !params.infinite && !params.ponder && params.depth.is_none() && params.hard_time_ms > 0
        {
            Self::spawn_hard_stop_timer(hard_deadline, Arc::clone(&stop))
        } else {
            None
        };

        let config = self.build_search_config(&params);
        let mut search_board = self.board.clone();
        let search_state = Arc::clone(&self.search_state);
        let stop_clone = Arc::clone(&stop);
        let pondering_clone = Arc::clone(&pondering);

        let handle = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let mut guard = search_state.lock();
                let result: SearchResult = search(&mut search_board, &mut guard, config, &stop_clone);
                drop(guard);

                while pondering_clone.load(Ordering::Relaxed) && !stop_clone.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(PONDER_POLL_MS));
                }

                on_complete(result);
            })
            .expect("failed to spawn search thread");

        self.current_job = Some(SearchJob {
            stop,
            clock,
            pondering,
            planned_soft_time_ms: params.soft_time_ms,
            planned_hard_time_ms: params.hard_time_ms,
            handle,
            timer_handle,
        });
    }

    /// Execute a closure with mutable access to the search state.
    pub fn with_search_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SearchState) -> R,
    {
        f(&mut self.search_state.lock())
    }

    /// Execute a closure with immutable access to the search state.
    pub fn with_search_state_ref<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SearchState) -> R,
    {
        f(&self.search_state.lock())
    }

    /// Resize the transposition table.
    pub fn resize_hash(&mut self, mb: usize) {
        self.stop_search();
        self.with_search_state(|state| state.reset_tables(mb));
    }

    /// Set the callback for per-iteration search info.
    pub fn set_info_callback(&mut self, cb: Option<SearchInfoCallback>) {
        self.info_callback = cb;
    }
}
