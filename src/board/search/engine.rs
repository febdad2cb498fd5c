//! Alpha-beta search: iterative deepening driver, the negamax core, and
//! quiescence search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::tt::BoundType;

use super::super::{Board, Move, MoveList, ScoredMoveList, EMPTY_MOVE, MAX_PLY};
use super::constants::{
    LMR_SCORE_THRESHOLD, LMR_TABLE_MAX_DEPTH, LMR_TABLE_MAX_IDX, MATE_THRESHOLD,
    MAX_QSEARCH_DEPTH, SCORE_INFINITE,
};
use super::{SearchInfoCallback, SearchIterationInfo, SearchState, MATE_SCORE};

pub struct SearchRun<'a> {
    pub board: &'a mut Board,
    pub state: &'a mut SearchState,
    pub stop: &'a AtomicBool,
    pub start_time: Instant,
    pub time_limit_ms: u64,
    pub node_limit: u64,
    pub nodes: u64,
    /// Root moves this run is restricted to (`go searchmoves`, or a MultiPV
    /// pass excluding already-reported moves). `None` allows every legal
    /// root move; has no effect below the root.
    pub root_restrict: Option<&'a [Move]>,
}

fn lmr_table() -> &'static [[u32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH] {
    use std::sync::OnceLock;
    static TABLE: OnceLock<[[u32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0u32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
        for (depth, row) in table.iter_mut().enumerate().skip(1) {
            for (idx, cell) in row.iter_mut().enumerate().skip(1) {
                let reduction = (0.5 + (depth as f64).ln() * (idx as f64).ln() / 2.3).floor();
                *cell = reduction.max(0.0) as u32;
            }
        }
        table
    })
}

impl SearchRun<'_> {
    #[inline]
    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if self.node_limit > 0 && self.nodes >= self.node_limit {
            return true;
        }
        if self.time_limit_ms > 0 && self.nodes.trailing_zeros() >= 10 {
            let elapsed = self.start_time.elapsed().as_millis() as u64;
            if elapsed >= self.time_limit_ms {
                return true;
            }
        }
        false
    }

    /// Static evaluation of the current position, cached by position hash
    /// across quiescence nodes so a transposed leaf doesn't re-run the NNUE
    /// forward pass.
    #[inline]
    fn evaluate_cached(&mut self) -> i32 {
        let hash = self.board.hash();
        if let Some(score) = self.state.tables.eval_hash.probe(hash) {
            return score;
        }
        let score = self.board.evaluate();
        self.state.tables.eval_hash.store(hash, score);
        score
    }

    fn order_moves(&self, moves: &MoveList, tt_move: Move, ply: usize) -> ScoredMoveList {
        let mut scored = ScoredMoveList::new();
        for mv in moves.iter() {
            let score = self.state.tables.score_move(self.board, *mv, tt_move, ply);
            scored.push(*mv, score);
        }
        scored
    }

    fn lmr_reduction(
        move_idx: usize,
        move_score: i32,
        depth: u32,
        is_pv: bool,
        is_quiet: bool,
        in_check: bool,
        gives_check: bool,
        params_min_depth: u32,
        params_min_move: usize,
    ) -> u32 {
        if !is_quiet
            || in_check
            || gives_check
            || depth < params_min_depth
            || move_idx < params_min_move
            || move_score >= LMR_SCORE_THRESHOLD
        {
            return 0;
        }
        let table = lmr_table();
        let depth_idx = (depth as usize).min(LMR_TABLE_MAX_DEPTH - 1);
        let idx_idx = move_idx.min(LMR_TABLE_MAX_IDX - 1);
        let mut reduction = table[depth_idx][idx_idx];
        if is_pv {
            reduction = reduction.saturating_sub(1);
        }
        reduction.min(depth.saturating_sub(1))
    }

    /// Negamax alpha-beta search over `depth` plies from `ply`, returning a
    /// score from the side-to-move's perspective.
    pub fn alphabeta(&mut self, depth: u32, mut alpha: i32, mut beta: i32, ply: usize, allow_null: bool) -> i32 {
        let is_root = ply == 0;
        let is_pv = beta > alpha + 1;

        if !is_root && self.board.is_repetition_draw() {
            return 0;
        }

        if depth == 0 {
            return self.quiesce(alpha, beta, ply, 0);
        }

        self.nodes += 1;
        let ply_depth = ply as u32 + 1;
        if ply_depth > self.state.stats.seldepth {
            self.state.stats.seldepth = ply_depth;
        }

        if self.should_stop() {
            return 0;
        }

        if !is_root {
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        let hash = self.board.hash();
        let mut tt_move = EMPTY_MOVE;
        if let Some(entry) = self.state.tables.tt.probe(hash) {
            tt_move = entry.best_move().unwrap_or(EMPTY_MOVE);
            if entry.depth() >= depth {
                let score = entry.score();
                let cutoff = match entry.bound_type() {
                    BoundType::Exact => !is_pv || (score > alpha && score < beta),
                    BoundType::LowerBound => score >= beta,
                    BoundType::UpperBound => score <= alpha,
                };
                if cutoff {
                    self.state.stats.tt_hits = self.state.stats.tt_hits.saturating_add(1);
                    return score;
                }
            }
        }

        let in_check = self.board.is_in_check(self.board.side_to_move());
        let moves = self.board.generate_moves();
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { 0 };
        }

        let eval = if in_check {
            -SCORE_INFINITE
        } else {
            self.board.evaluate_simple()
        };

        // Node-level pruning for non-PV, non-check nodes.
        if !is_pv && !in_check {
            let params = self.state.params.clone();

            // Reverse futility pruning: if static eval already clears beta by
            // a wide, depth-scaled margin, assume search would confirm it.
            if depth <= 6 && eval - params.rfp_margin * depth as i32 >= beta && beta.abs() < MATE_THRESHOLD {
                return eval;
            }

            // Null move pruning: skip our move and see if the opponent is
            // still in trouble, guarded against zugzwang by requiring some
            // non-pawn material left for the side to move.
            if allow_null
                && depth >= params.null_min_depth
                && beta.abs() < MATE_THRESHOLD
                && self.board.has_non_pawn_material(self.board.side_to_move())
            {
                let info = self.board.make_null_move();
                let reduction = params.null_reduction + depth / 4;
                let null_depth = depth.saturating_sub(1 + reduction);
                let score = -self.alphabeta(null_depth, -beta, -beta + 1, ply + 1, false);
                self.board.unmake_null_move(info);
                if score >= beta {
                    return score;
                }
            }
        }

        let mut scored_moves = self.order_moves(&moves, tt_move, ply);
        scored_moves.sort_by_score_desc();

        let mut best_score = -SCORE_INFINITE;
        let mut best_move = EMPTY_MOVE;
        let mut alpha_raised = false;
        let mut quiets_tried: Vec<Move> = Vec::with_capacity(moves.len());

        for (i, scored) in scored_moves.iter().enumerate() {
            let mv = scored.mv;
            if self.should_stop() {
                break;
            }

            if is_root {
                if let Some(restrict) = self.root_restrict {
                    if !restrict.contains(&mv) {
                        continue;
                    }
                }
            }

            let is_quiet = mv.captured().is_none() && !mv.is_promotion();

            let undo = self.board.make_move(mv);
            let gives_check = self.board.is_in_check(self.board.side_to_move());

            let reduction = Self::lmr_reduction(
                i,
                scored.score,
                depth,
                is_pv,
                is_quiet,
                in_check,
                gives_check,
                self.state.params.lmr_min_depth,
                self.state.params.lmr_min_move,
            );
            let extension = u32::from(gives_check);
            let new_depth = (depth - 1 + extension).saturating_sub(reduction);

            let mut score = if i == 0 {
                -self.alphabeta(depth - 1 + extension, -beta, -alpha, ply + 1, true)
            } else {
                let mut s = -self.alphabeta(new_depth, -alpha - 1, -alpha, ply + 1, true);
                if reduction > 0 && s > alpha {
                    s = -self.alphabeta(depth - 1 + extension, -alpha - 1, -alpha, ply + 1, true);
                }
                if s > alpha && s < beta {
                    s = -self.alphabeta(depth - 1 + extension, -beta, -alpha, ply + 1, true);
                }
                s
            };

            self.board.unmake_move(undo);
            if self.should_stop() {
                break;
            }

            if is_quiet {
                quiets_tried.push(mv);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    alpha_raised = true;
                    if score >= beta {
                        if is_quiet {
                            self.state.tables.update_killer(ply, mv);
                            self.state.tables.update_history(self.board.side_to_move(), mv, depth);
                            for &quiet in &quiets_tried {
                                if quiet != mv {
                                    self.state.tables.penalize_history(self.board.side_to_move(), quiet, depth);
                                }
                            }
                        }
                        if !self.should_stop() {
                            self.state.tables.tt.store(
                                hash, depth, score, BoundType::LowerBound, Some(mv), self.state.generation,
                            );
                        }
                        return score;
                    }
                }
            }
            let _ = score;
        }

        if !self.should_stop() {
            let bound = if alpha_raised { BoundType::Exact } else { BoundType::UpperBound };
            self.state.tables.tt.store(hash, depth, best_score, bound, Some(best_move), self.state.generation);
        }

        best_score
    }

    /// Quiescence search: resolve captures and promotions until the
    /// position is quiet, with a stand-pat baseline and SEE/delta pruning
    /// to skip captures that cannot possibly help.
    fn quiesce(&mut self, mut alpha: i32, beta: i32, ply: usize, qdepth: i32) -> i32 {
        self.nodes += 1;
        if self.should_stop() {
            return 0;
        }

        let in_check = self.board.is_in_check(self.board.side_to_move());
        let stand_pat = if in_check { -SCORE_INFINITE } else { self.evaluate_cached() };

        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
        }

        if qdepth >= MAX_QSEARCH_DEPTH {
            return stand_pat;
        }

        let moves = if in_check { self.board.generate_moves() } else { self.board.generate_tactical_moves() };
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { stand_pat };
        }

        let mut scored = self.order_moves(&moves, EMPTY_MOVE, ply.min(MAX_PLY - 1));
        scored.sort_by_score_desc();

        let delta_margin = self.state.params.delta_margin;
        let mut best = stand_pat;

        for scored_mv in scored.iter() {
            let mv = scored_mv.mv;
            if self.should_stop() {
                break;
            }

            if !in_check {
                if let Some(captured) = mv.captured() {
                    if stand_pat + captured.value() + delta_margin < alpha {
                        continue;
                    }
                    if !self.board.see_ge(mv, 0) {
                        continue;
                    }
                }
            }

            let undo = self.board.make_move(mv);
            let score = -self.quiesce(-beta, -alpha, ply + 1, qdepth + 1);
            self.board.unmake_move(undo);

            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    if score >= beta {
                        return score;
                    }
                }
            }
        }

        best
    }

    /// Extract the principal variation by walking TT best moves, verifying
    /// each is legal before playing it (a hash collision can otherwise hand
    /// back a move that doesn't apply in this position).
    pub fn extract_pv(&mut self, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut undo_stack = Vec::with_capacity(max_len);
        let mut seen = Vec::with_capacity(max_len);

        for _ in 0..max_len {
            let hash = self.board.hash();
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);

            let Some(mv) = self.state.tables.tt.probe(hash).and_then(|e| e.best_move()) else {
                break;
            };
            if mv == EMPTY_MOVE || !self.board.is_legal_move(mv) {
                break;
            }

            pv.push(mv);
            undo_stack.push(self.board.make_move(mv));
        }

        for undo in undo_stack.into_iter().rev() {
            self.board.unmake_move(undo);
        }
        pv
    }
}

/// Iterative deepening driver: searches depth 1, 2, 3... widening an
/// aspiration window around the previous score, stopping on the time/node
/// budget or at `max_depth`. Returns the best move found.
pub fn iterative_deepening(
    board: &mut Board,
    state: &mut SearchState,
    max_depth: u32,
    time_limit_ms: u64,
    node_limit: u64,
    stop: &AtomicBool,
    info_callback: Option<SearchInfoCallback>,
    root_restrict: Option<&[Move]>,
    multipv: u32,
) -> Option<Move> {
    let start_time = Instant::now();
    state.new_search();

    let mut best_move = None;
    let mut best_score = 0;

    'iter: for depth in 1..=max_depth.max(1) {
        state.stats.reset_iteration();
        state.tables.decay_history();

        let mut window = 25;
        let (mut alpha, mut beta) = if depth <= 2 {
            (-SCORE_INFINITE, SCORE_INFINITE)
        } else {
            (best_score - window, best_score + window)
        };

        let score = loop {
            let mut run = SearchRun {
                board,
                state,
                stop,
                start_time,
                time_limit_ms,
                node_limit,
                nodes: 0,
                root_restrict,
            };
            let score = run.alphabeta(depth, alpha, beta, 0, true);
            let run_nodes = run.nodes;
            state.stats.nodes = state.stats.nodes.saturating_add(run_nodes);
            state.stats.total_nodes = state.stats.total_nodes.saturating_add(run_nodes);

            if stop.load(Ordering::Relaxed)
                || (node_limit > 0 && state.stats.total_nodes >= node_limit)
                || (time_limit_ms > 0 && start_time.elapsed().as_millis() as u64 >= time_limit_ms)
            {
                if best_move.is_none() {
                    let mut run = SearchRun {
                        board, state, stop, start_time, time_limit_ms: 0, node_limit: 0, nodes: 0, root_restrict: None,
                    };
                    best_move = run.extract_pv(1).first().copied();
                }
                break 'iter;
            }

            if score <= alpha {
                alpha = (alpha - window).max(-SCORE_INFINITE);
                window *= 2;
            } else if score >= beta {
                beta = (beta + window).min(SCORE_INFINITE);
                window *= 2;
            } else {
                break score;
            }
        };

        best_score = score;
        let mut run = SearchRun {
            board, state, stop, start_time, time_limit_ms: 0, node_limit: 0, nodes: 0, root_restrict: None,
        };
        let pv = run.extract_pv(depth as usize);
        if let Some(&mv) = pv.first() {
            best_move = Some(mv);
        }

        if let Some(callback) = &info_callback {
            let elapsed_ms = start_time.elapsed().as_millis() as u64;
            let nps = if elapsed_ms > 0 { state.stats.nodes * 1000 / elapsed_ms } else { state.stats.nodes };
            let mate_in = if score.abs() >= MATE_THRESHOLD {
                let plies = MATE_SCORE - score.abs();
                Some(if score > 0 { (plies + 1) / 2 } else { -((plies + 1) / 2) })
            } else {
                None
            };
            callback(&SearchIterationInfo {
                depth,
                nodes: state.stats.nodes,
                nps,
                time_ms: elapsed_ms,
                score,
                mate_in,
                pv: pv.iter().map(std::string::ToString::to_string).collect::<Vec<_>>().join(" "),
                seldepth: state.stats.seldepth,
                tt_hits: state.stats.tt_hits,
                multipv,
            });
        }

        if score.abs() >= MATE_THRESHOLD {
            break;
        }
    }

    best_move
}
