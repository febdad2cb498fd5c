//! Tunable search margins.

#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Depth reduction applied to the verification search after a null move.
    pub null_reduction: u32,
    /// Minimum remaining depth before null-move pruning is attempted.
    pub null_min_depth: u32,
    /// Per-depth margin for reverse futility pruning at non-PV nodes.
    pub rfp_margin: i32,
    /// Minimum remaining depth before late move reductions apply.
    pub lmr_min_depth: u32,
    /// Move index (0-based) after which late move reductions start.
    pub lmr_min_move: usize,
    /// Margin added to alpha before pruning a losing capture in quiescence.
    pub delta_margin: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            null_reduction: 2,
            null_min_depth: 3,
            rfp_margin: 120,
            lmr_min_depth: 3,
            lmr_min_move: 3,
            delta_margin: 200,
        }
    }
}
