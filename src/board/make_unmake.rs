//! Make/unmake move: bitboard, mailbox, hand, hash, material, and NNUE
//! accumulator maintenance.

use crate::zobrist;
use crate::zobrist::ZOBRIST;

use super::nnue::NnueAccumulator;
use super::state::UnmakeInfo;
use super::{Board, Color, Piece, Square};

/// One feature-table change to apply to the NNUE accumulator for the ply
/// being entered, collected while `make_move` walks its own board/hand
/// bookkeeping so the accumulator update shares the exact same piece and
/// count values already computed for the hash and material deltas.
enum NnueDelta {
    AddBoard(Piece, Color, Square),
    RemoveBoard(Piece, Color, Square),
    AddHand(Piece, Color, u8),
    RemoveHand(Piece, Color, u8),
}

fn apply_nnue_deltas(acc: &mut NnueAccumulator, network: &super::nnue::NnueNetwork, deltas: &[NnueDelta]) {
    for delta in deltas {
        match *delta {
            NnueDelta::AddBoard(piece, color, sq) => acc.add_board_piece(network, piece, color, sq),
            NnueDelta::RemoveBoard(piece, color, sq) => acc.remove_board_piece(network, piece, color, sq),
            NnueDelta::AddHand(piece, color, count) => acc.add_hand_piece(network, piece, color, count),
            NnueDelta::RemoveHand(piece, color, count) => acc.remove_hand_piece(network, piece, color, count),
        }
    }
}

impl Board {
    /// Apply a move to the position, returning the undo record consumed by
    /// `unmake_move`. Updates bitboards, the mailbox, hands, side to move,
    /// hash, move count, material, and the repetition table with a single
    /// XOR per affected piece-square or hand-count pair.
    pub fn make_move(&mut self, mv: super::Move) -> UnmakeInfo {
        let previous_hash = self.hash;
        let previous_move_count = self.move_count;
        let previous_material = self.material;

        let mover = self.side_to_move;
        let mover_idx = mover.index();
        let opp = mover.opponent();

        let mut hash = self.hash;
        let mut captured = None;
        let mut deltas: Vec<NnueDelta> = Vec::with_capacity(4);

        if mv.is_drop() {
            let piece = mv.piece();
            self.hands[mover_idx].remove(piece);
            let count_after = self.hands[mover_idx].count(piece);
            hash ^= zobrist::hand_key(mover, piece, count_after + 1);
            self.material[mover_idx] -= piece.value();
            deltas.push(NnueDelta::RemoveHand(piece, mover, count_after + 1));
            if count_after > 0 {
                deltas.push(NnueDelta::AddHand(piece, mover, count_after));
            }

            self.set_piece(mv.to(), mover, piece);
            hash ^= zobrist::piece_key(mover, piece, mv.to());
            self.material[mover_idx] += piece.value();
            deltas.push(NnueDelta::AddBoard(piece, mover, mv.to()));
        } else {
            let from = mv.from().expect("board move has a from-square");
            let moving_piece = mv.piece();

            if let Some(cap) = mv.captured() {
                captured = Some(cap);
                self.remove_piece(mv.to());
                hash ^= zobrist::piece_key(opp, cap, mv.to());
                self.material[opp.index()] -= cap.value();
                deltas.push(NnueDelta::RemoveBoard(cap, opp, mv.to()));

                let base = cap.unpromoted();
                self.hands[mover_idx].add(base);
                let count_after = self.hands[mover_idx].count(base);
                hash ^= zobrist::hand_key(mover, base, count_after);
                self.material[mover_idx] += base.value();
                if count_after > 1 {
                    deltas.push(NnueDelta::RemoveHand(base, mover, count_after - 1));
                }
                deltas.push(NnueDelta::AddHand(base, mover, count_after));
            }

            self.remove_piece(from);
            hash ^= zobrist::piece_key(mover, moving_piece, from);
            self.material[mover_idx] -= moving_piece.value();
            deltas.push(NnueDelta::RemoveBoard(moving_piece, mover, from));

            let placed = mv.resulting_piece();
            self.set_piece(mv.to(), mover, placed);
            hash ^= zobrist::piece_key(mover, placed, mv.to());
            self.material[mover_idx] += placed.value();
            deltas.push(NnueDelta::AddBoard(placed, mover, mv.to()));
        }

        hash ^= ZOBRIST.side_to_move_key;
        self.side_to_move = opp;
        self.move_count += 1;
        self.hash = hash;
        self.push_repetition();
        self.push_nnue_accumulator(&deltas);

        UnmakeInfo {
            mv,
            captured,
            previous_hash,
            previous_move_count,
            previous_material,
        }
    }

    /// Derive the accumulator for the ply `make_move` is about to enter from
    /// the current ply's accumulator plus `deltas`, and push it onto the
    /// stack. In debug builds, also rebuilds the accumulator from scratch
    /// and asserts it matches: this is the cross-check that keeps the
    /// incremental path honest against the reference computation.
    fn push_nnue_accumulator(&mut self, deltas: &[NnueDelta]) {
        let new_acc = super::nnue::loaded_network().and_then(|network| {
            let updated = self.nnue_accumulators[self.nnue_ply].as_ref().map(|prior| {
                let mut acc = prior.clone();
                apply_nnue_deltas(&mut acc, network, deltas);
                acc
            });

            #[cfg(debug_assertions)]
            if let Some(acc) = &updated {
                let fresh = NnueAccumulator::refresh(self, network);
                debug_assert!(
                    acc.matches(&fresh),
                    "incremental NNUE accumulator diverged from a from-scratch refresh"
                );
            }

            updated
        });
        self.nnue_accumulators.push(new_acc);
        self.nnue_ply += 1;
    }

    /// Restore the position to what it was before `make_move` produced `info`,
    /// bit-exactly: `make_move` followed by `unmake_move` is the identity on
    /// hash, bitboards, hands, and side to move.
    pub fn unmake_move(&mut self, info: UnmakeInfo) {
        self.pop_repetition(self.hash);
        self.nnue_accumulators.pop();
        self.nnue_ply -= 1;

        let mv = info.mv;
        let opp = self.side_to_move;
        let mover = opp.opponent();
        let mover_idx = mover.index();

        if mv.is_drop() {
            self.remove_piece(mv.to());
            self.hands[mover_idx].add(mv.piece());
        } else {
            let from = mv.from().expect("board move has a from-square");
            self.remove_piece(mv.to());
            self.set_piece(from, mover, mv.piece());

            if let Some(cap) = info.captured {
                let base = cap.unpromoted();
                self.hands[mover_idx].remove(base);
                self.set_piece(mv.to(), opp, cap);
            }
        }

        self.side_to_move = mover;
        self.hash = info.previous_hash;
        self.move_count = info.previous_move_count;
        self.material = info.previous_material;
    }

    /// Apply a drop or board move without tracking an undo record, for
    /// callers (perft, bulk SFEN replay) that discard the resulting position.
    pub(crate) fn make_move_unchecked(&mut self, mv: super::Move) {
        let _ = self.make_move(mv);
    }

    /// Pass the turn without moving a piece, for null-move pruning. Does not
    /// touch the repetition table: a null-move position is a search
    /// fiction, never a position either side actually reaches.
    pub(crate) fn make_null_move(&mut self) -> NullUnmakeInfo {
        let previous_hash = self.hash;
        self.hash ^= ZOBRIST.side_to_move_key;
        self.side_to_move = self.side_to_move.opponent();
        // The feature set carries no side-to-move information, so a null
        // move leaves the accumulator unchanged; still push a ply slot so
        // the stack stays aligned with search depth.
        let carried = self.nnue_accumulators[self.nnue_ply].clone();
        self.nnue_accumulators.push(carried);
        self.nnue_ply += 1;
        NullUnmakeInfo { previous_hash }
    }

    pub(crate) fn unmake_null_move(&mut self, info: NullUnmakeInfo) {
        self.side_to_move = self.side_to_move.opponent();
        self.hash = info.previous_hash;
        self.nnue_accumulators.pop();
        self.nnue_ply -= 1;
    }
}

/// Undo record for `make_null_move`.
pub(crate) struct NullUnmakeInfo {
    previous_hash: u64,
}
