//! Material evaluation.
//!
//! `Board::material` already carries each side's on-board and in-hand piece
//! value, maintained incrementally by `make_move`/`unmake_move`, so the
//! fallback evaluator here is just that difference plus a small bonus for
//! having the move. This is the evaluation used whenever no NNUE weights
//! file has been loaded (see `board::nnue`); it keeps the engine playable
//! without one.

use super::Board;

/// Side-to-move bonus in centipawns, reflecting the practical value of
/// having the next move in a tactical game.
const TEMPO_BONUS: i32 = 19;

impl Board {
    /// Material-only evaluation from the side-to-move's perspective
    /// (negamax sign convention: positive favors the side to move).
    #[must_use]
    pub fn evaluate_simple(&self) -> i32 {
        let mover = self.side_to_move.index();
        let opp = self.side_to_move.opponent().index();
        self.material[mover] - self.material[opp] + TEMPO_BONUS
    }

    /// Static evaluation of the position from the side-to-move's
    /// perspective. Delegates to the NNUE network when weights are loaded,
    /// and to the material-only fallback otherwise.
    ///
    /// When a network is loaded, this reads the accumulator `make_move`
    /// already maintains for the current ply rather than recomputing it;
    /// only a position whose ply slot was never incrementally built (no
    /// network was loaded at the time) pays for a from-scratch refresh.
    #[must_use]
    pub fn evaluate(&self) -> i32 {
        match super::nnue::loaded_network() {
            Some(net) => match &self.nnue_accumulators[self.nnue_ply] {
                Some(acc) => net.evaluate_accumulator(acc, self.side_to_move),
                None => net.evaluate(self),
            },
            None => self.evaluate_simple(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Move, Piece, Square};

    #[test]
    fn starting_position_is_balanced_plus_tempo() {
        let board = Board::new();
        assert_eq!(board.evaluate_simple(), TEMPO_BONUS);
    }

    #[test]
    fn capturing_a_pawn_favors_the_capturer_after_the_move() {
        let mut board = Board::from_sfen("4k4/9/9/9/4p4/4P4/9/9/4K4 b - 1");
        let mv = Move::board(Square::new(5, 4), Square::new(4, 4), Piece::Pawn, Some(Piece::Pawn), false);
        board.make_move(mv);
        // It is now White to move, down a pawn plus the hand swing.
        assert!(board.evaluate_simple() < -TEMPO_BONUS);
    }

    #[test]
    fn hand_pieces_count_toward_material() {
        let board = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P - 1");
        assert_eq!(board.hand(Color::Black).count(Piece::Pawn), 1);
        assert!(board.evaluate_simple() > TEMPO_BONUS);
    }
}
