//! Fluent builder for constructing Shogi positions piece by piece, rather
//! than parsing an SFEN string.
//!
//! # Example
//! ```
//! use shogi_engine::board::{BoardBuilder, Color, Piece, Square};
//!
//! let board = BoardBuilder::new()
//!     .piece(Square::new(0, 4), Color::White, Piece::King)
//!     .piece(Square::new(8, 4), Color::Black, Piece::King)
//!     .piece(Square::new(6, 0), Color::Black, Piece::Pawn)
//!     .side_to_move(Color::Black)
//!     .build();
//! ```

use super::{Board, Color, Piece, Square};

/// A fluent builder for constructing `Board` positions.
#[derive(Clone, Debug, Default)]
pub struct BoardBuilder {
    pieces: Vec<(Square, Color, Piece)>,
    hand: [Vec<Piece>; 2],
    side_to_move: Color,
}

impl BoardBuilder {
    /// Create a new empty board builder.
    #[must_use]
    pub fn new() -> Self {
        BoardBuilder::default()
    }

    /// Create a builder starting from the standard initial position.
    #[must_use]
    pub fn starting_position() -> Self {
        let mut builder = Self::new();

        let back_rank = [
            Piece::Lance,
            Piece::Knight,
            Piece::Silver,
            Piece::Gold,
            Piece::King,
            Piece::Gold,
            Piece::Silver,
            Piece::Knight,
            Piece::Lance,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            builder.pieces.push((Square::new(0, file), Color::White, piece));
            builder.pieces.push((Square::new(8, file), Color::Black, piece));
        }
        builder.pieces.push((Square::new(1, 1), Color::White, Piece::Rook));
        builder.pieces.push((Square::new(1, 7), Color::White, Piece::Bishop));
        builder.pieces.push((Square::new(7, 1), Color::Black, Piece::Bishop));
        builder.pieces.push((Square::new(7, 7), Color::Black, Piece::Rook));
        for file in 0..9 {
            builder.pieces.push((Square::new(2, file), Color::White, Piece::Pawn));
            builder.pieces.push((Square::new(6, file), Color::Black, Piece::Pawn));
        }

        builder
    }

    /// Place a piece on the board, replacing any piece already on that square.
    #[must_use]
    pub fn piece(mut self, square: Square, color: Color, piece: Piece) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self.pieces.push((square, color, piece));
        self
    }

    /// Remove a piece from a square.
    #[must_use]
    pub fn clear(mut self, square: Square) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self
    }

    /// Add a piece to `color`'s hand, in its unpromoted form.
    #[must_use]
    pub fn hand_piece(mut self, color: Color, piece: Piece) -> Self {
        self.hand[color.index()].push(piece.unpromoted());
        self
    }

    /// Set the side to move.
    #[must_use]
    pub const fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    /// Build the board.
    #[must_use]
    pub fn build(self) -> Board {
        let mut board = Board::empty();

        for (square, color, piece) in self.pieces {
            board.set_piece(square, color, piece);
        }
        for color in Color::BOTH {
            for piece in self.hand[color.index()].iter() {
                board.hands[color.index()].add(*piece);
            }
        }

        board.side_to_move = self.side_to_move;
        board.hash = board.calculate_initial_hash();
        board.repetition_counts.set(board.hash, 1);
        board.recalculate_material();

        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_matches_new() {
        let built = BoardBuilder::starting_position().side_to_move(Color::Black).build();
        let standard = Board::new();
        assert_eq!(built.to_sfen(), standard.to_sfen());
    }

    #[test]
    fn empty_board_with_two_kings() {
        let board = BoardBuilder::new()
            .piece(Square::new(0, 4), Color::White, Piece::King)
            .piece(Square::new(8, 4), Color::Black, Piece::King)
            .side_to_move(Color::Black)
            .build();

        assert!(board.piece_at(Square::new(0, 4)).is_some());
        assert!(board.piece_at(Square::new(8, 4)).is_some());
        assert!(board.piece_at(Square::new(0, 0)).is_none());
    }

    #[test]
    fn hand_piece_is_available_to_drop() {
        let board = BoardBuilder::new()
            .piece(Square::new(0, 4), Color::White, Piece::King)
            .piece(Square::new(8, 4), Color::Black, Piece::King)
            .hand_piece(Color::Black, Piece::Pawn)
            .side_to_move(Color::Black)
            .build();

        assert_eq!(board.hand(Color::Black).count(Piece::Pawn), 1);
    }

    #[test]
    fn clear_square_removes_only_that_piece() {
        let board = BoardBuilder::starting_position()
            .clear(Square::new(8, 0))
            .side_to_move(Color::Black)
            .build();

        assert!(board.piece_at(Square::new(8, 0)).is_none());
        assert!(board.piece_at(Square::new(8, 1)).is_some());
    }
}
