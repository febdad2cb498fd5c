//! Type-safe indices for colors and pieces.
//!
//! These newtypes prevent accidentally mixing color and piece indices,
//! which could lead to subtle bugs in array access patterns.

use super::piece::{Color, Piece};

/// Type-safe index for color arrays (0 = Black, 1 = White).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorIndex(usize);

impl ColorIndex {
    /// Index for Black (sente).
    pub const BLACK: ColorIndex = ColorIndex(0);
    /// Index for White (gote).
    pub const WHITE: ColorIndex = ColorIndex(1);

    /// Create from a Color.
    #[inline]
    #[must_use]
    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::Black => Self::BLACK,
            Color::White => Self::WHITE,
        }
    }

    /// Get the opponent's color index.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        ColorIndex(1 - self.0)
    }

    /// Convert to usize for array indexing.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Convert back to Color.
    #[inline]
    #[must_use]
    pub const fn to_color(self) -> Color {
        match self.0 {
            0 => Color::Black,
            _ => Color::White,
        }
    }

    /// Iterate over both colors.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter() -> impl Iterator<Item = ColorIndex> {
        [Self::BLACK, Self::WHITE].into_iter()
    }
}

impl From<Color> for ColorIndex {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl From<ColorIndex> for usize {
    fn from(idx: ColorIndex) -> usize {
        idx.0
    }
}

/// Type-safe index for piece arrays (0-13, matching [`Piece::ALL`] order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceIndex(usize);

impl PieceIndex {
    pub const PAWN: PieceIndex = PieceIndex(0);
    pub const LANCE: PieceIndex = PieceIndex(1);
    pub const KNIGHT: PieceIndex = PieceIndex(2);
    pub const SILVER: PieceIndex = PieceIndex(3);
    pub const GOLD: PieceIndex = PieceIndex(4);
    pub const BISHOP: PieceIndex = PieceIndex(5);
    pub const ROOK: PieceIndex = PieceIndex(6);
    pub const KING: PieceIndex = PieceIndex(7);
    pub const PRO_PAWN: PieceIndex = PieceIndex(8);
    pub const PRO_LANCE: PieceIndex = PieceIndex(9);
    pub const PRO_KNIGHT: PieceIndex = PieceIndex(10);
    pub const PRO_SILVER: PieceIndex = PieceIndex(11);
    pub const HORSE: PieceIndex = PieceIndex(12);
    pub const DRAGON: PieceIndex = PieceIndex(13);

    /// All piece indices in table order.
    pub const ALL: [PieceIndex; Piece::COUNT] = [
        Self::PAWN,
        Self::LANCE,
        Self::KNIGHT,
        Self::SILVER,
        Self::GOLD,
        Self::BISHOP,
        Self::ROOK,
        Self::KING,
        Self::PRO_PAWN,
        Self::PRO_LANCE,
        Self::PRO_KNIGHT,
        Self::PRO_SILVER,
        Self::HORSE,
        Self::DRAGON,
    ];

    /// Indices of piece kinds that can be held in hand (excludes king and
    /// promoted kinds, which revert to their base kind when captured).
    pub const DROPPABLE: [PieceIndex; 7] = [
        Self::PAWN,
        Self::LANCE,
        Self::KNIGHT,
        Self::SILVER,
        Self::GOLD,
        Self::BISHOP,
        Self::ROOK,
    ];

    /// Create from a Piece.
    #[inline]
    #[must_use]
    pub const fn from_piece(piece: Piece) -> Self {
        PieceIndex(piece.index())
    }

    /// Convert to usize for array indexing.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Convert back to Piece.
    #[must_use]
    pub const fn to_piece(self) -> Piece {
        Piece::ALL[self.0]
    }

    /// Iterate over all piece kinds.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter() -> impl Iterator<Item = PieceIndex> {
        Self::ALL.into_iter()
    }
}

impl From<Piece> for PieceIndex {
    fn from(piece: Piece) -> Self {
        Self::from_piece(piece)
    }
}

impl From<PieceIndex> for usize {
    fn from(idx: PieceIndex) -> usize {
        idx.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index_round_trip() {
        assert_eq!(ColorIndex::BLACK.to_color(), Color::Black);
        assert_eq!(ColorIndex::WHITE.to_color(), Color::White);
        assert_eq!(ColorIndex::from_color(Color::Black), ColorIndex::BLACK);
        assert_eq!(ColorIndex::from_color(Color::White), ColorIndex::WHITE);
    }

    #[test]
    fn test_color_index_opponent() {
        assert_eq!(ColorIndex::BLACK.opponent(), ColorIndex::WHITE);
        assert_eq!(ColorIndex::WHITE.opponent(), ColorIndex::BLACK);
    }

    #[test]
    fn test_piece_index_round_trip() {
        for piece in Piece::ALL {
            let idx = PieceIndex::from_piece(piece);
            assert_eq!(idx.to_piece(), piece);
        }
    }
}
