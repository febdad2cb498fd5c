//! Piece and color types.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shogi piece types, unpromoted and promoted.
///
/// Index order matches the 14-member set used for material tables, NNUE
/// feature offsets, and piece-square tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Piece {
    Pawn,
    Lance,
    Knight,
    Silver,
    Gold,
    Bishop,
    Rook,
    King,
    ProPawn,
    ProLance,
    ProKnight,
    ProSilver,
    Horse,
    Dragon,
}

impl Piece {
    pub(crate) const COUNT: usize = 14;

    /// All piece kinds in table order.
    pub(crate) const ALL: [Piece; Piece::COUNT] = [
        Piece::Pawn,
        Piece::Lance,
        Piece::Knight,
        Piece::Silver,
        Piece::Gold,
        Piece::Bishop,
        Piece::Rook,
        Piece::King,
        Piece::ProPawn,
        Piece::ProLance,
        Piece::ProKnight,
        Piece::ProSilver,
        Piece::Horse,
        Piece::Dragon,
    ];

    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Lance => 1,
            Piece::Knight => 2,
            Piece::Silver => 3,
            Piece::Gold => 4,
            Piece::Bishop => 5,
            Piece::Rook => 6,
            Piece::King => 7,
            Piece::ProPawn => 8,
            Piece::ProLance => 9,
            Piece::ProKnight => 10,
            Piece::ProSilver => 11,
            Piece::Horse => 12,
            Piece::Dragon => 13,
        }
    }

    /// Parse a piece from an unpromoted or promoted SFEN letter (case-insensitive).
    /// `promoted` selects between the base and promoted reading for letters that
    /// have both (e.g. `p` is `Pawn` unpromoted, `ProPawn` when `promoted` is set).
    #[must_use]
    pub fn from_char(c: char, promoted: bool) -> Option<Piece> {
        let base = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'l' => Piece::Lance,
            'n' => Piece::Knight,
            's' => Piece::Silver,
            'g' => Piece::Gold,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'k' => Piece::King,
            _ => return None,
        };
        if promoted {
            base.promote()
        } else {
            Some(base)
        }
    }

    /// Base (unpromoted) SFEN letter, lowercase.
    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn | Piece::ProPawn => 'p',
            Piece::Lance | Piece::ProLance => 'l',
            Piece::Knight | Piece::ProKnight => 'n',
            Piece::Silver | Piece::ProSilver => 's',
            Piece::Gold => 'g',
            Piece::Bishop | Piece::Horse => 'b',
            Piece::Rook | Piece::Dragon => 'r',
            Piece::King => 'k',
        }
    }

    /// Convert piece to SFEN text (including the `+` promotion prefix), with
    /// case based on color (uppercase for Black/sente).
    #[must_use]
    pub fn to_sfen(self, color: Color) -> String {
        let mut s = String::with_capacity(2);
        if self.is_promoted() {
            s.push('+');
        }
        let c = self.to_char();
        s.push(if color == Color::Black {
            c.to_ascii_uppercase()
        } else {
            c
        });
        s
    }

    /// Whether this piece kind is a promoted type.
    #[inline]
    #[must_use]
    pub const fn is_promoted(self) -> bool {
        matches!(
            self,
            Piece::ProPawn
                | Piece::ProLance
                | Piece::ProKnight
                | Piece::ProSilver
                | Piece::Horse
                | Piece::Dragon
        )
    }

    /// The one-way promotion target, or `None` for pieces that cannot promote
    /// (gold, king) or are already promoted.
    #[inline]
    #[must_use]
    pub const fn promote(self) -> Option<Piece> {
        match self {
            Piece::Pawn => Some(Piece::ProPawn),
            Piece::Lance => Some(Piece::ProLance),
            Piece::Knight => Some(Piece::ProKnight),
            Piece::Silver => Some(Piece::ProSilver),
            Piece::Bishop => Some(Piece::Horse),
            Piece::Rook => Some(Piece::Dragon),
            _ => None,
        }
    }

    /// The unpromoted base kind (identity for already-unpromoted pieces).
    /// Used when a captured piece returns to its owner's hand.
    #[inline]
    #[must_use]
    pub const fn unpromoted(self) -> Piece {
        match self {
            Piece::ProPawn => Piece::Pawn,
            Piece::ProLance => Piece::Lance,
            Piece::ProKnight => Piece::Knight,
            Piece::ProSilver => Piece::Silver,
            Piece::Horse => Piece::Bishop,
            Piece::Dragon => Piece::Rook,
            other => other,
        }
    }

    /// Whether this piece kind can be held in hand and dropped (excludes king).
    #[inline]
    #[must_use]
    pub const fn droppable(self) -> bool {
        !matches!(self, Piece::King) && !self.is_promoted()
    }

    /// Whether this piece, when on the last-rank-from-its-owner, has no legal
    /// non-promoting move left (pawn, lance). Knight uses the two-rank variant,
    /// checked separately by the caller.
    #[inline]
    #[must_use]
    pub const fn forced_promotion_last_rank(self) -> bool {
        matches!(self, Piece::Pawn | Piece::Lance)
    }

    /// Material value in centipawns, simplified relative piece values.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Piece::Pawn => 90,
            Piece::Lance => 315,
            Piece::Knight => 405,
            Piece::Silver => 540,
            Piece::Gold => 540,
            Piece::Bishop => 855,
            Piece::Rook => 990,
            Piece::King => 20000,
            Piece::ProPawn | Piece::ProLance | Piece::ProKnight | Piece::ProSilver => 540,
            Piece::Horse => 945,
            Piece::Dragon => 1395,
        }
    }

    /// Whether this piece slides along a straight (file/rank) ray.
    #[inline]
    #[must_use]
    pub const fn attacks_straight(self) -> bool {
        matches!(self, Piece::Rook | Piece::Dragon | Piece::Lance)
    }

    /// Whether this piece slides along a diagonal ray.
    #[inline]
    #[must_use]
    pub const fn attacks_diagonal(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Horse)
    }
}

/// Piece kinds offered as promotion choices, in no particular priority
/// (Shogi promotion is a fixed same-piece transition, not a choice).
pub(crate) const PROMOTABLE_PIECES: [Piece; 6] = [
    Piece::Pawn,
    Piece::Lance,
    Piece::Knight,
    Piece::Silver,
    Piece::Bishop,
    Piece::Rook,
];

/// Sides. Black (sente) moves first and encodes as a positive piece sign;
/// White (gote) encodes as negative.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Color {
    Black,
    White,
}

impl Default for Color {
    fn default() -> Self {
        Color::Black
    }
}

impl Color {
    pub(crate) const BOTH: [Color; 2] = [Color::Black, Color::White];

    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Returns the opposite side.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}
