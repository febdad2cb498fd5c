//! Zobrist hashing for Shogi positions.
//!
//! Provides an incrementally-updatable 64-bit position hash for the
//! transposition table and repetition detection. The hash folds in board
//! piece placement, both hands, and side to move.

use rand::prelude::*;

use crate::board::{Board, Color, Piece, Square};

/// Hand counts are hashed by a distinct key per (color, piece kind, count),
/// capped at the largest count any piece kind can reach (18, for pawns).
const MAX_HAND_COUNT: usize = 19;

pub(crate) struct ZobristKeys {
    // piece_keys[color][piece][square]
    pub(crate) piece_keys: [[[u64; 81]; Piece::COUNT]; 2],
    pub(crate) side_to_move_key: u64,
    // hand_keys[color][piece][count]
    pub(crate) hand_keys: [[[u64; MAX_HAND_COUNT]; Piece::COUNT]; 2],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1234567890_u64);
        let mut piece_keys = [[[0u64; 81]; Piece::COUNT]; 2];
        let mut hand_keys = [[[0u64; MAX_HAND_COUNT]; Piece::COUNT]; 2];

        for color in &mut piece_keys {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        for color in &mut hand_keys {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let side_to_move_key = rng.gen();

        ZobristKeys {
            piece_keys,
            side_to_move_key,
            hand_keys,
        }
    }
}

pub(crate) static ZOBRIST: std::sync::LazyLock<ZobristKeys> = std::sync::LazyLock::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[color.index()][piece.index()][sq.as_index()]
}

#[inline]
pub(crate) fn hand_key(color: Color, piece: Piece, count: u8) -> u64 {
    ZOBRIST.hand_keys[color.index()][piece.index()][count as usize]
}

/// Compute a position's hash from scratch. Used on initialization and after
/// SFEN parsing; incremental updates during search XOR individual keys in
/// and out rather than recomputing.
pub(crate) fn hash_position(board: &Board) -> u64 {
    let mut hash = 0u64;

    for color in Color::BOTH {
        for piece in Piece::ALL {
            for sq in board.pieces[color.index()][piece.index()] {
                hash ^= piece_key(color, piece, sq);
            }
        }
        for (piece, count) in board.hands[color.index()].iter() {
            for c in 1..=count {
                hash ^= hand_key(color, piece, c);
            }
        }
    }

    if board.side_to_move == Color::White {
        hash ^= ZOBRIST.side_to_move_key;
    }

    hash
}
