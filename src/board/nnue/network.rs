//! NNUE network structure and evaluation.
//!
//! Architecture: a feature transformer projects the sparse board+hand
//! feature set into one `H1`-wide accumulator, which the forward pass reads
//! twice -- once as-is, once negated -- to form a `2*H1` input for a small
//! hidden layer (`H2`), which in turn feeds a single output unit. Both
//! non-linearities are plain `ReLU`. One accumulator (not a pair) is kept
//! per ply: the feature table already encodes both viewing perspectives, so
//! a single integer vector carries the position, and the sign flip at the
//! hidden layer plus at the very end of `evaluate` is what orients the
//! score to the side to move.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::simd;
use super::SCALE;
use crate::board::error::ResourceError;
use crate::board::{Board, Color, Piece, Square};

/// Non-king piece kinds that get their own feature plane (promoted and
/// unpromoted kinds are each distinct; king is handled outside the feature
/// set entirely).
const NON_KING_KINDS: usize = Piece::COUNT - 1;
const SQUARES: usize = Square::COUNT;
/// Ownership slots within a perspective half: pieces Black owns, and pieces
/// White owns (independent of which perspective is being encoded).
const OWNERSHIP_SLOTS: usize = 2;

const BOARD_FEATURES: usize = OWNERSHIP_SLOTS * NON_KING_KINDS * SQUARES;

/// Per-kind hand caps for the seven droppable piece kinds, pawn through
/// rook, matching [`crate::board::Hand::max_count`]'s per-kind limits (kept
/// as a local constant since feature-space layout must be fixed at compile
/// time).
const HAND_LEVELS: [usize; 7] = [18, 4, 4, 4, 4, 2, 2];

const fn sum_hand_levels() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < HAND_LEVELS.len() {
        total += HAND_LEVELS[i];
        i += 1;
    }
    total
}

/// One-hot count-level slots per ownership side, summed across the seven
/// droppable kinds.
const HAND_LEVELS_PER_OWNER: usize = sum_hand_levels();
const HAND_FEATURES: usize = OWNERSHIP_SLOTS * HAND_LEVELS_PER_OWNER;

/// Size of one perspective half of the feature space (`fe_end` in the
/// reference implementation).
const FE_END: usize = BOARD_FEATURES + HAND_FEATURES;

/// Input feature count: both perspective halves.
pub const INPUT_SIZE: usize = 2 * FE_END;

/// Feature-transformer accumulator width.
pub const HIDDEN_SIZE: usize = 256;
/// Hidden (second) layer width.
pub const HIDDEN2_SIZE: usize = 32;

/// 48-byte file header, beginning with the `NNUEv2` magic; the remaining
/// bytes are reserved (zero-filled by the writer, ignored by the reader).
const HEADER_SIZE: usize = 48;
const MAGIC: &[u8; 6] = b"NNUEv2";

/// Board-kind feature plane index, 0..`NON_KING_KINDS`, or `None` for the
/// king (kings are not input features).
#[inline]
#[must_use]
fn board_kind_slot(piece: Piece) -> Option<usize> {
    match piece {
        Piece::King => None,
        Piece::Pawn => Some(0),
        Piece::Lance => Some(1),
        Piece::Knight => Some(2),
        Piece::Silver => Some(3),
        Piece::Gold => Some(4),
        Piece::Bishop => Some(5),
        Piece::Rook => Some(6),
        Piece::ProPawn => Some(7),
        Piece::ProLance => Some(8),
        Piece::ProKnight => Some(9),
        Piece::ProSilver => Some(10),
        Piece::Horse => Some(11),
        Piece::Dragon => Some(12),
    }
}

/// Hand-kind slot (0..7) and this kind's count cap, for a droppable base
/// kind. Promoted kinds are normalized by the caller.
#[inline]
#[must_use]
fn hand_kind_slot(piece: Piece) -> Option<usize> {
    match piece {
        Piece::Pawn => Some(0),
        Piece::Lance => Some(1),
        Piece::Knight => Some(2),
        Piece::Silver => Some(3),
        Piece::Gold => Some(4),
        Piece::Bishop => Some(5),
        Piece::Rook => Some(6),
        _ => None,
    }
}

fn hand_kind_offset(slot: usize) -> usize {
    HAND_LEVELS[..slot].iter().sum()
}

/// Local (within one `FE_END`-wide perspective half) feature index for a
/// board piece, before the perspective's square orientation is applied.
#[inline]
#[must_use]
fn board_local_index(piece: Piece, color: Color, oriented_square: Square) -> Option<usize> {
    let kind = board_kind_slot(piece)?;
    let ownership = color.index();
    Some(ownership * NON_KING_KINDS * SQUARES + kind * SQUARES + oriented_square.as_index())
}

/// Local feature index for a held piece at `count` (1-based; one-hot per
/// count level, matching the reference `hand_to_index`).
#[inline]
#[must_use]
fn hand_local_index(piece: Piece, color: Color, count: u8) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let slot = hand_kind_slot(piece.unpromoted())?;
    let ownership = color.index();
    Some(BOARD_FEATURES + ownership * HAND_LEVELS_PER_OWNER + hand_kind_offset(slot) + usize::from(count - 1))
}

/// Row into [`NnueNetwork::feature_weights`] for a board piece, as seen
/// from `perspective`: the local index is computed with the square
/// reoriented into `perspective`'s own frame, then placed into that
/// perspective's half of the table.
#[inline]
#[must_use]
fn board_feature_row(piece: Piece, color: Color, square: Square, perspective: Color) -> Option<usize> {
    let oriented = if perspective == Color::Black { square } else { square.rotate180() };
    let local = board_local_index(piece, color, oriented)?;
    Some(if perspective == Color::Black { local } else { FE_END + local })
}

/// Row into [`NnueNetwork::feature_weights`] for a held piece, as seen from
/// `perspective`. Hand features have no square to reorient; perspective
/// only selects which half of the table the row lands in.
#[inline]
#[must_use]
fn hand_feature_row(piece: Piece, color: Color, count: u8, perspective: Color) -> Option<usize> {
    let local = hand_local_index(piece, color, count)?;
    Some(if perspective == Color::Black { local } else { FE_END + local })
}

/// NNUE accumulator: a single `H1`-wide integer vector, valid for exactly
/// one ply. The forward pass reads it twice (once negated) to recover both
/// perspectives; see [`NnueNetwork::evaluate_accumulator`].
#[derive(Clone, Debug)]
pub struct NnueAccumulator {
    values: [i16; HIDDEN_SIZE],
}

impl NnueAccumulator {
    /// Build an accumulator for `board` from scratch.
    #[must_use]
    pub fn refresh(board: &Board, network: &NnueNetwork) -> Self {
        let mut acc = NnueAccumulator { values: network.feature_bias };

        for sq_idx in 0..Square::COUNT {
            let sq = Square::from_index(sq_idx);
            let Some((color, piece)) = board.piece_at(sq) else {
                continue;
            };
            acc.add_board_piece(network, piece, color, sq);
        }

        for color in [Color::Black, Color::White] {
            for (piece, count) in board.hand(color).iter() {
                acc.add_hand_piece(network, piece, color, count);
            }
        }

        acc
    }

    /// Add the weight rows for a piece landing on `square`. A no-op for
    /// kings, which carry no feature rows.
    pub fn add_board_piece(&mut self, network: &NnueNetwork, piece: Piece, color: Color, square: Square) {
        if let Some(row) = board_feature_row(piece, color, square, Color::Black) {
            simd::add_weights(&mut self.values, &network.feature_weights[row]);
        }
        if let Some(row) = board_feature_row(piece, color, square, Color::White) {
            simd::add_weights(&mut self.values, &network.feature_weights[row]);
        }
    }

    /// Subtract the weight rows for a piece leaving `square`.
    pub fn remove_board_piece(&mut self, network: &NnueNetwork, piece: Piece, color: Color, square: Square) {
        if let Some(row) = board_feature_row(piece, color, square, Color::Black) {
            simd::sub_weights(&mut self.values, &network.feature_weights[row]);
        }
        if let Some(row) = board_feature_row(piece, color, square, Color::White) {
            simd::sub_weights(&mut self.values, &network.feature_weights[row]);
        }
    }

    /// Add the weight rows for a hand reaching `count` of `piece`. A no-op
    /// when `count` is zero (nothing to encode yet).
    pub fn add_hand_piece(&mut self, network: &NnueNetwork, piece: Piece, color: Color, count: u8) {
        if let Some(row) = hand_feature_row(piece, color, count, Color::Black) {
            simd::add_weights(&mut self.values, &network.feature_weights[row]);
        }
        if let Some(row) = hand_feature_row(piece, color, count, Color::White) {
            simd::add_weights(&mut self.values, &network.feature_weights[row]);
        }
    }

    /// Subtract the weight rows for a hand that held `count` of `piece`
    /// before this change.
    pub fn remove_hand_piece(&mut self, network: &NnueNetwork, piece: Piece, color: Color, count: u8) {
        if let Some(row) = hand_feature_row(piece, color, count, Color::Black) {
            simd::sub_weights(&mut self.values, &network.feature_weights[row]);
        }
        if let Some(row) = hand_feature_row(piece, color, count, Color::White) {
            simd::sub_weights(&mut self.values, &network.feature_weights[row]);
        }
    }

    /// Whether two accumulators hold bit-identical values; used by the
    /// debug-mode cross-check between incremental updates and a from-scratch
    /// refresh.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

/// NNUE network weights, loaded from a `.nnue`/`nn.bin` weights file.
pub struct NnueNetwork {
    feature_weights: Box<[[i16; HIDDEN_SIZE]; INPUT_SIZE]>,
    feature_bias: [i16; HIDDEN_SIZE],
    hidden_weights: Box<[[i16; HIDDEN2_SIZE]; 2 * HIDDEN_SIZE]>,
    hidden_bias: [i16; HIDDEN2_SIZE],
    output_weights: [i16; HIDDEN2_SIZE],
    output_bias: i16,
}

fn read_i16<R: Read>(reader: &mut R) -> Result<i16, ResourceError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf).map_err(|_| ResourceError::Truncated)?;
    Ok(i16::from_le_bytes(buf))
}

impl NnueNetwork {
    /// Load a network from a weights file: a 48-byte header beginning with
    /// the `NNUEv2` magic, then feature-transformer weights and bias,
    /// hidden-layer weights and bias, and output weights and bias, each
    /// little-endian `i16`, in that order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        let file = File::open(path).map_err(|e| ResourceError::Io { message: e.to_string() })?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(|_| ResourceError::Truncated)?;
        if &header[..MAGIC.len()] != MAGIC {
            return Err(ResourceError::BadMagic {
                expected: String::from_utf8_lossy(MAGIC).into_owned(),
                found: String::from_utf8_lossy(&header[..MAGIC.len()]).into_owned(),
            });
        }

        let mut feature_weights = Box::new([[0i16; HIDDEN_SIZE]; INPUT_SIZE]);
        for row in feature_weights.iter_mut() {
            for slot in row.iter_mut() {
                *slot = read_i16(&mut reader)?;
            }
        }

        let mut feature_bias = [0i16; HIDDEN_SIZE];
        for slot in &mut feature_bias {
            *slot = read_i16(&mut reader)?;
        }

        let mut hidden_weights = Box::new([[0i16; HIDDEN2_SIZE]; 2 * HIDDEN_SIZE]);
        for row in hidden_weights.iter_mut() {
            for slot in row.iter_mut() {
                *slot = read_i16(&mut reader)?;
            }
        }

        let mut hidden_bias = [0i16; HIDDEN2_SIZE];
        for slot in &mut hidden_bias {
            *slot = read_i16(&mut reader)?;
        }

        let mut output_weights = [0i16; HIDDEN2_SIZE];
        for slot in &mut output_weights {
            *slot = read_i16(&mut reader)?;
        }

        let output_bias = read_i16(&mut reader)?;

        Ok(NnueNetwork {
            feature_weights,
            feature_bias,
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
        })
    }

    /// Run the hidden and output layers over an already-built accumulator,
    /// oriented so positive favors Black. `evaluate` flips the sign for
    /// White to move.
    #[must_use]
    fn forward(&self, acc: &NnueAccumulator) -> i32 {
        let mut concat = [0i32; 2 * HIDDEN_SIZE];
        for i in 0..HIDDEN_SIZE {
            let v = i32::from(acc.values[i]);
            concat[i] = v.max(0);
            concat[HIDDEN_SIZE + i] = (-v).max(0);
        }

        let mut hidden = [0i32; HIDDEN2_SIZE];
        for (j, slot) in hidden.iter_mut().enumerate() {
            let mut sum = i32::from(self.hidden_bias[j]);
            for (i, &c) in concat.iter().enumerate() {
                sum += c * i32::from(self.hidden_weights[i][j]);
            }
            *slot = sum.max(0);
        }

        let mut output = i32::from(self.output_bias);
        for (i, &h) in hidden.iter().enumerate() {
            output += h * i32::from(self.output_weights[i]);
        }
        output
    }

    /// Evaluate `board` from the side-to-move's perspective, in centipawns.
    /// Rebuilds the accumulator from scratch; callers in the search driver
    /// should prefer a maintained [`NnueAccumulator`] from the ply stack via
    /// [`Self::evaluate_accumulator`] when one is available.
    #[must_use]
    pub fn evaluate(&self, board: &Board) -> i32 {
        let acc = NnueAccumulator::refresh(board, self);
        self.evaluate_accumulator(&acc, board.side_to_move())
    }

    /// Evaluate a maintained accumulator for a position where `side_to_move`
    /// is to move.
    #[must_use]
    pub fn evaluate_accumulator(&self, acc: &NnueAccumulator, side_to_move: Color) -> i32 {
        let raw = self.forward(acc);
        let score = raw / SCALE;
        match side_to_move {
            Color::Black => score,
            Color::White => -score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn board_feature_row_is_in_bounds() {
        for piece in Piece::ALL {
            if piece == Piece::King {
                continue;
            }
            for sq_idx in 0..Square::COUNT {
                let sq = Square::from_index(sq_idx);
                let black_row = board_feature_row(piece, Color::Black, sq, Color::Black).unwrap();
                let white_row = board_feature_row(piece, Color::Black, sq, Color::White).unwrap();
                assert!(black_row < INPUT_SIZE);
                assert!(white_row < INPUT_SIZE);
            }
        }
    }

    #[test]
    fn king_has_no_board_feature_row() {
        let sq = Square::new(0, 0);
        assert_eq!(board_feature_row(Piece::King, Color::Black, sq, Color::Black), None);
        assert_eq!(board_feature_row(Piece::King, Color::Black, sq, Color::White), None);
    }

    #[test]
    fn black_and_white_perspective_rows_differ_off_center() {
        let sq = Square::new(0, 0);
        let black_row = board_feature_row(Piece::Pawn, Color::Black, sq, Color::Black).unwrap();
        let white_row = board_feature_row(Piece::Pawn, Color::Black, sq, Color::White).unwrap();
        assert_ne!(black_row, white_row);
    }

    #[test]
    fn hand_feature_row_is_one_hot_per_count_level() {
        let at_one = hand_feature_row(Piece::Pawn, Color::Black, 1, Color::Black).unwrap();
        let at_two = hand_feature_row(Piece::Pawn, Color::Black, 2, Color::Black).unwrap();
        assert_ne!(at_one, at_two);
        assert!(at_two < INPUT_SIZE);
    }

    #[test]
    fn hand_feature_row_is_none_at_zero_count() {
        assert_eq!(hand_feature_row(Piece::Pawn, Color::Black, 0, Color::Black), None);
    }

    #[test]
    fn promoted_hand_piece_shares_base_kind_slot() {
        let dragon_row = hand_feature_row(Piece::Dragon, Color::Black, 1, Color::Black).unwrap();
        let rook_row = hand_feature_row(Piece::Rook, Color::Black, 1, Color::Black).unwrap();
        assert_eq!(dragon_row, rook_row);
    }

    #[test]
    fn load_rejects_bad_magic() {
        let tmp = std::env::temp_dir().join("shogi_nnue_bad_magic_test.nnue");
        std::fs::write(&tmp, [0u8; HEADER_SIZE]).unwrap();
        let result = NnueNetwork::load(&tmp);
        let _ = std::fs::remove_file(&tmp);
        assert!(matches!(result, Err(ResourceError::BadMagic { .. })));
    }

    #[test]
    fn load_rejects_truncated_file() {
        let tmp = std::env::temp_dir().join("shogi_nnue_truncated_test.nnue");
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[..MAGIC.len()].copy_from_slice(MAGIC);
        std::fs::write(&tmp, &bytes).unwrap();
        let result = NnueNetwork::load(&tmp);
        let _ = std::fs::remove_file(&tmp);
        assert!(matches!(result, Err(ResourceError::Truncated)));
    }

    /// A deterministic, non-uniform network used only to cross-check that
    /// incremental accumulator edits agree with a from-scratch refresh. Built
    /// locally rather than through the global `OnceCell` so these tests don't
    /// permanently load a network into the shared test binary.
    fn synthetic_network() -> NnueNetwork {
        let mut feature_weights = Box::new([[0i16; HIDDEN_SIZE]; INPUT_SIZE]);
        for (row_idx, row) in feature_weights.iter_mut().enumerate() {
            for (col_idx, slot) in row.iter_mut().enumerate() {
                *slot = ((row_idx * 7 + col_idx * 3) % 41) as i16 - 20;
            }
        }
        let feature_bias = std::array::from_fn(|i| (i % 13) as i16 - 6);

        let mut hidden_weights = Box::new([[0i16; HIDDEN2_SIZE]; 2 * HIDDEN_SIZE]);
        for (row_idx, row) in hidden_weights.iter_mut().enumerate() {
            for (col_idx, slot) in row.iter_mut().enumerate() {
                *slot = ((row_idx * 5 + col_idx * 11) % 17) as i16 - 8;
            }
        }
        let hidden_bias = std::array::from_fn(|i| (i % 9) as i16 - 4);
        let output_weights = std::array::from_fn(|i| (i % 7) as i16 - 3);

        NnueNetwork {
            feature_weights,
            feature_bias,
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias: 5,
        }
    }

    #[test]
    fn incremental_board_move_matches_refresh() {
        let network = synthetic_network();
        let before = crate::board::Board::new();
        let mut incremental = NnueAccumulator::refresh(&before, &network);

        let from = Square::new(6, 4);
        let to = Square::new(5, 4);
        incremental.remove_board_piece(&network, Piece::Pawn, Color::Black, from);
        incremental.add_board_piece(&network, Piece::Pawn, Color::Black, to);

        let mut after = before.clone();
        after.make_move_unchecked(crate::board::Move::board(from, to, Piece::Pawn, None, false));
        let expected = NnueAccumulator::refresh(&after, &network);

        assert!(incremental.matches(&expected));
    }

    #[test]
    fn incremental_drop_matches_refresh() {
        let network = synthetic_network();
        let before = crate::board::Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P - 1");
        let mut incremental = NnueAccumulator::refresh(&before, &network);

        let to = Square::new(4, 4);
        incremental.remove_hand_piece(&network, Piece::Pawn, Color::Black, 1);
        incremental.add_board_piece(&network, Piece::Pawn, Color::Black, to);

        let mut after = before.clone();
        after.make_move_unchecked(crate::board::Move::drop(Piece::Pawn, to));
        let expected = NnueAccumulator::refresh(&after, &network);

        assert!(incremental.matches(&expected));
    }
}
