//! SFEN (Shogi Forsyth-Edwards Notation) parsing and rendering.

use std::str::FromStr;

use super::error::{MoveParseError, SfenError};
use super::{Board, Color, Hand, Move, Piece, Square};

impl Board {
    /// Parse a position from SFEN notation.
    ///
    /// Consumes four whitespace-separated fields: board, side to move, hands,
    /// and a move number. The move number is recorded but never enforced.
    pub fn try_from_sfen(sfen: &str) -> Result<Self, SfenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = sfen.split_whitespace().collect();

        if parts.len() < 3 {
            return Err(SfenError::TooFewParts { found: parts.len() });
        }

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 9 {
            return Err(SfenError::WrongRankCount { ranks: ranks.len() });
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file = 0usize;
            let mut pending_promotion = false;
            for c in rank_str.chars() {
                if c == '+' {
                    pending_promotion = true;
                    continue;
                }
                if let Some(digit) = c.to_digit(10) {
                    if pending_promotion {
                        return Err(SfenError::DanglingPromotionMarker);
                    }
                    file += digit as usize;
                    continue;
                }
                if file >= 9 {
                    return Err(SfenError::WrongFileCount {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                let color = if c.is_ascii_uppercase() {
                    Color::Black
                } else {
                    Color::White
                };
                let piece = Piece::from_char(c, pending_promotion)
                    .ok_or(SfenError::InvalidPiece { char: c })?;
                pending_promotion = false;
                board.set_piece(Square::new(rank_idx, file), color, piece);
                file += 1;
            }
            if pending_promotion {
                return Err(SfenError::DanglingPromotionMarker);
            }
            if file != 9 {
                return Err(SfenError::WrongFileCount { rank: rank_idx, files: file });
            }
        }

        board.side_to_move = match parts[1] {
            "b" => Color::Black,
            "w" => Color::White,
            other => {
                return Err(SfenError::InvalidSideToMove { found: other.to_string() });
            }
        };

        board.hands = parse_hands(parts[2])?;

        if parts.len() >= 4 {
            board.move_count = parts[3].parse().map_err(|_| SfenError::InvalidMoveCount {
                found: parts[3].to_string(),
            })?;
        }

        if board.king_square(Color::Black).is_none() {
            return Err(SfenError::MissingKing { color: "black" });
        }
        if board.king_square(Color::White).is_none() {
            return Err(SfenError::MissingKing { color: "white" });
        }

        board.hash = board.calculate_initial_hash();
        board.repetition_counts.set(board.hash, 1);
        board.recalculate_material();
        Ok(board)
    }

    /// Parse a position from SFEN notation.
    ///
    /// # Panics
    /// Panics if the SFEN string is invalid. Use `try_from_sfen` for fallible parsing.
    #[must_use]
    pub fn from_sfen(sfen: &str) -> Self {
        Self::try_from_sfen(sfen).expect("invalid SFEN string")
    }

    /// Render the position as an SFEN string.
    #[must_use]
    pub fn to_sfen(&self) -> String {
        let mut rows = Vec::with_capacity(9);
        for rank in 0..9 {
            let mut row = String::new();
            let mut empty = 0u32;
            for file in 0..9 {
                let sq = Square::new(rank, file);
                if let Some((color, piece)) = self.piece_at(sq) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push_str(&piece.to_sfen(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let stm = if self.side_to_move == Color::Black { "b" } else { "w" };
        let hands = render_hands(&self.hands);

        format!("{} {} {} {}", rows.join("/"), stm, hands, self.move_count)
    }

    /// Parse a move string (board move `<from><to>[+]` or drop `<Piece>*<to>`)
    /// against the position's legal moves, returning the fully-populated move.
    pub fn parse_move(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let candidate: Move = text.parse()?;
        if candidate.is_resign() || candidate.is_pass() {
            return Ok(candidate);
        }

        let legal_moves = self.generate_moves();
        for legal_move in legal_moves.iter() {
            if candidate.is_drop() {
                if legal_move.is_drop()
                    && legal_move.piece() == candidate.piece()
                    && legal_move.to() == candidate.to()
                {
                    return Ok(*legal_move);
                }
            } else if let Some(from) = candidate.from() {
                if legal_move.from() == Some(from)
                    && legal_move.to() == candidate.to()
                    && legal_move.is_promotion() == candidate.is_promotion()
                {
                    return Ok(*legal_move);
                }
            }
        }

        Err(MoveParseError::IllegalMove { notation: text.to_string() })
    }

    /// Parse a move string and make it on the board in one call.
    pub fn make_move_usi(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }
}

fn parse_hands(field: &str) -> Result<[Hand; 2], SfenError> {
    let mut hands = [Hand::new(); 2];
    if field == "-" {
        return Ok(hands);
    }

    let chars: Vec<char> = field.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let mut count = 0u32;
        let mut has_digits = false;
        while i < chars.len() && chars[i].is_ascii_digit() {
            has_digits = true;
            count = count * 10 + chars[i].to_digit(10).unwrap();
            i += 1;
        }
        if i >= chars.len() {
            return Err(SfenError::InvalidHand { found: field.to_string() });
        }
        let c = chars[i];
        i += 1;
        let color = if c.is_ascii_uppercase() { Color::Black } else { Color::White };
        let piece = Piece::from_char(c, false).ok_or(SfenError::InvalidHand { found: field.to_string() })?;
        let count = if has_digits { count } else { 1 };
        if count > u32::from(Hand::max_count(piece)) {
            return Err(SfenError::PieceCountExceeded { piece: c, count });
        }
        for _ in 0..count {
            hands[color.index()].add(piece);
        }
    }

    Ok(hands)
}

fn render_hands(hands: &[Hand; 2]) -> String {
    let black = hands[Color::Black.index()].to_string();
    let white = hands[Color::White.index()].to_string();
    if black.is_empty() && white.is_empty() {
        return "-".to_string();
    }
    format!("{black}{white}")
}

impl FromStr for Board {
    type Err = SfenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_sfen(s)
    }
}
