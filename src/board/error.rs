//! Error types for Shogi board operations.

use std::fmt;

/// Error type for SFEN parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfenError {
    /// SFEN string has too few space-separated parts (needs at least 3).
    TooFewParts { found: usize },
    /// Invalid piece character in the board field.
    InvalidPiece { char: char },
    /// A `+` promotion marker was not followed by a promotable piece letter.
    DanglingPromotionMarker,
    /// Invalid side-to-move field (must be `b` or `w`).
    InvalidSideToMove { found: String },
    /// Invalid rank index while parsing the board field.
    InvalidRank { rank: usize },
    /// A rank's square count does not sum to 9.
    WrongFileCount { rank: usize, files: usize },
    /// The board field does not have exactly 9 ranks.
    WrongRankCount { ranks: usize },
    /// Invalid piece or count character in the hand field.
    InvalidHand { found: String },
    /// Move-count field did not parse as an integer.
    InvalidMoveCount { found: String },
    /// A side has a piece count inconsistent with the 40-piece set
    /// (more pawns, or more of any piece kind, than physically exist).
    PieceCountExceeded { piece: char, count: u32 },
    /// Board is missing a king for one or both sides.
    MissingKing { color: &'static str },
}

impl fmt::Display for SfenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SfenError::TooFewParts { found } => {
                write!(f, "SFEN must have at least 3 parts, found {found}")
            }
            SfenError::InvalidPiece { char } => {
                write!(f, "Invalid piece character '{char}' in SFEN")
            }
            SfenError::DanglingPromotionMarker => {
                write!(f, "'+' in SFEN not followed by a promotable piece letter")
            }
            SfenError::InvalidSideToMove { found } => {
                write!(f, "Invalid side to move '{found}', expected 'b' or 'w'")
            }
            SfenError::InvalidRank { rank } => {
                write!(f, "Invalid rank index {rank} in SFEN")
            }
            SfenError::WrongFileCount { rank, files } => {
                write!(f, "Rank {rank} has {files} files, expected 9")
            }
            SfenError::WrongRankCount { ranks } => {
                write!(f, "Board has {ranks} ranks, expected 9")
            }
            SfenError::InvalidHand { found } => {
                write!(f, "Invalid hand field '{found}' in SFEN")
            }
            SfenError::InvalidMoveCount { found } => {
                write!(f, "Invalid move count '{found}' in SFEN")
            }
            SfenError::PieceCountExceeded { piece, count } => {
                write!(f, "Piece '{piece}' count {count} exceeds what exists in a Shogi set")
            }
            SfenError::MissingKing { color } => {
                write!(f, "Position is missing a king for {color}")
            }
        }
    }
}

impl std::error::Error for SfenError {}

/// Error type for move-string parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has an invalid length.
    InvalidLength { len: usize },
    /// Invalid square notation within the move string.
    InvalidSquare { notation: String },
    /// Invalid drop-piece letter (the part before `*`).
    InvalidDropPiece { char: char },
    /// `+` promotion suffix present on a move that cannot promote.
    InvalidPromotion { notation: String },
    /// Move is syntactically well-formed but not legal in the current position.
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4 or 5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidDropPiece { char } => {
                write!(f, "Invalid drop piece '{char}'")
            }
            MoveParseError::InvalidPromotion { notation } => {
                write!(f, "Invalid promotion suffix in '{notation}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Error type for square parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// Rank out of bounds (must be 0-8).
    RankOutOfBounds { rank: usize },
    /// File out of bounds (must be 0-8).
    FileOutOfBounds { file: usize },
    /// Invalid square notation.
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => {
                write!(f, "Rank {rank} out of bounds (must be 0-8)")
            }
            SquareError::FileOutOfBounds { file } => {
                write!(f, "File {file} out of bounds (must be 0-8)")
            }
            SquareError::InvalidNotation { notation } => {
                write!(f, "Invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Error type for a position that is structurally parseable but violates a
/// Shogi legality invariant (distinct from [`MoveParseError::IllegalMove`],
/// which covers illegal moves rather than illegal positions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegalityError {
    /// Two unpromoted pawns for the same side share a file (nifu).
    TwoPawnsOnFile { file: usize },
    /// Side to move's king is already in check from the side not to move.
    OpponentKingAttacked,
    /// A drop would deliver an illegal pawn-drop checkmate (uchifuzume).
    PawnDropCheckmate,
    /// A piece sits on a square from which it would have no legal move.
    NoLegalDestination { piece: char },
}

impl fmt::Display for LegalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegalityError::TwoPawnsOnFile { file } => {
                write!(f, "Two unpromoted pawns on file {file}")
            }
            LegalityError::OpponentKingAttacked => {
                write!(f, "Side not to move is in check")
            }
            LegalityError::PawnDropCheckmate => {
                write!(f, "Pawn drop delivers checkmate")
            }
            LegalityError::NoLegalDestination { piece } => {
                write!(f, "Piece '{piece}' has no legal destination from its square")
            }
        }
    }
}

impl std::error::Error for LegalityError {}

/// Error type for loading engine resources (NNUE weight files, opening books).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The resource file could not be read.
    Io { message: String },
    /// Header magic bytes did not match what the loader expected.
    BadMagic { expected: String, found: String },
    /// Declared dimensions are inconsistent with the file's byte length.
    SizeMismatch { expected: usize, found: usize },
    /// File ended before all declared weights were read.
    Truncated,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Io { message } => write!(f, "I/O error loading resource: {message}"),
            ResourceError::BadMagic { expected, found } => {
                write!(f, "bad resource header: expected '{expected}', found '{found}'")
            }
            ResourceError::SizeMismatch { expected, found } => {
                write!(f, "resource size mismatch: expected {expected} bytes, found {found}")
            }
            ResourceError::Truncated => write!(f, "resource file truncated"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Error type for engine option configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Option name is not recognized.
    UnknownOption { name: String },
    /// Option value failed to parse as the option's declared type.
    InvalidValue { name: String, value: String },
    /// Option value is outside its declared min/max range.
    OutOfRange { name: String, value: String },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::UnknownOption { name } => write!(f, "unknown option '{name}'"),
            OptionError::InvalidValue { name, value } => {
                write!(f, "invalid value '{value}' for option '{name}'")
            }
            OptionError::OutOfRange { name, value } => {
                write!(f, "value '{value}' out of range for option '{name}'")
            }
        }
    }
}

impl std::error::Error for OptionError {}
