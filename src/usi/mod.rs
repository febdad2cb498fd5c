//! USI (Universal Shogi Interface) protocol implementation.
//!
//! Handles communication with Shogi GUIs following the USI specification:
//! <https://hgm.nubati.net/usi.html> in spirit, if not by citation.

use std::fmt;

use crate::board::{Board, MoveParseError, SfenError};

pub mod command;
pub mod options;
pub mod print;
pub mod report;

/// Error parsing a `position` command.
#[derive(Debug, Clone)]
pub enum UsiError {
    InvalidSfen(SfenError),
    InvalidMove { move_str: String, error: MoveParseError },
    MissingParts,
}

impl fmt::Display for UsiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsiError::InvalidSfen(e) => write!(f, "Invalid SFEN: {e}"),
            UsiError::InvalidMove { move_str, error } => {
                write!(f, "Invalid move '{move_str}': {error}")
            }
            UsiError::MissingParts => write!(f, "Missing required parts in position command"),
        }
    }
}

impl std::error::Error for UsiError {}

impl From<SfenError> for UsiError {
    fn from(e: SfenError) -> Self {
        UsiError::InvalidSfen(e)
    }
}

/// Parse a USI `position` command, returning an error on failure.
///
/// Supports `position startpos` and `position sfen <board> <side> <hand>
/// <movecount>`, optionally followed by `moves <move1> <move2> ...`.
pub fn try_parse_position_command(board: &mut Board, parts: &[&str]) -> Result<(), UsiError> {
    let mut i = 1;

    if i >= parts.len() {
        return Err(UsiError::MissingParts);
    }

    if parts[i] == "startpos" {
        *board = Board::new();
        i += 1;
    } else if parts[i] == "sfen" {
        if i + 4 >= parts.len() {
            return Err(UsiError::MissingParts);
        }
        let sfen = parts[i + 1..i + 5].join(" ");
        *board = Board::try_from_sfen(&sfen)?;
        i += 5;
    } else {
        return Err(UsiError::MissingParts);
    }

    if i < parts.len() && parts[i] == "moves" {
        i += 1;
        while i < parts.len() {
            let mv = board.parse_move(parts[i]).map_err(|e| UsiError::InvalidMove {
                move_str: parts[i].to_string(),
                error: e,
            })?;
            board.make_move(mv);
            i += 1;
        }
    }

    Ok(())
}

/// Parse a USI `position` command, printing errors to stderr on failure.
pub fn parse_position_command(board: &mut Board, parts: &[&str]) {
    if let Err(e) = try_parse_position_command(board, parts) {
        eprintln!("info string {e}");
    }
}

#[must_use]
pub fn format_usi_move(mv: &crate::board::Move) -> String {
    mv.to_string()
}
