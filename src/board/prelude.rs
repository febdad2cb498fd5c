//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions.
//!
//! # Example
//! ```
//! use shogi_engine::board::prelude::*;
//! ```

pub use super::{
    find_best_move, find_best_move_with_time, Board, BoardBuilder, Color, Move, MoveList,
    MoveParseError, Piece, SearchState, SfenError, Square, SquareError,
};
