//! A Shogi engine: board representation, move generation, NNUE evaluation,
//! search, and a USI frontend.

pub mod bench;
pub mod board;
pub mod engine;
pub mod tt;
pub mod usi;
pub mod zobrist;
