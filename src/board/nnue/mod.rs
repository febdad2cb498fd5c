//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! A small quantized network trained to approximate search results,
//! providing a much stronger leaf evaluation than the material-only
//! fallback in `board::eval`. Loading is optional: until `try_load` is
//! called with a weights file (wired up from the `EvalFile` engine option),
//! `loaded_network` returns `None` and `Board::evaluate` falls back to
//! material.

use once_cell::sync::OnceCell;
use std::path::Path;

pub mod network;
pub mod simd;

pub use network::{NnueAccumulator, NnueNetwork, HIDDEN2_SIZE, HIDDEN_SIZE, INPUT_SIZE};

use crate::board::error::ResourceError;

/// Divisor applied to the raw two-layer output to produce centipawns,
/// playing the role of the reference implementation's `FV_SCALE`.
pub const SCALE: i32 = 16;

static NETWORK: OnceCell<NnueNetwork> = OnceCell::new();

/// Load a weights file and make it the active network for `Board::evaluate`.
/// A network can only be loaded once per process; a second call with a
/// different path is rejected, matching how the `EvalFile` option is
/// documented to take effect only up to the next `isready`.
pub fn try_load<P: AsRef<Path>>(path: P) -> Result<(), ResourceError> {
    let network = NnueNetwork::load(path)?;
    NETWORK
        .set(network)
        .map_err(|_| ResourceError::Io { message: "NNUE network already loaded".to_string() })
}

/// The active network, if one has been loaded.
#[must_use]
pub fn loaded_network() -> Option<&'static NnueNetwork> {
    NETWORK.get()
}
