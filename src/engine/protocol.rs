//! Protocol trait for the USI front end.

use crate::board::SearchResult;

/// Result of processing a protocol command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Command processed successfully, with optional output.
    Ok(Option<String>),
    /// Engine should quit.
    Quit,
    /// Command not recognized.
    Unknown(String),
}

/// Trait for a USI-speaking front end.
pub trait Protocol {
    /// Process a single command line and return the result.
    fn process_command(&mut self, line: &str) -> CommandResult;

    /// Called when a search completes with results.
    fn on_search_complete(&mut self, result: SearchResult);

    /// Get the protocol name (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Run the protocol's main loop (blocking).
    fn run(&mut self);
}
