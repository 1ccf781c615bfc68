//! Application state for the web layer.

use crate::engine::BoardTable;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Boards and site status, written by the engine
    pub boards: BoardTable,
}

impl AppState {
    pub fn new(boards: BoardTable) -> Self {
        Self { boards }
    }
}
