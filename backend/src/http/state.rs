//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::models::DisplayFormat;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Patterns used when rendering shift times in responses
    pub display: Arc<DisplayFormat>,
}

impl AppState {
    /// Create a new application state with the default display formats.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            display: Arc::new(DisplayFormat::default()),
        }
    }

    pub fn with_display(mut self, display: DisplayFormat) -> Self {
        self.display = Arc::new(display);
        self
    }
}
