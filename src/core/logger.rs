/// Server-scoped logger handle.
///
/// Every event carries the owning server's name in the `server` field, so two
/// servers living in one process never mix their output. Events go through
/// `tracing`; with no subscriber installed they are dropped silently.

use std::fmt::Display;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ServerLogger {
    server: Arc<str>,
}

impl ServerLogger {
    pub fn new(server: &str) -> Self {
        Self {
            server: Arc::from(server),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(server = %self.server, "{}", message);
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(server = %self.server, "{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(server = %self.server, "{}", message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(server = %self.server, "{}", message);
    }
}
