//! Navigation seam between the form and the host router.

use std::sync::Mutex;

/// Moves the user to another route. Implemented by the rendering layer.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that records every route it is sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes navigated to, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "Navigating");
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
