//! Terminal router: pages request navigation, the main loop follows it.

use std::sync::{Mutex, PoisonError};

use gatekeep_core::Navigator;
use tracing::debug;

#[derive(Default)]
pub struct CliRouter {
    pending: Mutex<Option<String>>,
}

impl CliRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the most recently requested URL, if any
    pub fn take(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for CliRouter {
    fn navigate_by_url(&self, url: &str) {
        debug!(url, "Navigation requested");
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(url.to_string());
    }
}
