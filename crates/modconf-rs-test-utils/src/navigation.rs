use modconf_rs_nav::Navigator;
use parking_lot::Mutex;
use std::sync::Arc;

/// A navigation call captured by `RecordingNavigator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedNavigation {
    Spa(String),
    Assign(String),
}

/// Navigator that records calls instead of navigating.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<RecordedNavigation>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedNavigation> {
        self.calls.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_url(&self, url: &str) {
        self.calls
            .lock()
            .push(RecordedNavigation::Spa(url.to_string()));
    }

    fn assign(&self, url: &str) {
        self.calls
            .lock()
            .push(RecordedNavigation::Assign(url.to_string()));
    }
}
