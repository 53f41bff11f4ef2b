use parking_lot::Mutex;

use crate::observer::{CongestionEvent, CongestionObserver};


pub fn setup_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Remembers every event it sees.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(&'static str, CongestionEvent)>>,
}

impl RecordingObserver {
    pub fn take(&self) -> Vec<(&'static str, CongestionEvent)> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl CongestionObserver for RecordingObserver {
    fn on_event(&self, controller: &'static str, event: &CongestionEvent) {
        self.events.lock().push((controller, *event));
    }
}
