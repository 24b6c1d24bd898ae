use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag to abort a running parse between two line reads
///
/// Clones share the same flag, so one handle can be passed to the reader and
/// another kept by the thread that may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}
impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every parse holding this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
