use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-view-activation lifetime marker.
///
/// Cloned into every task the activation spawns. Cancellation is
/// cooperative: tasks check the token when their fetch resolves, not
/// preemptively. Once disposed, a token never becomes live again, so a
/// superseded or abandoned view can never write state.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    disposed: Arc<AtomicBool>,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the owning view as gone. Idempotent.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn is_live(&self) -> bool {
        !self.is_disposed()
    }
}
