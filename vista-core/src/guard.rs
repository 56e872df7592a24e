use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-form (or per-action) pending-operation flag.
///
/// While a permit is alive, further `try_acquire` calls fail, so a double
/// click cannot fire two concurrent creates.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<InFlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases its guard on drop, including on early return.
#[derive(Debug)]
pub struct InFlightPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
