use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

#[derive(Debug, Default)]
struct BusyState {
    /// Bumped on every reset so releases from before the reset are ignored
    epoch: u64,
    count: usize,
}

/// Counts resizes in flight across every image of a batch session.
///
/// Each resize holds a [`BusyGuard`]; dropping the guard releases the count on
/// every exit path, including errors and cancelled tasks.
#[derive(Clone)]
pub struct ResizeBusyCounter {
    state: Arc<Mutex<BusyState>>,
    changed: Arc<Notify>,
}

impl ResizeBusyCounter {
    /// Creates a counter that wakes `changed` whenever the count moves.
    pub fn new(changed: Arc<Notify>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusyState::default())),
            changed,
        }
    }

    /// Marks one resize as started.
    pub fn acquire(&self) -> BusyGuard {
        let epoch = {
            let mut state = self.state.lock();
            state.count += 1;
            debug!("Resize started. In flight: {}", state.count);
            state.epoch
        };
        self.changed.notify_waiters();

        BusyGuard {
            counter: self.clone(),
            epoch,
        }
    }

    pub fn count(&self) -> usize {
        self.state.lock().count
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Drops every outstanding count. Guards acquired before the reset become no-ops.
    pub fn reset(&self) {
        {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.count = 0;
        }
        self.changed.notify_waiters();
    }

    fn release(&self, epoch: u64) {
        {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                return;
            }
            state.count = state.count.saturating_sub(1);
            debug!("Resize ended. In flight: {}", state.count);
        }
        self.changed.notify_waiters();
    }
}

impl Default for ResizeBusyCounter {
    fn default() -> Self {
        Self::new(Arc::new(Notify::new()))
    }
}

/// Releases one busy count when dropped.
#[must_use = "the resize counts as finished as soon as the guard is dropped"]
pub struct BusyGuard {
    counter: ResizeBusyCounter,
    epoch: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.counter.release(self.epoch);
    }
}
