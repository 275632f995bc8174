//! Latest-value debouncing for size edits.
//!
//! A [`DebounceSender`] overwrites a single pending slot on every request. The
//! paired [`DebounceReceiver`] waits until the slot has been quiet for the whole
//! window and only then hands out the value that is in the slot at that moment.
//! Dropping the sender cancels whatever is pending.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// Creates a debounce slot with the given quiescence window.
pub fn debounce_channel<T>(window: Duration) -> (DebounceSender<T>, DebounceReceiver<T>) {
    let (tx, rx) = watch::channel(Slot { generation: 0, value: None });
    let consumed = Arc::new(AtomicU64::new(0));

    (
        DebounceSender { slot: tx, consumed: consumed.clone() },
        DebounceReceiver { slot: rx, consumed, window },
    )
}

pub struct DebounceSender<T> {
    slot: watch::Sender<Slot<T>>,
    consumed: Arc<AtomicU64>,
}

impl<T> DebounceSender<T> {
    /// Replaces the pending value and restarts the window.
    ///
    /// Returns `false` when the receiver is gone and nothing will ever fire.
    pub fn request(&self, value: T) -> bool {
        self.slot.send_modify(|slot| {
            slot.generation += 1;
            slot.value = Some(value);
        });
        !self.slot.is_closed()
    }

    /// Whether a request has been made that the receiver has not taken yet.
    pub fn is_pending(&self) -> bool {
        self.slot.borrow().generation != self.consumed.load(Ordering::Acquire)
    }
}

pub struct DebounceReceiver<T> {
    slot: watch::Receiver<Slot<T>>,
    consumed: Arc<AtomicU64>,
    window: Duration,
}

impl<T: Clone> DebounceReceiver<T> {
    /// Waits for a request followed by a full quiet window.
    ///
    /// Returns `false` once the sender has been dropped, including while a
    /// window is still running.
    pub async fn wait(&mut self) -> bool {
        if !self.has_untaken() && self.slot.changed().await.is_err() {
            return false;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.window) => return true,
                changed = self.slot.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    /// Takes the value currently in the slot, marking every request so far as handled.
    pub fn take(&mut self) -> Option<T> {
        let slot = self.slot.borrow_and_update();
        self.consumed.store(slot.generation, Ordering::Release);
        slot.value.clone()
    }

    /// [`wait`](Self::wait) followed by [`take`](Self::take).
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<T> {
        if self.wait().await {
            self.take()
        } else {
            None
        }
    }

    fn has_untaken(&self) -> bool {
        self.slot.borrow().generation != self.consumed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, sleep};

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn rapid_requests_collapse_to_the_last() {
        let (tx, mut rx) = debounce_channel(WINDOW);
        let started = Instant::now();

        let waiter = tokio::spawn(async move { (rx.next().await, Instant::now()) });

        for width in [4, 40, 400] {
            tx.request(width);
            sleep(Duration::from_millis(100)).await;
        }

        let (value, fired_at) = waiter.await.unwrap();
        assert_eq!(value, Some(400));
        // last request at t=200ms, so the window closes at t=700ms
        let elapsed = fired_at - started;
        assert!(elapsed >= Duration::from_millis(700), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(800), "fired late: {elapsed:?}");
        assert!(!tx.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_requests_fire_separately() {
        let (tx, mut rx) = debounce_channel(WINDOW);

        tx.request(1);
        assert!(tx.is_pending());
        assert_eq!(rx.next().await, Some(1));

        tx.request(2);
        assert_eq!(rx.next().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn request_made_before_waiting_is_not_lost() {
        let (tx, mut rx) = debounce_channel::<u32>(WINDOW);

        tx.request(7);
        assert_eq!(rx.next().await, Some(7));
        assert!(!tx.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_sender_cancels_a_pending_window() {
        let (tx, mut rx) = debounce_channel(WINDOW);
        tx.request(1);

        let waiter = tokio::spawn(async move { rx.next().await });
        sleep(Duration::from_millis(100)).await;
        drop(tx);

        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn request_reports_a_closed_receiver() {
        let (tx, rx) = debounce_channel(WINDOW);
        drop(rx);
        assert!(!tx.request(1));
    }
}
