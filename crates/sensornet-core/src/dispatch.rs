// ── Debounced request dispatcher ──
//
// Coalesces rapid changes into a single dispatch per logical stream.
// Last write wins: scheduling again before the timer fires cancels the
// previous timer. A zero delay dispatches immediately.
//
// A timer that has already fired cannot take its value back, so every
// delivery carries the generation of the `schedule` call that armed it.
// The receiver passes deliveries through [`Debouncer::accept`], which
// drops anything a later `schedule` has superseded.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A value delivered by the dispatcher, tagged with its generation.
#[derive(Debug)]
pub struct Scheduled<T> {
    generation: u64,
    value: T,
}

/// Delivers values into an mpsc channel after a quiet period.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Scheduled<T>>,
    pending: Option<CancellationToken>,
    parent: CancellationToken,
    generation: u64,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Timers are children of `parent`, so cancelling it stops any armed
    /// timer as well.
    pub fn new(tx: mpsc::UnboundedSender<Scheduled<T>>, parent: CancellationToken) -> Self {
        Self {
            tx,
            pending: None,
            parent,
            generation: 0,
        }
    }

    /// Arm a timer delivering `value` after `delay`, cancelling any timer
    /// that has not fired yet. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, value: T, delay: Duration) {
        self.cancel_pending();
        self.generation += 1;
        let scheduled = Scheduled {
            generation: self.generation,
            value,
        };

        if delay.is_zero() {
            let _ = self.tx.send(scheduled);
            return;
        }

        let token = self.parent.child_token();
        self.pending = Some(token.clone());
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(scheduled);
                }
            }
        });
    }

    /// Unwrap a delivery, or `None` if a later `schedule` superseded it.
    pub fn accept(&self, delivered: Scheduled<T>) -> Option<T> {
        (delivered.generation == self.generation).then_some(delivered.value)
    }

    /// Cancel the armed timer, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    type Rx = mpsc::UnboundedReceiver<Scheduled<u32>>;

    fn debouncer() -> (Debouncer<u32>, Rx) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(tx, CancellationToken::new()), rx)
    }

    fn next(debouncer: &Debouncer<u32>, rx: &mut Rx) -> Option<u32> {
        rx.try_recv().ok().and_then(|d| debouncer.accept(d))
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_schedules_collapse_to_last_value() {
        let (mut debouncer, mut rx) = debouncer();
        let delay = Duration::from_millis(500);

        for value in 1..=5 {
            debouncer.schedule(value, delay);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(next(&debouncer, &mut rx), Some(5));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_dispatches_immediately_and_cancels_timer() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.schedule(1, Duration::from_millis(500));
        debouncer.schedule(2, Duration::ZERO);
        assert_eq!(next(&debouncer, &mut rx), Some(2));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_before_quiet_period() {
        let (mut debouncer, mut rx) = debouncer();
        debouncer.schedule(7, Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(next(&debouncer, &mut rx), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_superseded_before_receipt_is_dropped() {
        let (mut debouncer, mut rx) = debouncer();

        // The first timer fires, then a newer schedule arms before the
        // receiver gets to the delivered value.
        debouncer.schedule(1, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.schedule(2, Duration::from_millis(100));

        let late = rx.try_recv().unwrap();
        assert_eq!(debouncer.accept(late), None);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(next(&debouncer, &mut rx), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_parent_stops_armed_timer() {
        let parent = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<Scheduled<u32>>();
        let mut debouncer = Debouncer::new(tx, parent.clone());

        debouncer.schedule(3, Duration::from_millis(200));
        parent.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
