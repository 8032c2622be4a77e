//! Synthetic generation progress.
//!
//! The caption engine gives no incremental signal, so while a request is
//! outstanding the UI shows a simulated percentage: a fixed step on a fixed
//! interval, capped below 100 so completion is never faked. When the real
//! result arrives the value snaps to 100 regardless of success or failure.
//!
//! The simulated value is advisory display state only; the session's
//! supersession logic never consults it.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Ceiling for simulated progress; the last 5% belong to the real result.
pub const SIMULATED_CAP: u8 = 95;

/// Default advance per tick.
pub const DEFAULT_STEP: u8 = 5;

/// Default tick interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(150);

/// Monotonically increasing, capped synthetic progress value.
#[derive(Clone, Copy, Debug)]
pub struct ProgressSimulator {
    value: u8,
    step: u8,
}

impl ProgressSimulator {
    pub fn new(step: u8) -> Self {
        Self { value: 0, step }
    }

    /// Advances by one step, saturating at [`SIMULATED_CAP`].
    pub fn tick(&mut self) -> u8 {
        self.value = (self.value.saturating_add(self.step)).min(SIMULATED_CAP);
        self.value
    }

    /// Snaps to 100 once the real result arrives.
    pub fn finish(&mut self) -> u8 {
        self.value = 100;
        self.value
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

/// A scoped timer driving a [`ProgressSimulator`] on a background task.
///
/// The task is aborted when the ticker is dropped, so holding it for exactly
/// the lifetime of an outstanding request guarantees cleanup on every exit
/// path: success, failure, or teardown.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawns the ticker task and returns it with a receiver for the values.
    ///
    /// The receiver starts at 0 and observes each tick; it keeps reporting the
    /// last value after the ticker is dropped.
    pub fn spawn(step: u8, interval: Duration) -> (Self, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(0u8);
        let handle = tokio::spawn(async move {
            let mut simulator = ProgressSimulator::new(step);
            let mut timer = tokio::time::interval(interval);
            timer.tick().await; // first tick completes immediately
            loop {
                timer.tick().await;
                if tx.send(simulator.tick()).is_err() {
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulator_caps_below_completion() {
        let mut sim = ProgressSimulator::new(30);
        let values: Vec<u8> = (0..6).map(|_| sim.tick()).collect();
        assert_eq!(values, vec![30, 60, 90, 95, 95, 95]);
    }

    #[test]
    fn finish_snaps_to_100() {
        let mut sim = ProgressSimulator::new(10);
        sim.tick();
        assert_eq!(sim.finish(), 100);
        assert_eq!(sim.value(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_emits_capped_increasing_values() {
        let (_ticker, mut rx) = ProgressTicker::spawn(40, Duration::from_millis(10));
        let mut seen = Vec::new();
        for _ in 0..4 {
            rx.changed().await.unwrap();
            seen.push(*rx.borrow());
        }
        assert_eq!(seen, vec![40, 80, 95, 95]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_stops_the_task() {
        let (ticker, mut rx) = ProgressTicker::spawn(10, Duration::from_millis(10));
        rx.changed().await.unwrap();
        drop(ticker);

        // With the task aborted the sender is gone; once the remaining value
        // is drained the channel reports closure instead of ticking forever.
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(drained.is_ok(), "ticker kept running after drop");
    }
}
