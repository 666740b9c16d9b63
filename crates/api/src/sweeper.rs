//! Background overdue sweep.
//!
//! A dedicated thread flags overdue loans on a fixed cadence. Route handlers
//! can also nudge it after a write via `trigger`, and triggers are coalesced
//! so a burst of writes causes at most one extra sweep.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// The unit of work the sweeper runs. Implemented by the service layer.
pub trait SweepExecutor: Send + Sync + 'static {
    /// Returns how many records were newly flagged.
    fn run_sweep(&self) -> anyhow::Result<usize>;
}

/// Config for the overdue sweeper.
#[derive(Debug, Clone)]
pub struct OverdueSweeper {
    pub interval: Duration,
}

impl Default for OverdueSweeper {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

/// Handle for the running sweeper (shutdown + trigger hook).
#[derive(Debug)]
pub struct OverdueSweeperHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl OverdueSweeperHandle {
    /// Request a sweep outside the regular cadence.
    ///
    /// Backpressure: triggers are coalesced (bounded queue). If a sweep is
    /// already pending, this becomes a no-op.
    pub fn trigger(&self) {
        // Coalesce: channel capacity=1; ignore if already full.
        let _ = self.trigger.try_send(());
    }

    /// Gracefully stop the sweeper thread.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl OverdueSweeper {
    /// Spawn the sweeper thread.
    ///
    /// - Schedule: runs every `interval`, once immediately on startup
    /// - Event-trigger: call `handle.trigger()` after circulation writes
    /// - Failures: logged; the cadence continues
    pub fn spawn<S>(&self, name: &'static str, executor: Arc<S>) -> OverdueSweeperHandle
    where
        S: SweepExecutor,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || sweeper_loop(name, cfg, shutdown_rx, trigger_rx, executor))
            .expect("failed to spawn overdue sweeper thread");

        OverdueSweeperHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        }
    }
}

fn sweeper_loop<S>(
    name: &'static str,
    cfg: OverdueSweeper,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    executor: Arc<S>,
) where
    S: SweepExecutor,
{
    info!(sweeper = name, "overdue sweeper started");

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = true; // run once on startup

    loop {
        // Shutdown has priority.
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            // Keep a stable cadence even if we were delayed.
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        // Event-trigger: non-blocking drain to coalesce multiple triggers.
        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if !pending {
            // Wait until next tick or trigger or shutdown.
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(250));
            thread::sleep(sleep_for);
            continue;
        }

        pending = false;

        match executor.run_sweep() {
            Ok(0) => {}
            Ok(flagged) => {
                info!(sweeper = name, flagged, "overdue sweep flagged records");
            }
            Err(e) => {
                warn!(sweeper = name, error = ?e, "overdue sweep failed");
            }
        }
    }

    info!(sweeper = name, "overdue sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExecutor {
        runs: AtomicUsize,
    }

    impl SweepExecutor for CountingExecutor {
        fn run_sweep(&self) -> anyhow::Result<usize> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[test]
    fn runs_on_startup_and_on_trigger() {
        let executor = Arc::new(CountingExecutor {
            runs: AtomicUsize::new(0),
        });
        let sweeper = OverdueSweeper {
            interval: Duration::from_secs(3600),
        };
        let handle = sweeper.spawn("test-sweeper", executor.clone());

        // Startup sweep.
        let deadline = Instant::now() + Duration::from_secs(2);
        while executor.runs.load(Ordering::SeqCst) < 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(executor.runs.load(Ordering::SeqCst) >= 1);

        // Triggered sweep.
        handle.trigger();
        let deadline = Instant::now() + Duration::from_secs(2);
        while executor.runs.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(executor.runs.load(Ordering::SeqCst) >= 2);

        handle.shutdown();
    }

    #[test]
    fn shutdown_stops_the_thread() {
        let executor = Arc::new(CountingExecutor {
            runs: AtomicUsize::new(0),
        });
        let handle = OverdueSweeper::default().spawn("test-sweeper-stop", executor);
        handle.shutdown();
    }
}
