/*!
 * Simulation Clock
 * Logical tick counter with automatic and manual stepping
 *
 * A tick notifies every listener with the time of the interval about to
 * execute, then advances the counter by one. Listeners therefore see
 * tick 0 before any increment.
 */

mod listeners;
mod ticker;

pub use listeners::{Listener, ListenerId, ListenerRegistry};

use crate::core::errors::SimError;
use crate::core::types::{SimResult, Tick, CLOCK_JOIN_TIMEOUT_MS, DEFAULT_TICK_INTERVAL_MS};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use ticker::Ticker;
use tracing::{error, trace, warn};

struct Shared {
    current_time: AtomicU64,
    running: AtomicBool,
    tick_interval: Duration,
    listeners: ListenerRegistry<Tick>,
    ticker: Mutex<Option<Ticker>>,
}

impl Shared {
    fn tick(&self) -> Tick {
        let now = self.current_time.load(Ordering::Acquire);
        let failures = self.listeners.notify(&now);
        if failures > 0 {
            trace!(time = now, failures, "Tick completed with listener failures");
        }
        self.current_time.fetch_add(1, Ordering::AcqRel);
        now
    }
}

/// Cloneable handle to a shared logical clock
///
/// Automatic mode (`start`/`stop`) and manual mode (`tick`) must not overlap:
/// stop the clock before stepping it by hand.
#[derive(Clone)]
pub struct Clock {
    shared: Arc<Shared>,
}

/// Non-owning clock handle, for listeners that need to reach back into the clock
#[derive(Clone)]
pub struct WeakClock {
    shared: Weak<Shared>,
}

impl WeakClock {
    pub fn upgrade(&self) -> Option<Clock> {
        self.shared.upgrade().map(|shared| Clock { shared })
    }
}

impl Clock {
    /// Create a stopped clock at time 0 with the default cadence
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }

    /// Create a stopped clock ticking every `interval` in automatic mode (at least 1ms)
    pub fn with_interval(interval: Duration) -> Self {
        let tick_interval = interval.max(Duration::from_millis(1));
        Self {
            shared: Arc::new(Shared {
                current_time: AtomicU64::new(0),
                running: AtomicBool::new(false),
                tick_interval,
                listeners: ListenerRegistry::new(),
                ticker: Mutex::new(None),
            }),
        }
    }

    /// Begin automatic ticking. No-op if already running.
    pub fn start(&self) {
        // A loop stopped from its own thread may still be finishing its last tick
        let exiting = {
            let mut slot = self.shared.ticker.lock();
            if self.shared.running.load(Ordering::Acquire) {
                return;
            }
            slot.take()
        };
        if let Some(ticker) = exiting {
            self.retire(ticker);
        }

        let mut slot = self.shared.ticker.lock();
        if self.shared.running.load(Ordering::Acquire) {
            return;
        }
        if slot.is_some() {
            warn!("Previous tick loop has not exited; clock not restarted");
            return;
        }

        self.shared.running.store(true, Ordering::Release);
        match Ticker::spawn(Arc::downgrade(&self.shared), self.shared.tick_interval) {
            Ok(handle) => *slot = Some(handle),
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                error!(error = %e, "Failed to spawn clock ticker thread");
            }
        }
    }

    /// Halt automatic ticking and wait (bounded) for the tick loop to exit.
    ///
    /// No-op if no loop exists. When the loop already stopped itself from a
    /// listener, this still waits for its last tick to finish.
    pub fn stop(&self) {
        let ticker = {
            let mut slot = self.shared.ticker.lock();
            self.shared.running.store(false, Ordering::Release);
            slot.take()
        };

        if let Some(ticker) = ticker {
            self.retire(ticker);
        }
    }

    /// Shut a loop down; keep the handle if it cannot be joined from this thread
    fn retire(&self, ticker: Ticker) {
        if let Some(exiting) = ticker.shutdown(Duration::from_millis(CLOCK_JOIN_TIMEOUT_MS)) {
            let mut slot = self.shared.ticker.lock();
            if slot.is_none() {
                *slot = Some(exiting);
            }
        }
    }

    /// Perform exactly one tick synchronously. Returns the time the listeners observed.
    pub fn tick(&self) -> Tick {
        self.shared.tick()
    }

    /// Zero the clock. Only valid while stopped.
    pub fn reset(&self) -> SimResult<()> {
        let exiting = {
            let mut slot = self.shared.ticker.lock();
            if self.shared.running.load(Ordering::Acquire) {
                return Err(SimError::ClockRunning);
            }
            slot.take()
        };
        if let Some(ticker) = exiting {
            self.retire(ticker);
        }
        self.shared.current_time.store(0, Ordering::Release);
        Ok(())
    }

    /// Register a tick callback; it receives the time of the interval being executed
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Tick) + Send + Sync + 'static,
    {
        self.shared.listeners.add(move |now: &Tick| listener(*now))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    pub fn current_time(&self) -> Tick {
        self.shared.current_time.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn tick_interval(&self) -> Duration {
        self.shared.tick_interval
    }

    pub fn downgrade(&self) -> WeakClock {
        WeakClock {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("current_time", &self.current_time())
            .field("running", &self.is_running())
            .field("tick_interval", &self.shared.tick_interval)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
