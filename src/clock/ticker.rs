/*!
 * Clock Ticker
 * Background thread driving automatic ticks at a fixed cadence
 */

use super::Shared;
use flume::{Receiver, RecvTimeoutError, Sender};
use std::io;
use std::sync::atomic::Ordering;
use std::sync::Weak;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handle to the running tick loop
pub(super) struct Ticker {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl Ticker {
    /// Spawn the tick loop. The loop holds only a weak reference to the clock,
    /// so dropping every clock handle also ends it.
    pub(super) fn spawn(shared: Weak<Shared>, interval: Duration) -> io::Result<Self> {
        let (stop_tx, stop_rx) = flume::bounded::<()>(1);
        let (done_tx, done_rx) = flume::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("clock-tick".to_string())
            .spawn(move || {
                run_tick_loop(shared, interval, stop_rx);
                let _ = done_tx.send(());
            })?;

        let thread_id = handle.thread().id();
        info!(interval_ms = interval.as_millis() as u64, "Clock ticker started");

        Ok(Self {
            stop_tx,
            done_rx,
            handle: Some(handle),
            thread_id,
        })
    }

    /// Interrupt the loop's sleep and wait for it to exit, at most `timeout`.
    ///
    /// Called from the tick thread itself (a listener stopping the clock), it
    /// only signals and hands the handle back: the loop exits once the current
    /// tick returns, and a later call from another thread joins it.
    pub(super) fn shutdown(mut self, timeout: Duration) -> Option<Ticker> {
        let _ = self.stop_tx.try_send(());

        if thread::current().id() == self.thread_id {
            debug!("Clock stop requested from the tick thread; loop exits after this tick");
            return Some(self);
        }

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        warn!("Clock ticker thread panicked");
                    }
                }
                info!("Clock ticker stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Clock ticker did not exit in time; detaching"
                );
            }
        }
        None
    }
}

/// Sleep, re-check the running flag, tick, repeat
fn run_tick_loop(shared: Weak<Shared>, interval: Duration, stop_rx: Receiver<()>) {
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        shared.tick();
    }
    debug!("Clock tick loop exited");
}
