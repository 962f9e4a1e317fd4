//! Named countdown timers.
//!
//! Each timer counts down on its own thread. The threads share nothing with
//! the shell except the map of remaining ticks and a channel on which they
//! announce expiry; the filesystem is never touched from here.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Timer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer {name} already running ({remaining}s left)")]
    AlreadyRunning { name: String, remaining: u64 },

    #[error("no timer named {0}")]
    Unknown(String),

    #[error("timer duration must be positive")]
    ZeroDuration,
}

/// Outcome of checking a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running(u64),
    /// Finished; the timer has now been forgotten.
    Expired,
}

/// A set of named countdown timers.
pub struct Timers {
    remaining: Arc<Mutex<HashMap<String, u64>>>,
    tick: Duration,
    expired_tx: Sender<String>,
    expired_rx: Receiver<String>,
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("remaining", &*self.remaining.lock())
            .field("tick", &self.tick)
            .finish()
    }
}

impl Timers {
    /// Timers ticking once a second.
    pub fn new() -> Self {
        Self::with_tick(Duration::from_secs(1))
    }

    /// Timers ticking at a custom rate.
    pub fn with_tick(tick: Duration) -> Self {
        let (expired_tx, expired_rx) = mpsc::channel();
        Self {
            remaining: Arc::new(Mutex::new(HashMap::new())),
            tick,
            expired_tx,
            expired_rx,
        }
    }

    /// Start a countdown of `ticks` ticks.
    ///
    /// A finished timer of the same name may be restarted; a running one
    /// may not.
    pub fn start(&self, name: &str, ticks: u64) -> Result<(), TimerError> {
        if ticks == 0 {
            return Err(TimerError::ZeroDuration);
        }
        {
            let mut remaining = self.remaining.lock();
            if let Some(&left) = remaining.get(name) {
                if left > 0 {
                    return Err(TimerError::AlreadyRunning {
                        name: name.to_string(),
                        remaining: left,
                    });
                }
            }
            remaining.insert(name.to_string(), ticks);
        }

        let remaining = Arc::clone(&self.remaining);
        let expired = self.expired_tx.clone();
        let tick = self.tick;
        let name = name.to_string();
        thread::spawn(move || {
            loop {
                thread::sleep(tick);
                let mut map = remaining.lock();
                match map.get_mut(&name) {
                    Some(left) if *left > 1 => *left -= 1,
                    Some(left) => {
                        // Announce before the lock drops so a zero is never
                        // seen ahead of its expiry message.
                        *left = 0;
                        tracing::debug!(timer = %name, "timer expired");
                        let _ = expired.send(name);
                        return;
                    }
                    None => return,
                }
            }
        });
        Ok(())
    }

    /// Check a timer. A finished timer is reported once, then forgotten.
    pub fn check(&self, name: &str) -> Result<TimerStatus, TimerError> {
        let mut remaining = self.remaining.lock();
        match remaining.get(name).copied() {
            Some(0) => {
                remaining.remove(name);
                Ok(TimerStatus::Expired)
            }
            Some(left) => Ok(TimerStatus::Running(left)),
            None => Err(TimerError::Unknown(name.to_string())),
        }
    }

    /// Names of timers that expired since the last call.
    pub fn drain_expired(&self) -> Vec<String> {
        self.expired_rx.try_iter().collect()
    }

    /// Number of timers still counting down.
    pub fn running(&self) -> usize {
        self.remaining.lock().values().filter(|&&left| left > 0).count()
    }
}
