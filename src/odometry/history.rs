//! Time-indexed pose history.
//!
//! A background thread samples a pose source at a fixed cadence into a
//! small ring buffer, letting latency-compensated consumers (e.g. vision
//! processing) ask "where was the chassis N milliseconds ago". Lookups
//! return the nearest stored sample or nothing; no interpolation.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::types::PoseSample;
use crate::hal::Clock;

/// History capacity and sampling cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of samples retained; oldest evicted first.
    pub capacity: usize,
    /// Sampling interval in microseconds.
    pub sample_interval_us: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            sample_interval_us: 50_000,
        }
    }
}

/// Fixed-capacity newest-first ring of pose samples.
///
/// Pure data structure; the sampler thread owns one behind a mutex.
#[derive(Debug)]
pub struct HistoryBuffer {
    samples: VecDeque<PoseSample>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the newest sample, if any.
    pub fn last_timestamp_us(&self) -> Option<u64> {
        self.samples.front().map(|s| s.timestamp_us)
    }

    /// Insert a sample at the front, evicting the oldest when full.
    pub fn record(&mut self, sample: PoseSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_back();
        }
        self.samples.push_front(sample);
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Find the stored sample nearest to `timestamp_us`, assuming samples
    /// are spaced `interval_us` apart: the requested age is rounded to a
    /// whole number of intervals and used as a direct index. Out-of-range
    /// requests (older than the buffer, or before any sample) yield `None`.
    pub fn lookup(&self, timestamp_us: u64, interval_us: u64) -> Option<PoseSample> {
        let last = self.last_timestamp_us()?;
        if timestamp_us > last {
            return None;
        }
        let age = last - timestamp_us;
        let offset = ((age as f64 / interval_us as f64).round()) as usize;
        self.samples.get(offset).copied()
    }
}

#[derive(Debug)]
struct HistoryState {
    running: bool,
    enabled: bool,
    buffer: HistoryBuffer,
}

#[derive(Debug)]
struct HistoryShared {
    state: Mutex<HistoryState>,
    cond: Condvar,
}

/// Background pose sampler.
///
/// Disabled on construction; [`enable`](Self::enable) starts recording
/// from a clean buffer. The sampler blocks on a condvar while disabled,
/// so an idle history costs nothing but a parked thread.
pub struct PositionHistory {
    config: HistoryConfig,
    shared: Arc<HistoryShared>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PositionHistory {
    /// Spawn the sampler thread.
    ///
    /// `source` returns `(heading_deg, x, y)` and is called only from the
    /// sampler thread, at most once per interval, never while disabled.
    pub fn spawn<F>(config: HistoryConfig, source: F, clock: Arc<dyn Clock>) -> Self
    where
        F: Fn() -> (f32, f32, f32) + Send + 'static,
    {
        let shared = Arc::new(HistoryShared {
            state: Mutex::new(HistoryState {
                running: true,
                enabled: false,
                buffer: HistoryBuffer::new(config.capacity),
            }),
            cond: Condvar::new(),
        });

        let thread_shared = shared.clone();
        let interval = Duration::from_micros(config.sample_interval_us);
        let handle = thread::Builder::new()
            .name("position-history".into())
            .spawn(move || {
                Self::sampler_loop(thread_shared, source, clock, interval);
            })
            .expect("failed to spawn position-history thread");

        Self {
            config,
            shared,
            handle: Some(handle),
        }
    }

    fn sampler_loop<F>(
        shared: Arc<HistoryShared>,
        source: F,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) where
        F: Fn() -> (f32, f32, f32),
    {
        debug!("position-history sampler started");
        let mut state = shared.state.lock().unwrap();
        loop {
            while state.running && !state.enabled {
                state = shared.cond.wait(state).unwrap();
            }
            if !state.running {
                break;
            }

            // Sample outside the lock so a slow source never stalls readers.
            drop(state);
            let (heading_deg, x, y) = source();
            let timestamp_us = clock.now_us();

            state = shared.state.lock().unwrap();
            if state.running && state.enabled {
                state.buffer.record(PoseSample {
                    heading_deg,
                    x,
                    y,
                    timestamp_us,
                });
            }

            let (next, _timeout) = shared.cond.wait_timeout(state, interval).unwrap();
            state = next;
            if !state.running {
                break;
            }
        }
        debug!("position-history sampler stopped");
    }

    /// Start recording from a clean buffer. Safe to call repeatedly.
    pub fn enable(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.buffer.clear();
        state.enabled = true;
        self.shared.cond.notify_all();
        info!("position history enabled");
    }

    /// Stop recording. Safe at any time; a sample in flight when this is
    /// called is discarded under the lock.
    pub fn disable(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.enabled = false;
        state.buffer.clear();
    }

    /// True while recording.
    pub fn is_enabled(&self) -> bool {
        self.shared.state.lock().unwrap().enabled
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.shared.state.lock().unwrap().buffer.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pose nearest to `timestamp_us`, or `None` when the history has no
    /// sample close enough (disabled, warming up, or too far in the past).
    pub fn get_position(&self, timestamp_us: u64) -> Option<PoseSample> {
        self.shared
            .state
            .lock()
            .unwrap()
            .buffer
            .lookup(timestamp_us, self.config.sample_interval_us)
    }

    /// Stop the sampler and join its thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            {
                let mut state = self.shared.state.lock().unwrap();
                state.running = false;
                state.enabled = false;
            }
            self.shared.cond.notify_all();
            let _ = handle.join();
        }
    }
}

impl Drop for PositionHistory {
    fn drop(&mut self) {
        self.stop();
    }
}
