//! Injectable randomness and timing for the simulation
//!
//! The service never calls `rand` or a clock directly for progress; it asks a
//! [`SimulationSource`]. Production uses [`RandomSource`], tests use
//! [`ScriptedSource`] for fully deterministic runs.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::settings::SimulationSettings;

/// Supplies progress increments, tick delays and coin flips
pub trait SimulationSource {
    /// Progress added by one tick, in percent
    fn progress_increment(&mut self) -> f64;

    /// How long to wait before the next tick
    fn tick_delay(&mut self) -> Duration;

    /// Whether the job about to start is doomed to fail
    fn job_fails(&mut self) -> bool;

    /// Whether a provider connection attempt succeeds
    fn connect_succeeds(&mut self) -> bool;
}

/// Random source mimicking a flaky remote service
#[derive(Debug)]
pub struct RandomSource<R: Rng = ThreadRng> {
    rng: R,
    failure_rate: f64,
    connect_success_rate: f64,
    realtime: bool,
}

impl RandomSource<ThreadRng> {
    /// Create a source backed by the thread-local RNG
    pub fn new(settings: &SimulationSettings) -> Self {
        Self::with_rng(rand::thread_rng(), settings)
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn with_rng(rng: R, settings: &SimulationSettings) -> Self {
        Self {
            rng,
            failure_rate: settings.failure_rate.clamp(0.0, 1.0),
            connect_success_rate: settings.connect_success_rate.clamp(0.0, 1.0),
            realtime: settings.realtime,
        }
    }

    /// Skip the sleeps between ticks
    pub fn instant(mut self) -> Self {
        self.realtime = false;
        self
    }
}

impl<R: Rng> SimulationSource for RandomSource<R> {
    fn progress_increment(&mut self) -> f64 {
        self.rng.gen_range(10.0..40.0)
    }

    fn tick_delay(&mut self) -> Duration {
        if self.realtime {
            Duration::from_millis(self.rng.gen_range(800..2000))
        } else {
            Duration::ZERO
        }
    }

    fn job_fails(&mut self) -> bool {
        self.rng.gen_bool(self.failure_rate)
    }

    fn connect_succeeds(&mut self) -> bool {
        self.rng.gen_bool(self.connect_success_rate)
    }
}

/// Deterministic source replaying queued answers
///
/// Once a queue runs dry it falls back to: increment 25, no failure,
/// successful connects. Delays are always zero.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    increments: VecDeque<f64>,
    failures: VecDeque<bool>,
    connects: VecDeque<bool>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_increments(mut self, increments: impl IntoIterator<Item = f64>) -> Self {
        self.increments.extend(increments);
        self
    }

    pub fn with_failures(mut self, failures: impl IntoIterator<Item = bool>) -> Self {
        self.failures.extend(failures);
        self
    }

    pub fn with_connects(mut self, connects: impl IntoIterator<Item = bool>) -> Self {
        self.connects.extend(connects);
        self
    }
}

impl SimulationSource for ScriptedSource {
    fn progress_increment(&mut self) -> f64 {
        self.increments.pop_front().unwrap_or(25.0)
    }

    fn tick_delay(&mut self) -> Duration {
        Duration::ZERO
    }

    fn job_fails(&mut self) -> bool {
        self.failures.pop_front().unwrap_or(false)
    }

    fn connect_succeeds(&mut self) -> bool {
        self.connects.pop_front().unwrap_or(true)
    }
}
