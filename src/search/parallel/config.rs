//! Configuration for parallel search execution.

use std::time::Duration;

/// Default interval at which the scheduler re-checks termination.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Default time an idle worker blocks on its mailbox before re-checking.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(1);

/// Configuration for parallel search execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Stop as soon as any solution is found instead of proving optimality.
    pub stop_on_first_solution: bool,
    /// How long the scheduler waits for a worker event between checks.
    pub poll_interval: Duration,
    /// How long an idle worker blocks on its mailbox between checks.
    pub idle_wait: Duration,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get().max(1),
            stop_on_first_solution: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            idle_wait: DEFAULT_IDLE_WAIT,
        }
    }
}

impl ParallelConfig {
    /// Set the number of workers (at least one).
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Stop at the first solution found.
    pub fn with_stop_on_first_solution(mut self, enabled: bool) -> Self {
        self.stop_on_first_solution = enabled;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_idle_wait(mut self, wait: Duration) -> Self {
        self.idle_wait = wait;
        self
    }
}
