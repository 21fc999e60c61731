//! Search result types and statistics

use crate::search::config::Algorithm;
use crate::search::{Cost, SearchDomain};
use serde::Serialize;
use std::time::Duration;

/// Per-engine or per-worker event counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// States seen for the first time
    pub generated: u64,
    /// Nodes popped from an open set
    pub expanded: u64,
    /// Largest open-set size observed
    pub max_open_set: u64,
    /// Nodes created and queued
    pub nodes_new: u64,
    /// Closed nodes queued again after a cheaper path was found
    pub nodes_reinserted: u64,
    /// Paths ignored because they were not cheaper
    pub paths_worse_or_equal: u64,
    /// Paths that relaxed an existing node
    pub paths_better: u64,
    /// Nodes discarded because they could not beat the best solution
    pub pruned: u64,
    /// Successors lost to allocation failures
    pub dropped_messages: u64,
}

impl Counters {
    /// Add another set of counters into this one. Open-set maxima are summed,
    /// giving the combined peak frontier across workers.
    pub fn merge(&mut self, other: &Counters) {
        self.generated += other.generated;
        self.expanded += other.expanded;
        self.max_open_set += other.max_open_set;
        self.nodes_new += other.nodes_new;
        self.nodes_reinserted += other.nodes_reinserted;
        self.paths_worse_or_equal += other.paths_worse_or_equal;
        self.paths_better += other.paths_better;
        self.pruned += other.pruned;
        self.dropped_messages += other.dropped_messages;
    }

    pub fn observe_open_set(&mut self, size: usize) {
        self.max_open_set = self.max_open_set.max(size as u64);
    }
}

/// Statistics reported by one parallel worker
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerStatistics {
    pub worker_id: usize,
    /// Times the worker ran out of local work and went idle
    pub idle_periods: u64,
    #[serde(flatten)]
    pub counters: Counters,
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatistics {
    /// Engine used for the search
    pub algorithm: Algorithm,
    /// Whether the parallel engine stopped at its first solution
    pub stop_on_first_solution: bool,
    /// Total time spent searching
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed_time: Duration,
    /// Whether the search was cut short by its timeout
    pub timed_out: bool,
    /// Distinct states interned
    pub states_interned: u64,
    /// Distinct nodes created
    pub nodes_created: u64,
    /// Totals across the whole search
    #[serde(flatten)]
    pub counters: Counters,
    /// Per-worker breakdown (empty for the sequential engine)
    pub workers: Vec<WorkerStatistics>,
}

fn serialize_seconds<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl SearchStatistics {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Fold per-worker statistics into the totals.
    pub fn absorb_workers(&mut self, workers: Vec<WorkerStatistics>) {
        for worker in &workers {
            self.counters.merge(&worker.counters);
        }
        self.workers = workers;
    }

    /// Nodes expanded per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.counters.expanded as f64 / secs
        }
    }
}

/// Best path found by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// Sum of the step distances along `path`
    pub cost: Cost,
    /// State payloads from the initial state to the goal, inclusive
    #[serde(skip)]
    pub path: Vec<Vec<u8>>,
}

impl Solution {
    /// Build a solution from the states on a path, costing every step with
    /// the domain's step distance.
    pub fn from_path<D: SearchDomain + ?Sized>(domain: &D, path: Vec<Vec<u8>>) -> Self {
        let cost = path
            .windows(2)
            .map(|step| domain.distance(&step[0], &step[1]))
            .fold(0, Cost::saturating_add);
        Self { cost, path }
    }

    pub fn goal(&self) -> Option<&[u8]> {
        self.path.last().map(Vec::as_slice)
    }

    /// Number of moves on the path
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Result of a search operation
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The best solution found (if any)
    pub solution: Option<Solution>,
    /// Statistics from the search
    pub statistics: SearchStatistics,
}

impl SearchResult {
    pub fn found(&self) -> bool {
        self.solution.is_some()
    }

    pub fn cost(&self) -> Option<Cost> {
        self.solution.as_ref().map(|s| s.cost)
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let stats = &self.statistics;
        let c = &stats.counters;
        let mut s = String::new();

        match stats.algorithm {
            Algorithm::Sequential => s.push_str("Method: sequential\n"),
            Algorithm::Parallel if stats.stop_on_first_solution => {
                s.push_str("Method: parallel, first solution\n")
            }
            Algorithm::Parallel => s.push_str("Method: parallel, best solution\n"),
        }
        match &self.solution {
            Some(solution) => {
                s.push_str(&format!("Result: solution found, cost: {}\n", solution.cost))
            }
            None => s.push_str("Result: no solution found\n"),
        }
        if stats.timed_out {
            s.push_str("Search stopped by timeout\n");
        }

        s.push_str("Global statistics:\n");
        s.push_str(&format!("- States generated: {}\n", c.generated));
        s.push_str(&format!("- States expanded: {}\n", c.expanded));
        s.push_str(&format!("- Max open set size: {}\n", c.max_open_set));
        s.push_str(&format!("- New nodes: {}\n", c.nodes_new));
        s.push_str(&format!("- Reinserted nodes: {}\n", c.nodes_reinserted));
        s.push_str(&format!(
            "- Worse or equal paths (ignored): {}\n",
            c.paths_worse_or_equal
        ));
        s.push_str(&format!("- Better paths (updated): {}\n", c.paths_better));
        if c.pruned > 0 {
            s.push_str(&format!("- Pruned nodes: {}\n", c.pruned));
        }
        if c.dropped_messages > 0 {
            s.push_str(&format!("- Dropped successors: {}\n", c.dropped_messages));
        }
        s.push_str(&format!(
            "- Execution time: {:.6}s\n",
            stats.elapsed_time.as_secs_f64()
        ));

        if !stats.workers.is_empty() {
            s.push_str("Worker statistics:\n");
            for worker in &stats.workers {
                let w = &worker.counters;
                s.push_str(&format!("- Worker #{}\n", worker.worker_id + 1));
                s.push_str(&format!(
                    "  * States generated: {}, States expanded: {}\n",
                    w.generated, w.expanded
                ));
                s.push_str(&format!(
                    "  * Max open set: {}, New nodes: {}, Reinserted nodes: {}, \
                     Worse paths (ignored): {}, Better paths (updated): {}\n",
                    w.max_open_set,
                    w.nodes_new,
                    w.nodes_reinserted,
                    w.paths_worse_or_equal,
                    w.paths_better
                ));
            }
        }

        s
    }

    /// Single semicolon-separated line:
    /// `"found";cost;generated;expanded;max_open;new;reinserted;worse;better;seconds`
    pub fn csv_line(&self) -> String {
        let c = &self.statistics.counters;
        format!(
            "\"{}\";{};{};{};{};{};{};{};{};{:.6}",
            if self.found() { "yes" } else { "no" },
            self.cost().unwrap_or(0),
            c.generated,
            c.expanded,
            c.max_open_set,
            c.nodes_new,
            c.nodes_reinserted,
            c.paths_worse_or_equal,
            c.paths_better,
            self.statistics.elapsed_time.as_secs_f64()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Arena;
    use crate::search::Successors;
    use crate::search::test_domains::Line;
    use crate::store::node::NodeTable;
    use crate::store::state::{DEFAULT_TABLE_CAPACITY, StateStore};

    /// Entering a state costs its byte value.
    struct Toll;

    impl SearchDomain for Toll {
        fn state_size(&self) -> usize {
            1
        }

        fn heuristic(&self, _state: &[u8], _goal: Option<&[u8]>) -> Cost {
            0
        }

        fn expand(&self, _state: &[u8], _out: &mut Successors) {}

        fn is_goal(&self, _state: &[u8], _goal: Option<&[u8]>) -> bool {
            false
        }

        fn distance(&self, _from: &[u8], to: &[u8]) -> Cost {
            Cost::from(to[0])
        }
    }

    fn sample_result() -> SearchResult {
        let mut statistics = SearchStatistics::new(Algorithm::Parallel);
        statistics.elapsed_time = Duration::from_millis(1500);
        statistics.absorb_workers(vec![
            WorkerStatistics {
                worker_id: 0,
                idle_periods: 1,
                counters: Counters {
                    generated: 10,
                    expanded: 7,
                    max_open_set: 4,
                    nodes_new: 10,
                    paths_better: 1,
                    ..Default::default()
                },
            },
            WorkerStatistics {
                worker_id: 1,
                idle_periods: 1,
                counters: Counters {
                    generated: 5,
                    expanded: 3,
                    max_open_set: 2,
                    nodes_new: 5,
                    paths_worse_or_equal: 6,
                    ..Default::default()
                },
            },
        ]);
        SearchResult {
            solution: Some(Solution {
                cost: 4,
                path: vec![vec![0]; 5],
            }),
            statistics,
        }
    }

    #[test]
    fn test_absorb_workers_sums_counters() {
        let result = sample_result();
        let c = &result.statistics.counters;
        assert_eq!(c.generated, 15);
        assert_eq!(c.expanded, 10);
        assert_eq!(c.max_open_set, 6);
        assert_eq!(c.paths_better, 1);
        assert_eq!(c.paths_worse_or_equal, 6);
        assert_eq!(result.statistics.workers.len(), 2);
    }

    #[test]
    fn test_csv_line() {
        let result = sample_result();
        assert_eq!(result.csv_line(), "\"yes\";4;15;10;6;15;0;6;1;1.500000");

        let empty = SearchResult {
            solution: None,
            statistics: SearchStatistics::default(),
        };
        assert!(empty.csv_line().starts_with("\"no\";0;"));
    }

    #[test]
    fn test_summary_mentions_workers() {
        let summary = sample_result().format_summary();
        assert!(summary.contains("solution found, cost: 4"));
        assert!(summary.contains("Worker #2"));
        assert!(summary.contains("best solution"));
    }

    #[test]
    fn test_json_report() {
        let json = sample_result().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["solution"]["cost"], 4);
        assert_eq!(value["statistics"]["algorithm"], "parallel");
        assert_eq!(value["statistics"]["expanded"], 10);
        assert_eq!(value["statistics"]["workers"][1]["worker_id"], 1);
    }

    #[test]
    fn test_solution_steps_and_throughput() {
        let result = sample_result();
        let solution = result.solution.as_ref().unwrap();
        assert_eq!(solution.steps(), 4);
        assert_eq!(solution.goal(), Some(&[0u8][..]));
        assert!((result.statistics.throughput() - 10.0 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_solution_cost_sums_step_distances() {
        let solution = Solution::from_path(&Toll, vec![vec![0], vec![3], vec![5]]);
        assert_eq!(solution.cost, 8);
        assert_eq!(solution.steps(), 2);
        assert_eq!(Solution::from_path(&Toll, vec![vec![7]]).cost, 0);
    }

    #[test]
    fn test_solution_cost_follows_reported_path() {
        let states = Arena::new("state");
        let nodes = Arena::new("node");
        let store = StateStore::new(&states, 1, DEFAULT_TABLE_CAPACITY, 1);
        let table = NodeTable::new(&nodes, DEFAULT_TABLE_CAPACITY, 1);
        let (a, _) = table.get_or_create(store.intern(&[0]).unwrap()).unwrap();
        let (b, _) = table.get_or_create(store.intern(&[1]).unwrap()).unwrap();
        let (c, _) = table.get_or_create(store.intern(&[2]).unwrap()).unwrap();

        // c was reached through a costlier b, then b was relaxed
        b.set_link(4, 0, Some(a));
        c.set_link(5, 0, Some(b));
        b.set_link(1, 0, Some(a));

        let path = c.path(10).iter().map(|s| s.bytes().to_vec()).collect();
        let solution = Solution::from_path(&Line { len: 3 }, path);
        assert_eq!(solution.cost, 2);
        assert_eq!(solution.steps(), 2);
        assert_eq!(c.g(), 5);
    }
}
