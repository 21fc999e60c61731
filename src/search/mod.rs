//! A* search engines over opaque fixed-size states
//!
//! This module provides two engines sharing one storage model:
//! - Sequential: single-threaded A* with one global open set
//! - Parallel: hash-partitioned A* where each worker owns the states that hash
//!   to it and successors are routed between workers through mailboxes
//!
//! Problems plug in through [`SearchDomain`].

pub mod config;
pub mod heap;
pub mod parallel;
pub mod result;
pub mod sequential;

pub use config::{Algorithm, SearchConfig};
pub use parallel::{ParallelConfig, run_parallel_search};
pub use result::{Counters, SearchResult, SearchStatistics, Solution, WorkerStatistics};
pub use sequential::SequentialSearch;

use crate::error::Result;

/// Integer path and heuristic cost.
pub type Cost = u32;

/// A search problem over fixed-size byte states.
///
/// Implementations must be pure over their arguments: the parallel engine
/// calls them concurrently from every worker.
pub trait SearchDomain: Sync {
    /// Size in bytes of every state payload.
    fn state_size(&self) -> usize;

    /// Admissible estimate of the remaining cost from `state` to the goal.
    fn heuristic(&self, state: &[u8], goal: Option<&[u8]>) -> Cost;

    /// Append every successor of `state` to `out`.
    fn expand(&self, state: &[u8], out: &mut Successors);

    /// Whether `state` satisfies the goal.
    fn is_goal(&self, state: &[u8], goal: Option<&[u8]>) -> bool;

    /// Step cost between two adjacent states.
    fn distance(&self, _from: &[u8], _to: &[u8]) -> Cost {
        1
    }
}

/// Flat buffer of successor payloads, all of one state size.
#[derive(Debug, Clone)]
pub struct Successors {
    state_size: usize,
    bytes: Vec<u8>,
}

impl Successors {
    pub fn new(state_size: usize) -> Self {
        Self {
            state_size: state_size.max(1),
            bytes: Vec::new(),
        }
    }

    /// Append a successor. Payloads of the wrong size are ignored and
    /// reported with `false`.
    pub fn push(&mut self, state: &[u8]) -> bool {
        if state.len() != self.state_size {
            log::debug!(
                "ignoring successor of {} bytes, expected {}",
                state.len(),
                self.state_size
            );
            return false;
        }
        self.bytes.extend_from_slice(state);
        true
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.state_size
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes.chunks_exact(self.state_size)
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Solve with the sequential engine, or with the parallel engine when a
/// parallel configuration is supplied.
pub fn solve<D: SearchDomain + ?Sized>(
    domain: &D,
    initial: &[u8],
    goal: Option<&[u8]>,
    config: &SearchConfig,
    parallel: Option<&ParallelConfig>,
) -> Result<SearchResult> {
    match parallel {
        Some(parallel) => run_parallel_search(domain, initial, goal, config, parallel),
        None => SequentialSearch::new(config.clone()).search(domain, initial, goal),
    }
}


#[cfg(test)]
mod tests {
    use super::test_domains::Line;
    use super::*;

    #[test]
    fn test_successors_buffer() {
        let mut out = Successors::new(2);
        assert!(out.is_empty());
        assert!(out.push(&[1, 2]));
        assert!(!out.push(&[1, 2, 3]));
        assert!(out.push(&[3, 4]));
        assert_eq!(out.len(), 2);
        let all: Vec<&[u8]> = out.iter().collect();
        assert_eq!(all, vec![&[1, 2][..], &[3, 4][..]]);
        out.clear();
        assert!(out.is_empty());
    }

    #[test]
    fn test_solve_dispatches_both_engines() {
        let line = Line { len: 6 };
        let config = SearchConfig::default();

        let seq = solve(&line, &[0], None, &config, None).unwrap();
        assert_eq!(seq.statistics.algorithm, Algorithm::Sequential);
        assert_eq!(seq.cost(), Some(5));

        let parallel = ParallelConfig::default().with_workers(2);
        let par = solve(&line, &[0], None, &config, Some(&parallel)).unwrap();
        assert_eq!(par.statistics.algorithm, Algorithm::Parallel);
        assert_eq!(par.cost(), Some(5));
    }
}
