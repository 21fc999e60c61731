//! Single-threaded A* search
//!
//! One global open set; successors are relaxed in place as soon as they are
//! generated. The first goal popped from the open set is optimal for an
//! admissible heuristic.

use crate::error::Result;
use crate::memory::Arena;
use crate::search::config::{Algorithm, SearchConfig};
use crate::search::heap::MinHeap;
use crate::search::result::{SearchResult, SearchStatistics, Solution};
use crate::search::{SearchDomain, Successors};
use crate::store::node::{NodeRef, NodeTable};
use crate::store::state::StateStore;
use std::time::Instant;

/// How many expansions run between two timeout checks.
const TIMEOUT_CHECK_INTERVAL: u64 = 256;

/// Sequential A* engine
pub struct SequentialSearch {
    config: SearchConfig,
    statistics: SearchStatistics,
}

impl Default for SequentialSearch {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SequentialSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            statistics: SearchStatistics::new(Algorithm::Sequential),
        }
    }

    /// Statistics of the most recent search.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Reset the statistics for a new search.
    pub fn reset(&mut self) {
        self.statistics = SearchStatistics::new(Algorithm::Sequential);
    }

    /// Search from `initial` until a goal is popped or the open set runs dry.
    pub fn search<D: SearchDomain + ?Sized>(
        &mut self,
        domain: &D,
        initial: &[u8],
        goal: Option<&[u8]>,
    ) -> Result<SearchResult> {
        self.reset();
        let start_time = Instant::now();
        let deadline = self.config.timeout.map(|t| start_time + t);
        let config = &self.config;

        let state_arena = Arena::with_page_capacity("state", config.page_capacity)
            .with_max_records(config.max_states);
        let node_arena = Arena::with_page_capacity("node", config.page_capacity)
            .with_max_records(config.max_nodes);
        let states = StateStore::new(
            &state_arena,
            domain.state_size(),
            config.table_capacity,
            config.shard_count,
        );
        let nodes = NodeTable::new(&node_arena, config.table_capacity, config.shard_count);

        let mut open_set: MinHeap<NodeRef<'_>> = MinHeap::new();
        let mut successors = Successors::new(domain.state_size());
        let stats = &mut self.statistics;

        let root_state = states.intern(initial)?;
        let (root, _) = nodes.get_or_create(root_state)?;
        let f = root.set_link(0, domain.heuristic(initial, goal), None);
        open_set.insert(f, root);

        let mut solution = None;
        while !open_set.is_empty() {
            if stats.counters.expanded % TIMEOUT_CHECK_INTERVAL == 0
                && deadline.is_some_and(|d| Instant::now() >= d)
            {
                log::info!(
                    "sequential search timed out after {} expansions",
                    stats.counters.expanded
                );
                stats.timed_out = true;
                break;
            }
            stats.counters.observe_open_set(open_set.len());

            let Some((_, current)) = open_set.pop_min() else {
                break;
            };
            stats.counters.expanded += 1;

            let current_state = current.state().bytes();
            if domain.is_goal(current_state, goal) {
                solution = Some(current);
                break;
            }

            successors.clear();
            domain.expand(current_state, &mut successors);
            let current_g = current.g();

            for payload in successors.iter() {
                let state = states.intern(payload)?;
                let (child, is_new) = nodes.get_or_create(state)?;
                let g_attempt = current_g.saturating_add(domain.distance(current_state, payload));

                if is_new {
                    let f = child.set_link(
                        g_attempt,
                        domain.heuristic(payload, goal),
                        Some(current),
                    );
                    open_set.insert(f, child);
                    stats.counters.generated += 1;
                    stats.counters.nodes_new += 1;
                    continue;
                }

                if g_attempt >= child.g() {
                    stats.counters.paths_worse_or_equal += 1;
                    continue;
                }

                let f = child.set_link(
                    g_attempt,
                    domain.heuristic(payload, goal),
                    Some(current),
                );
                stats.counters.paths_better += 1;
                match child.open_index() {
                    Some(index) => {
                        open_set.update_cost_by_index(index, f);
                    }
                    None => {
                        open_set.insert(f, child);
                        stats.counters.nodes_reinserted += 1;
                    }
                }
            }
        }

        stats.elapsed_time = start_time.elapsed();
        stats.states_interned = states.len() as u64;
        stats.nodes_created = nodes.len() as u64;

        let solution = solution.map(|node| {
            let path = node
                .path(nodes.len())
                .into_iter()
                .map(|state| state.bytes().to_vec())
                .collect();
            Solution::from_path(domain, path)
        });
        log::info!(
            "sequential search finished: {} expanded, solution {:?}",
            stats.counters.expanded,
            solution.as_ref().map(|s| s.cost)
        );

        Ok(SearchResult {
            solution,
            statistics: self.statistics.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::test_domains::{Line, OpenGrid};
    use std::time::Duration;

    #[test]
    fn test_line_is_solved_optimally() {
        let mut search = SequentialSearch::default();
        let result = search.search(&Line { len: 8 }, &[0], None).unwrap();

        let solution = result.solution.unwrap();
        assert_eq!(solution.cost, 7);
        assert_eq!(solution.path.len(), 8);
        assert_eq!(solution.path.first().unwrap(), &vec![0]);
        assert_eq!(solution.goal(), Some(&[7u8][..]));
        assert_eq!(result.statistics.counters.expanded, 8);
        assert!(!result.statistics.timed_out);
    }

    #[test]
    fn test_initial_goal_costs_nothing() {
        let mut search = SequentialSearch::default();
        let result = search.search(&Line { len: 3 }, &[2], None).unwrap();
        assert_eq!(result.cost(), Some(0));
        assert_eq!(result.solution.unwrap().path, vec![vec![2]]);
    }

    #[test]
    fn test_grid_with_zero_heuristic() {
        let grid = OpenGrid { size: 6 };
        let mut search = SequentialSearch::default();
        let result = search.search(&grid, &[0, 0], Some(&[5, 4])).unwrap();

        let solution = result.solution.unwrap();
        assert_eq!(solution.cost, 9);
        assert_eq!(solution.steps(), 9);
        assert!(result.statistics.counters.paths_worse_or_equal > 0);
        assert_eq!(
            result.statistics.states_interned,
            result.statistics.nodes_created
        );
    }

    #[test]
    fn test_unreachable_goal_is_not_an_error() {
        let grid = OpenGrid { size: 3 };
        let mut search = SequentialSearch::default();
        let result = search.search(&grid, &[0, 0], Some(&[9, 9])).unwrap();
        assert!(!result.found());
        assert_eq!(result.statistics.states_interned, 9);
    }

    #[test]
    fn test_wrong_initial_size_is_rejected() {
        let mut search = SequentialSearch::default();
        let err = search.search(&Line { len: 3 }, &[0, 0], None).unwrap_err();
        assert!(matches!(
            err,
            SearchError::StateSize {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_arena_limit_surfaces_as_error() {
        let config = SearchConfig::default().with_max_states(4);
        let mut search = SequentialSearch::new(config);
        let err = search.search(&Line { len: 10 }, &[0], None).unwrap_err();
        assert!(matches!(
            err,
            SearchError::ArenaExhausted {
                record: "state",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_timeout_stops_immediately() {
        let config = SearchConfig::default().with_timeout(Duration::ZERO);
        let mut search = SequentialSearch::new(config);
        let result = search.search(&Line { len: 10 }, &[0], None).unwrap();
        assert!(result.statistics.timed_out);
        assert!(!result.found());
    }
}
