//! Configuration types for the search engines

use crate::memory::arena::DEFAULT_PAGE_CAPACITY;
use crate::store::state::{DEFAULT_SHARD_COUNT, DEFAULT_TABLE_CAPACITY};
use std::time::Duration;

/// Search engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Single-threaded A* with one global open set
    #[default]
    Sequential,
    /// Hash-partitioned A* over several worker threads
    Parallel,
}

/// Storage and limits shared by both engines
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of hash buckets used for lock-shard and worker selection
    pub table_capacity: usize,
    /// Number of independently locked shards per table
    pub shard_count: usize,
    /// Records per arena page
    pub page_capacity: usize,
    /// Upper bound on interned states (None = unbounded)
    pub max_states: Option<usize>,
    /// Upper bound on created nodes (None = unbounded)
    pub max_nodes: Option<usize>,
    /// Overall timeout for the search
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            table_capacity: DEFAULT_TABLE_CAPACITY,
            shard_count: DEFAULT_SHARD_COUNT,
            page_capacity: DEFAULT_PAGE_CAPACITY,
            max_states: None,
            max_nodes: None,
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity.max(1);
        self
    }

    pub fn with_shard_count(mut self, shards: usize) -> Self {
        self.shard_count = shards.max(1);
        self
    }

    pub fn with_page_capacity(mut self, records: usize) -> Self {
        self.page_capacity = records.max(1);
        self
    }

    pub fn with_max_states(mut self, max: usize) -> Self {
        self.max_states = Some(max);
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Algorithm::Sequential).unwrap(),
            "sequential"
        );
        assert_eq!(
            serde_json::to_value(Algorithm::Parallel).unwrap(),
            "parallel"
        );
        assert_eq!(Algorithm::default(), Algorithm::Sequential);
    }

    #[test]
    fn test_search_config_builder() {
        let config = SearchConfig::default()
            .with_shard_count(0)
            .with_max_nodes(10)
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.shard_count, 1);
        assert_eq!(config.max_nodes, Some(10));
        assert_eq!(config.max_states, None);
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.table_capacity, DEFAULT_TABLE_CAPACITY);
    }
}
