//! Error types for the search engine.

use thiserror::Error;

/// Errors raised while setting up or running a search.
///
/// Per-message failures inside a parallel worker (for example an exhausted
/// arena while interning a successor) are logged and counted instead of being
/// returned, so that one dropped successor does not abort the other workers.
#[derive(Debug, Error)]
pub enum SearchError {
    /// An arena refused to hand out another record.
    #[error("arena exhausted after {records} records of {record}")]
    ArenaExhausted {
        /// Kind of record the arena stores.
        record: &'static str,
        /// Records already allocated when the request failed.
        records: usize,
    },

    /// A state payload does not have the size the domain declared.
    #[error("state payload has {actual} bytes, expected {expected}")]
    StateSize { expected: usize, actual: usize },

    /// A message was addressed to a mailbox that does not exist.
    #[error("mailbox {index} does not exist ({count} mailboxes)")]
    InvalidMailbox { index: usize, count: usize },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker {worker_id}: {source}")]
    WorkerSpawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
