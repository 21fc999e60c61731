//! Parallel A* search over opaque fixed-size states.
//!
//! States are interned once in a sharded [`store::StateStore`], wrapped in a
//! unique [`store::Node`] per state, and searched either by a single thread or
//! by hash-partitioned workers that route successors to each other through
//! mailboxes. Puzzle plugins live in [`domains`].

pub mod domains;
pub mod error;
pub mod memory;
pub mod search;
pub mod store;

pub use error::{Result, SearchError};
pub use search::{
    Cost, ParallelConfig, SearchConfig, SearchDomain, SearchResult, Solution, Successors, solve,
};
