//! Hash-partitioned parallel A*.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **scheduler** that seeds the initial state, watches for termination
//!   and owns the worker threads
//! - Multiple **workers**, each owning the states whose hash maps to it and
//!   keeping them in a private open set
//! - **Mailboxes**, one per worker, carrying successors to their owner
//! - **Shared state** holding the best solution and the outstanding-work
//!   counter used to detect quiescence
//!
//! # Example
//!
//! ```ignore
//! use parastar::search::parallel::{ParallelConfig, run_parallel_search};
//!
//! let config = ParallelConfig::default()
//!     .with_workers(4)
//!     .with_stop_on_first_solution(false);
//!
//! let result = run_parallel_search(&domain, &initial, None, &search_config, &config)?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod worker;

pub use config::ParallelConfig;
pub use coordinator::run_parallel_search;
