//! Deduplicating tables for states and search nodes.

pub mod node;
pub mod state;

pub use node::{Node, NodeRef, NodeTable};
pub use state::{State, StateRef, StateStore};
