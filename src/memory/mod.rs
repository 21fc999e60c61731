//! Arena storage backing states and search nodes.

pub mod arena;

pub use arena::Arena;
