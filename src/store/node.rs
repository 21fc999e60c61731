//! Search nodes and the table that deduplicates them by state.
//!
//! Exactly one `Node` exists per interned state for the lifetime of a search.
//! Nodes are allocated from an arena and mutated in place: relaxation updates
//! the cost and parent link, and the owning open set records the node's heap
//! position.

use crate::error::Result;
use crate::memory::Arena;
use crate::search::Cost;
use crate::search::heap::HeapItem;
use crate::store::state::{StateRef, bucket_index};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sentinel open-set index meaning "not currently queued".
pub const NOT_QUEUED: usize = usize::MAX;

/// Canonical reference to a node.
pub type NodeRef<'a> = &'a Node<'a>;

/// Cost bookkeeping of a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeLink<'a> {
    pub g: Cost,
    pub h: Cost,
    pub parent: Option<NodeRef<'a>>,
}

pub struct Node<'a> {
    state: StateRef<'a>,
    link: Mutex<NodeLink<'a>>,
    open_index: AtomicUsize,
}

impl<'a> Node<'a> {
    fn new(state: StateRef<'a>) -> Self {
        Self {
            state,
            link: Mutex::new(NodeLink {
                g: 0,
                h: 0,
                parent: None,
            }),
            open_index: AtomicUsize::new(NOT_QUEUED),
        }
    }

    pub fn state(&self) -> StateRef<'a> {
        self.state
    }

    /// Snapshot of g, h and parent.
    pub fn link(&self) -> NodeLink<'a> {
        *self.link.lock()
    }

    pub fn g(&self) -> Cost {
        self.link.lock().g
    }

    pub fn f(&self) -> Cost {
        let link = self.link.lock();
        link.g.saturating_add(link.h)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.link.lock().parent
    }

    /// Overwrite cost and parent, returning the new `f = g + h`.
    pub fn set_link(&self, g: Cost, h: Cost, parent: Option<NodeRef<'a>>) -> Cost {
        *self.link.lock() = NodeLink { g, h, parent };
        g.saturating_add(h)
    }

    /// Current position in the owning open set, if queued.
    pub fn open_index(&self) -> Option<usize> {
        match self.open_index.load(Ordering::Relaxed) {
            NOT_QUEUED => None,
            index => Some(index),
        }
    }

    /// Walk parent links back to the root and return the states from the root
    /// to this node. The walk is bounded by `limit` steps.
    pub fn path(&self, limit: usize) -> Vec<StateRef<'a>> {
        let mut states = vec![self.state];
        let mut current = self.parent();
        while let Some(node) = current {
            if states.len() > limit {
                break;
            }
            states.push(node.state);
            current = node.parent();
        }
        states.reverse();
        states
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let link = self.link();
        f.debug_struct("Node")
            .field("state", &self.state.bytes())
            .field("g", &link.g)
            .field("h", &link.h)
            .field("has_parent", &link.parent.is_some())
            .field("open_index", &self.open_index())
            .finish()
    }
}

// Nodes are canonical per state, so identity is state identity.
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.state, other.state)
    }
}

impl Eq for Node<'_> {}

impl HeapItem for NodeRef<'_> {
    fn set_heap_index(&self, index: Option<usize>) {
        self.open_index
            .store(index.unwrap_or(NOT_QUEUED), Ordering::Relaxed);
    }
}

/// Sharded table mapping states to their unique node.
pub struct NodeTable<'a> {
    arena: &'a Arena<Node<'a>>,
    capacity: usize,
    shards: Box<[Mutex<FxHashMap<&'a [u8], NodeRef<'a>>>]>,
}

impl<'a> NodeTable<'a> {
    pub fn new(arena: &'a Arena<Node<'a>>, capacity: usize, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(FxHashMap::default()))
            .collect();
        Self {
            arena,
            capacity: capacity.max(1),
            shards,
        }
    }

    /// Return the node for `state`, creating a zeroed one (`g = h = 0`, no
    /// parent, not queued) on first encounter. The flag is true when the node
    /// was created by this call.
    pub fn get_or_create(&self, state: StateRef<'a>) -> Result<(NodeRef<'a>, bool)> {
        let bucket = bucket_index(state.hash(), self.capacity);
        let mut shard = self.shards[bucket % self.shards.len()].lock();
        if let Some(&node) = shard.get(state.bytes()) {
            return Ok((node, false));
        }

        let node: NodeRef<'a> = self.arena.alloc(Node::new(state))?;
        shard.insert(state.bytes(), node);
        Ok((node, true))
    }

    pub fn get(&self, state: StateRef<'a>) -> Option<NodeRef<'a>> {
        let bucket = bucket_index(state.hash(), self.capacity);
        self.shards[bucket % self.shards.len()]
            .lock()
            .get(state.bytes())
            .copied()
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
