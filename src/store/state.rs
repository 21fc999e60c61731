//! Content-addressed store of state payloads.
//!
//! Every distinct payload is copied into the arena exactly once; interning the
//! same bytes again returns the same `StateRef`, so pointer identity of a
//! `StateRef` is equivalent to byte equality of the payload.

use crate::error::{Result, SearchError};
use crate::memory::Arena;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Default number of hash buckets used for bucket and worker selection.
pub const DEFAULT_TABLE_CAPACITY: usize = 2048;

/// Default number of lock shards per table.
pub const DEFAULT_SHARD_COUNT: usize = 64;

/// Polynomial byte hash (`h = h * 31 + byte`) over a state payload.
pub fn state_hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |h, &b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// Bucket of a payload hash in a table of `capacity` buckets.
pub fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity.max(1) as u64) as usize
}

/// One interned state payload.
#[derive(Debug)]
pub struct State {
    hash: u64,
    bytes: Box<[u8]>,
}

impl State {
    fn new(bytes: &[u8]) -> Self {
        Self {
            hash: state_hash(bytes),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// Canonical reference to an interned state.
pub type StateRef<'a> = &'a State;

/// Hash-sharded interning table over an external arena.
///
/// Payloads hash into `capacity` buckets and buckets map onto `shards`
/// independently locked maps, so workers interning unrelated states rarely
/// contend on the same lock.
pub struct StateStore<'a> {
    arena: &'a Arena<State>,
    state_size: usize,
    capacity: usize,
    shards: Box<[Mutex<FxHashMap<&'a [u8], StateRef<'a>>>]>,
}

impl<'a> StateStore<'a> {
    pub fn new(
        arena: &'a Arena<State>,
        state_size: usize,
        capacity: usize,
        shard_count: usize,
    ) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(FxHashMap::default()))
            .collect();
        Self {
            arena,
            state_size,
            capacity: capacity.max(1),
            shards,
        }
    }

    /// Return the canonical reference for `payload`, copying it into the arena
    /// the first time it is seen.
    pub fn intern(&self, payload: &[u8]) -> Result<StateRef<'a>> {
        if payload.len() != self.state_size {
            return Err(SearchError::StateSize {
                expected: self.state_size,
                actual: payload.len(),
            });
        }

        let hash = state_hash(payload);
        let mut shard = self.shard(hash).lock();
        if let Some(&state) = shard.get(payload) {
            return Ok(state);
        }

        let state: StateRef<'a> = self.arena.alloc(State::new(payload))?;
        shard.insert(state.bytes(), state);
        Ok(state)
    }

    /// Look a payload up without interning it.
    pub fn get(&self, payload: &[u8]) -> Option<StateRef<'a>> {
        let hash = state_hash(payload);
        self.shard(hash).lock().get(payload).copied()
    }

    /// Number of distinct states interned so far.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn shard(&self, hash: u64) -> &Mutex<FxHashMap<&'a [u8], StateRef<'a>>> {
        let bucket = bucket_index(hash, self.capacity);
        &self.shards[bucket % self.shards.len()]
    }
}
