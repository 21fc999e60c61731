//! Binary min-heap used as a worker's open set.
//!
//! Entries pair an integer cost with a payload. Every time an entry moves, the
//! payload is told its new slot through [`HeapItem::set_heap_index`], so a
//! caller holding the payload can later adjust its cost in O(log n) without
//! searching. Ties in cost are broken by heap structure only: the pop order of
//! equal-cost entries is unspecified and is not FIFO.

use crate::search::Cost;

/// Initial number of slots reserved by a new heap.
pub const INITIAL_CAPACITY: usize = 1024;

/// Payload stored in a [`MinHeap`].
pub trait HeapItem {
    /// Record the payload's slot, or `None` once it leaves the heap.
    fn set_heap_index(&self, index: Option<usize>);
}

#[derive(Debug, Clone)]
struct HeapEntry<T> {
    cost: Cost,
    item: T,
}

/// Index-tracking binary min-heap keyed on `Cost`.
#[derive(Debug)]
pub struct MinHeap<T> {
    entries: Vec<HeapEntry<T>>,
}

impl<T: HeapItem> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HeapItem> MinHeap<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Cost of the current minimum, if any.
    pub fn peek_cost(&self) -> Option<Cost> {
        self.entries.first().map(|entry| entry.cost)
    }

    /// Insert `item` with `cost` and return the slot it settled in.
    pub fn insert(&mut self, cost: Cost, item: T) -> usize {
        if self.entries.len() == self.entries.capacity() {
            // double when full
            let additional = self.entries.capacity().max(1);
            self.entries.reserve_exact(additional);
        }
        let index = self.entries.len();
        item.set_heap_index(Some(index));
        self.entries.push(HeapEntry { cost, item });
        self.sift_up(index)
    }

    /// Remove and return the minimum-cost entry.
    pub fn pop_min(&mut self) -> Option<(Cost, T)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let HeapEntry { cost, item } = self.entries.pop()?;
        item.set_heap_index(None);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((cost, item))
    }

    /// Change the cost of the entry at `index` and restore heap order.
    /// Returns the entry's new slot, or `None` if `index` is out of range.
    pub fn update_cost_by_index(&mut self, index: usize, new_cost: Cost) -> Option<usize> {
        let entry = self.entries.get_mut(index)?;
        let old_cost = entry.cost;
        entry.cost = new_cost;
        if new_cost < old_cost {
            Some(self.sift_up(index))
        } else {
            Some(self.sift_down(index))
        }
    }

    /// Drop every entry, marking each payload as no longer queued.
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        for entry in self.entries.drain(..) {
            entry.item.set_heap_index(None);
        }
        removed
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].cost >= self.entries[parent].cost {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.entries[left].cost < self.entries[smallest].cost {
                smallest = left;
            }
            if right < len && self.entries[right].cost < self.entries[smallest].cost {
                smallest = right;
            }
            if smallest == index {
                return index;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.entries[a].item.set_heap_index(Some(a));
        self.entries[b].item.set_heap_index(Some(b));
    }
}

impl<T: HeapItem + PartialEq> MinHeap<T> {
    /// Linear-scan removal for callers that do not track slots. O(n).
    pub fn remove(&mut self, cost: Cost, item: &T) -> bool {
        let Some(index) = self.position(cost, item) else {
            return false;
        };
        let last = self.entries.len() - 1;
        self.swap(index, last);
        if let Some(entry) = self.entries.pop() {
            entry.item.set_heap_index(None);
        }
        if index < self.entries.len() {
            let index = self.sift_up(index);
            self.sift_down(index);
        }
        true
    }

    /// Linear-scan cost change; inserts `item` at `new_cost` when no entry
    /// with `old_cost` holds it. O(n).
    pub fn update(&mut self, old_cost: Cost, new_cost: Cost, item: T) -> usize {
        match self.position(old_cost, &item) {
            Some(index) => self.update_cost_by_index(index, new_cost).unwrap_or(index),
            None => self.insert(new_cost, item),
        }
    }

    fn position(&self, cost: Cost, item: &T) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.cost == cost && entry.item == *item)
    }
}
