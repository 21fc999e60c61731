//! Page-based bump arena for fixed-size records.
//!
//! Records are appended to pages whose capacity is reserved up front and never
//! exceeded, so a page buffer is never reallocated and every reference handed
//! out stays valid until the arena itself is dropped. There is no individual
//! free: all records are released together with the arena.

use crate::error::{Result, SearchError};
use parking_lot::Mutex;
use std::marker::PhantomData;

/// Default number of records per page.
pub const DEFAULT_PAGE_CAPACITY: usize = 4096;

struct Pages<T> {
    pages: Vec<Vec<T>>,
    records: usize,
}

/// Thread-safe append-only arena.
///
/// `alloc` takes `&self`, so several workers can allocate concurrently; the
/// page list is guarded by a single short critical section.
pub struct Arena<T> {
    record: &'static str,
    page_capacity: usize,
    max_records: Option<usize>,
    inner: Mutex<Pages<T>>,
    // Shared references to records cross threads, so `Arena<T>: Sync`
    // must also require `T: Sync`.
    _marker: PhantomData<T>,
}

impl<T> Arena<T> {
    /// Create an empty arena. `record` names the record kind in errors.
    pub fn new(record: &'static str) -> Self {
        Self::with_page_capacity(record, DEFAULT_PAGE_CAPACITY)
    }

    pub fn with_page_capacity(record: &'static str, page_capacity: usize) -> Self {
        Self {
            record,
            page_capacity: page_capacity.max(1),
            max_records: None,
            inner: Mutex::new(Pages {
                pages: Vec::new(),
                records: 0,
            }),
            _marker: PhantomData,
        }
    }

    /// Cap the number of records this arena will ever hand out.
    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Move `value` into the arena and return a reference that lives as long
    /// as the arena.
    pub fn alloc(&self, value: T) -> Result<&T> {
        let mut inner = self.inner.lock();

        if self.max_records.is_some_and(|max| inner.records >= max) {
            return Err(self.exhausted(inner.records));
        }

        let has_room = inner
            .pages
            .last()
            .is_some_and(|page| page.len() < page.capacity());
        if !has_room {
            let mut page = Vec::new();
            page.try_reserve_exact(self.page_capacity)
                .map_err(|_| self.exhausted(inner.records))?;
            inner.pages.push(page);
        }

        let records = inner.records;
        let Some(page) = inner.pages.last_mut() else {
            return Err(self.exhausted(records));
        };
        page.push(value);
        let record: *const T = &page[page.len() - 1];
        inner.records += 1;
        drop(inner);

        // SAFETY: the record sits inside a page whose capacity was reserved
        // before the push and is never exceeded, so the page buffer is never
        // reallocated. Pages are only dropped together with the arena, which
        // the returned borrow of `self` outlives. No `&mut` to a record is
        // ever created after this point.
        Ok(unsafe { &*record })
    }

    /// Number of records handed out so far.
    pub fn len(&self) -> usize {
        self.inner.lock().records
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pages backing the arena.
    pub fn page_count(&self) -> usize {
        self.inner.lock().pages.len()
    }

    fn exhausted(&self, records: usize) -> SearchError {
        SearchError::ArenaExhausted {
            record: self.record,
            records,
        }
    }
}

impl<T> std::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Arena")
            .field("record", &self.record)
            .field("records", &inner.records)
            .field("pages", &inner.pages.len())
            .field("page_capacity", &self.page_capacity)
            .finish()
    }
}
