//! Mailboxes and shared state for parallel search workers.

use crate::error::{Result, SearchError};
use crate::search::Cost;
use crate::store::node::NodeRef;
use crate::store::state::StateRef;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Successor routed to the worker that owns `state`.
///
/// A message without a parent carries the initial state.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    pub parent: Option<NodeRef<'a>>,
    pub state: StateRef<'a>,
}

impl<'a> Message<'a> {
    pub fn seed(state: StateRef<'a>) -> Self {
        Self {
            parent: None,
            state,
        }
    }

    pub fn successor(parent: NodeRef<'a>, state: StateRef<'a>) -> Self {
        Self {
            parent: Some(parent),
            state,
        }
    }
}

/// Event sent from a worker to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Worker accepted a new best solution.
    Solution { worker_id: usize, cost: Cost },
    /// Worker ran out of local work.
    Idle { worker_id: usize },
}

/// One FIFO mailbox per worker.
///
/// Any thread may send to any mailbox; only the owning worker drains it.
pub struct Mailboxes<T> {
    senders: Vec<Sender<T>>,
    receivers: Vec<Receiver<T>>,
}

impl<T> Mailboxes<T> {
    pub fn new(count: usize) -> Self {
        let (senders, receivers) = (0..count).map(|_| unbounded()).unzip();
        Self { senders, receivers }
    }

    /// Number of mailboxes.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Append `message` to mailbox `dest`.
    pub fn send(&self, dest: usize, message: T) -> Result<()> {
        let sender = self.senders.get(dest).ok_or_else(|| self.invalid(dest))?;
        // the receiver lives in `self`, so the channel cannot be disconnected
        let _ = sender.send(message);
        Ok(())
    }

    /// Take every message currently queued for `dest`, without blocking.
    pub fn drain(&self, dest: usize) -> Result<Vec<T>> {
        let receiver = self.receivers.get(dest).ok_or_else(|| self.invalid(dest))?;
        Ok(receiver.try_iter().collect())
    }

    /// Whether mailbox `dest` has anything queued.
    pub fn has_pending(&self, dest: usize) -> bool {
        self.receivers.get(dest).is_some_and(|r| !r.is_empty())
    }

    /// Block up to `timeout` for the next message to `dest`.
    pub fn wait(&self, dest: usize, timeout: Duration) -> Result<Option<T>> {
        let receiver = self.receivers.get(dest).ok_or_else(|| self.invalid(dest))?;
        match receiver.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn invalid(&self, index: usize) -> SearchError {
        SearchError::InvalidMailbox {
            index,
            count: self.len(),
        }
    }
}

/// State shared by the scheduler and every worker.
///
/// `outstanding` counts units of pending work: messages in flight, nodes in
/// any open set and nodes being expanded. The search is quiescent when it
/// drops to zero and every worker has published its idle flag.
pub struct SharedSearch<'a> {
    solution: Mutex<Option<(Cost, NodeRef<'a>)>>,
    /// Mirror of the solution cost (`Cost::MAX` means none yet).
    best_cost: AtomicU32,
    should_stop: AtomicBool,
    outstanding: AtomicUsize,
    idle: Box<[AtomicBool]>,
}

impl<'a> SharedSearch<'a> {
    pub fn new(num_workers: usize) -> Self {
        Self {
            solution: Mutex::new(None),
            best_cost: AtomicU32::new(Cost::MAX),
            should_stop: AtomicBool::new(false),
            outstanding: AtomicUsize::new(0),
            idle: (0..num_workers).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Record `node` as the solution if its cost is strictly lower than the
    /// current one. Returns true if it was accepted.
    pub fn try_update(&self, cost: Cost, node: NodeRef<'a>) -> bool {
        let mut slot = self.solution.lock();
        if slot.is_some_and(|(best, _)| cost >= best) {
            return false;
        }
        *slot = Some((cost, node));
        self.best_cost.store(cost, Ordering::SeqCst);
        true
    }

    /// Current best cost, if a solution exists.
    pub fn current_best(&self) -> Option<Cost> {
        match self.best_cost.load(Ordering::SeqCst) {
            Cost::MAX => None,
            cost => Some(cost),
        }
    }

    pub fn solution(&self) -> Option<(Cost, NodeRef<'a>)> {
        *self.solution.lock()
    }

    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    pub fn signal_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    pub fn add_work(&self, units: usize) {
        self.outstanding.fetch_add(units, Ordering::SeqCst);
    }

    pub fn finish_work(&self, units: usize) {
        self.outstanding.fetch_sub(units, Ordering::SeqCst);
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn set_idle(&self, worker_id: usize, idle: bool) {
        if let Some(flag) = self.idle.get(worker_id) {
            flag.store(idle, Ordering::SeqCst);
        }
    }

    pub fn is_idle(&self, worker_id: usize) -> bool {
        self.idle
            .get(worker_id)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// No work is pending anywhere and every worker has gone idle.
    pub fn is_quiescent(&self) -> bool {
        self.outstanding() == 0 && self.idle.iter().all(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Arena;
    use crate::store::node::NodeTable;
    use crate::store::state::{DEFAULT_TABLE_CAPACITY, StateStore};

    #[test]
    fn test_send_and_drain_in_order() {
        let mailboxes = Mailboxes::new(3);
        assert_eq!(mailboxes.len(), 3);

        for i in 0..5 {
            mailboxes.send(1, i).unwrap();
        }
        assert!(mailboxes.has_pending(1));
        assert!(!mailboxes.has_pending(0));

        assert_eq!(mailboxes.drain(1).unwrap(), vec![0, 1, 2, 3, 4]);
        assert!(mailboxes.drain(1).unwrap().is_empty());
        assert!(!mailboxes.has_pending(1));
    }

    #[test]
    fn test_invalid_mailbox() {
        let mailboxes: Mailboxes<u8> = Mailboxes::new(2);
        match mailboxes.send(2, 0) {
            Err(SearchError::InvalidMailbox { index, count }) => {
                assert_eq!(index, 2);
                assert_eq!(count, 2);
            }
            other => panic!("expected invalid mailbox, got {:?}", other),
        }
        assert!(mailboxes.drain(7).is_err());
        assert!(!mailboxes.has_pending(7));
    }

    #[test]
    fn test_concurrent_senders() {
        let mailboxes = Mailboxes::new(2);
        std::thread::scope(|scope| {
            for t in 0..4u32 {
                let mailboxes = &mailboxes;
                scope.spawn(move || {
                    for i in 0..100 {
                        mailboxes.send((i % 2) as usize, t * 1000 + i).unwrap();
                    }
                });
            }
        });

        let mut first = mailboxes.drain(0).unwrap();
        let second = mailboxes.drain(1).unwrap();
        assert_eq!(first.len() + second.len(), 400);

        // per-sender order is preserved
        first.retain(|v| v / 1000 == 2);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_wait_times_out_and_receives() {
        let mailboxes = Mailboxes::new(1);
        assert_eq!(mailboxes.wait(0, Duration::from_millis(1)).unwrap(), None);
        mailboxes.send(0, 9u8).unwrap();
        assert_eq!(
            mailboxes.wait(0, Duration::from_millis(1)).unwrap(),
            Some(9)
        );
    }

    #[test]
    fn test_solution_only_improves() {
        let states = Arena::new("state");
        let nodes = Arena::new("node");
        let store = StateStore::new(&states, 1, DEFAULT_TABLE_CAPACITY, 1);
        let table = NodeTable::new(&nodes, DEFAULT_TABLE_CAPACITY, 1);
        let (a, _) = table.get_or_create(store.intern(&[0]).unwrap()).unwrap();
        let (b, _) = table.get_or_create(store.intern(&[1]).unwrap()).unwrap();

        let shared = SharedSearch::new(2);
        assert_eq!(shared.current_best(), None);
        assert!(shared.try_update(10, a));
        assert!(!shared.try_update(10, b));
        assert!(!shared.try_update(12, b));
        assert!(shared.try_update(7, b));
        assert_eq!(shared.current_best(), Some(7));
        let (cost, node) = shared.solution().unwrap();
        assert_eq!(cost, 7);
        assert!(std::ptr::eq(node, b));
    }

    #[test]
    fn test_quiescence_requires_idle_and_no_work() {
        let shared = SharedSearch::new(2);
        assert!(!shared.is_quiescent());

        shared.set_idle(0, true);
        shared.set_idle(1, true);
        assert!(shared.is_quiescent());

        shared.add_work(2);
        assert!(!shared.is_quiescent());
        shared.finish_work(2);
        assert!(shared.is_quiescent());

        shared.set_idle(1, false);
        assert!(!shared.is_idle(1));
        assert!(!shared.is_quiescent());
    }

    #[test]
    fn test_stop_signal() {
        let shared = SharedSearch::new(1);
        assert!(!shared.should_stop());
        shared.signal_stop();
        assert!(shared.should_stop());
    }
}
