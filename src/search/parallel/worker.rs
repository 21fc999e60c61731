//! Worker loop for hash-partitioned parallel A*.
//!
//! Each worker owns the states whose bucket maps to it and keeps them in a
//! private open set. Successors of an expanded node are interned and routed to
//! their owner's mailbox, so all relaxation of a given node happens on one
//! thread.

use crate::error::Result;
use crate::search::heap::MinHeap;
use crate::search::parallel::channel::{Mailboxes, Message, SharedSearch, WorkerEvent};
use crate::search::result::{Counters, WorkerStatistics};
use crate::search::{SearchDomain, Successors};
use crate::store::node::{NodeRef, NodeTable};
use crate::store::state::{StateRef, StateStore, bucket_index};
use crossbeam_channel::Sender;
use std::time::Duration;

/// Worker that owns states hashing to `hash`.
///
/// Pure in its arguments, so a state is routed to the same worker for the
/// whole search.
pub fn owner_of(hash: u64, table_capacity: usize, num_workers: usize) -> usize {
    bucket_index(hash, table_capacity) % num_workers.max(1)
}

/// Everything a worker borrows from the search that spawned it.
pub struct WorkerContext<'s, 'a, D: ?Sized> {
    pub domain: &'s D,
    pub goal: Option<&'s [u8]>,
    pub states: &'s StateStore<'a>,
    pub nodes: &'s NodeTable<'a>,
    pub mailboxes: &'s Mailboxes<Message<'a>>,
    pub shared: &'s SharedSearch<'a>,
    pub idle_wait: Duration,
}

impl<'s, 'a, D: SearchDomain + ?Sized> WorkerContext<'s, 'a, D> {
    /// Mailbox of the worker that owns `state`.
    pub fn route(&self, state: StateRef<'a>) -> usize {
        owner_of(state.hash(), self.states.capacity(), self.mailboxes.len())
    }
}

pub struct Worker<'c, 's, 'a, D: ?Sized> {
    id: usize,
    ctx: &'c WorkerContext<'s, 'a, D>,
    events: Sender<WorkerEvent>,
    open_set: MinHeap<NodeRef<'a>>,
    successors: Successors,
    counters: Counters,
    idle: bool,
    idle_periods: u64,
}

impl<'c, 's, 'a, D: SearchDomain + ?Sized> Worker<'c, 's, 'a, D> {
    pub fn new(id: usize, ctx: &'c WorkerContext<'s, 'a, D>, events: Sender<WorkerEvent>) -> Self {
        Self {
            id,
            ctx,
            events,
            open_set: MinHeap::new(),
            successors: Successors::new(ctx.domain.state_size()),
            counters: Counters::default(),
            idle: false,
            idle_periods: 0,
        }
    }

    /// Run until the scheduler signals stop. An error stops the whole search.
    pub fn run(mut self) -> Result<WorkerStatistics> {
        let outcome = self.run_loop();
        if outcome.is_err() {
            self.ctx.shared.signal_stop();
        }
        outcome?;
        log::debug!(
            "worker {} finished: {} expanded, {} generated",
            self.id,
            self.counters.expanded,
            self.counters.generated
        );
        Ok(WorkerStatistics {
            worker_id: self.id,
            idle_periods: self.idle_periods,
            counters: self.counters,
        })
    }

    fn run_loop(&mut self) -> Result<()> {
        let shared = self.ctx.shared;
        while !shared.should_stop() {
            for message in self.ctx.mailboxes.drain(self.id)? {
                self.receive(message);
            }
            self.counters.observe_open_set(self.open_set.len());

            if let Some((_, node)) = self.open_set.pop_min() {
                self.set_idle(false);
                self.counters.expanded += 1;
                self.visit(node)?;
                continue;
            }

            self.set_idle(true);
            if let Some(message) = self.ctx.mailboxes.wait(self.id, self.ctx.idle_wait)? {
                self.set_idle(false);
                self.receive(message);
            }
        }
        Ok(())
    }

    fn set_idle(&mut self, idle: bool) {
        if self.idle == idle {
            return;
        }
        self.idle = idle;
        self.ctx.shared.set_idle(self.id, idle);
        if idle {
            self.idle_periods += 1;
            // the scheduler may already be gone during shutdown
            let _ = self.events.send(WorkerEvent::Idle { worker_id: self.id });
        }
    }

    /// Apply one routed message to the local open set. The message's unit of
    /// work is either handed to a queued node or released.
    fn receive(&mut self, message: Message<'a>) {
        let shared = self.ctx.shared;
        let domain = self.ctx.domain;
        let goal = self.ctx.goal;
        let payload = message.state.bytes();

        let (node, is_new) = match self.ctx.nodes.get_or_create(message.state) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("worker {} dropped a successor: {}", self.id, err);
                self.counters.dropped_messages += 1;
                shared.finish_work(1);
                return;
            }
        };

        let Some(parent) = message.parent else {
            let f = node.set_link(0, domain.heuristic(payload, goal), None);
            self.open_set.insert(f, node);
            return;
        };

        let parent_state = parent.state().bytes();
        let g_attempt = parent
            .g()
            .saturating_add(domain.distance(parent_state, payload));

        if is_new {
            let f = node.set_link(g_attempt, domain.heuristic(payload, goal), Some(parent));
            self.open_set.insert(f, node);
            self.counters.generated += 1;
            self.counters.nodes_new += 1;
            return;
        }

        if g_attempt >= node.g() {
            self.counters.paths_worse_or_equal += 1;
            shared.finish_work(1);
            return;
        }

        let f = node.set_link(g_attempt, domain.heuristic(payload, goal), Some(parent));
        self.counters.paths_better += 1;
        match node.open_index() {
            Some(index) => {
                self.open_set.update_cost_by_index(index, f);
                shared.finish_work(1);
            }
            None => {
                self.open_set.insert(f, node);
                self.counters.nodes_reinserted += 1;
            }
        }
    }

    /// Handle a node popped from the local open set.
    fn visit(&mut self, node: NodeRef<'a>) -> Result<()> {
        let shared = self.ctx.shared;
        let domain = self.ctx.domain;

        // the popped node is the local minimum, so nothing left here can win
        if shared.current_best().is_some_and(|best| node.f() >= best) {
            let cleared = self.open_set.clear();
            self.counters.pruned += 1 + cleared as u64;
            shared.finish_work(1 + cleared);
            return Ok(());
        }

        let state = node.state().bytes();
        if domain.is_goal(state, self.ctx.goal) {
            let cost = node.g();
            if shared.try_update(cost, node) {
                log::debug!("worker {} found a solution of cost {}", self.id, cost);
                let _ = self.events.send(WorkerEvent::Solution {
                    worker_id: self.id,
                    cost,
                });
            }
            shared.finish_work(1);
            return Ok(());
        }

        self.successors.clear();
        domain.expand(state, &mut self.successors);
        let mut routed = Ok(());
        for payload in self.successors.iter() {
            let successor = match self.ctx.states.intern(payload) {
                Ok(successor) => successor,
                Err(err) => {
                    log::warn!("worker {} dropped a successor: {}", self.id, err);
                    self.counters.dropped_messages += 1;
                    continue;
                }
            };
            let dest = self.ctx.route(successor);
            shared.add_work(1);
            if let Err(err) = self
                .ctx
                .mailboxes
                .send(dest, Message::successor(node, successor))
            {
                shared.finish_work(1);
                routed = Err(err);
                break;
            }
        }
        shared.finish_work(1);
        routed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Arena;
    use crate::search::parallel::channel::SharedSearch;
    use crate::search::test_domains::Line;
    use crate::store::state::{DEFAULT_TABLE_CAPACITY, state_hash};
    use crossbeam_channel::unbounded;

    #[test]
    fn test_owner_is_stable() {
        for workers in 1..9 {
            for payload in [&b"abc"[..], b"12345678-", b"\x00\x01"] {
                let hash = state_hash(payload);
                let owner = owner_of(hash, DEFAULT_TABLE_CAPACITY, workers);
                assert!(owner < workers);
                assert_eq!(
                    owner,
                    owner_of(state_hash(payload), DEFAULT_TABLE_CAPACITY, workers)
                );
            }
        }
        assert_eq!(owner_of(4097, 2048, 1), 0);
        assert_eq!(owner_of(4097, 2048, 4), 1);
    }

    #[test]
    fn test_single_worker_solves_line_and_balances_work() {
        let domain = Line { len: 5 };
        let state_arena = Arena::new("state");
        let node_arena = Arena::new("node");
        let states = StateStore::new(&state_arena, 1, DEFAULT_TABLE_CAPACITY, 4);
        let nodes = NodeTable::new(&node_arena, DEFAULT_TABLE_CAPACITY, 4);
        let mailboxes = Mailboxes::new(1);
        let shared = SharedSearch::new(1);
        let ctx = WorkerContext {
            domain: &domain,
            goal: None,
            states: &states,
            nodes: &nodes,
            mailboxes: &mailboxes,
            shared: &shared,
            idle_wait: Duration::from_millis(1),
        };
        let (events, received) = unbounded();

        let root = states.intern(&[0]).unwrap();
        shared.add_work(1);
        mailboxes.send(0, Message::seed(root)).unwrap();

        let mut worker = Worker::new(0, &ctx, events);
        // drive the loop by hand until the worker runs dry
        for _ in 0..100 {
            for message in mailboxes.drain(0).unwrap() {
                worker.receive(message);
            }
            match worker.open_set.pop_min() {
                Some((_, node)) => {
                    worker.counters.expanded += 1;
                    worker.visit(node).unwrap();
                }
                None if !mailboxes.has_pending(0) => break,
                None => {}
            }
        }

        let (cost, goal) = shared.solution().unwrap();
        assert_eq!(cost, 4);
        assert_eq!(goal.state().bytes(), &[4]);
        assert_eq!(shared.outstanding(), 0);
        assert_eq!(
            received.try_recv().unwrap(),
            WorkerEvent::Solution {
                worker_id: 0,
                cost: 4
            }
        );
        assert!(worker.counters.paths_worse_or_equal > 0);
    }
}
