//! Parallel search scheduler that owns the worker threads.

use crate::error::{Result, SearchError};
use crate::memory::Arena;
use crate::search::SearchDomain;
use crate::search::config::{Algorithm, SearchConfig};
use crate::search::parallel::channel::{Mailboxes, Message, SharedSearch, WorkerEvent};
use crate::search::parallel::config::ParallelConfig;
use crate::search::parallel::worker::{Worker, WorkerContext, owner_of};
use crate::search::result::{SearchResult, SearchStatistics, Solution, WorkerStatistics};
use crate::store::node::NodeTable;
use crate::store::state::StateStore;
use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use std::thread;
use std::time::Instant;

/// Run parallel search with the given configuration.
///
/// The initial state is seeded into its owner's mailbox; the call returns
/// once the search is quiescent, the first solution is found (when
/// configured), or the timeout expires.
pub fn run_parallel_search<D: SearchDomain + ?Sized>(
    domain: &D,
    initial: &[u8],
    goal: Option<&[u8]>,
    search_config: &SearchConfig,
    parallel_config: &ParallelConfig,
) -> Result<SearchResult> {
    let start_time = Instant::now();
    let num_workers = parallel_config.num_workers;
    if num_workers == 0 {
        return Err(SearchError::InvalidConfig(
            "parallel search needs at least one worker".to_string(),
        ));
    }

    let state_arena = Arena::with_page_capacity("state", search_config.page_capacity)
        .with_max_records(search_config.max_states);
    let node_arena = Arena::with_page_capacity("node", search_config.page_capacity)
        .with_max_records(search_config.max_nodes);
    let states = StateStore::new(
        &state_arena,
        domain.state_size(),
        search_config.table_capacity,
        search_config.shard_count,
    );
    let nodes = NodeTable::new(
        &node_arena,
        search_config.table_capacity,
        search_config.shard_count,
    );
    let mailboxes = Mailboxes::new(num_workers);
    let shared = SharedSearch::new(num_workers);

    let root = states.intern(initial)?;
    let seed_owner = owner_of(root.hash(), states.capacity(), num_workers);
    shared.add_work(1);
    mailboxes.send(seed_owner, Message::seed(root))?;

    let ctx = WorkerContext {
        domain,
        goal,
        states: &states,
        nodes: &nodes,
        mailboxes: &mailboxes,
        shared: &shared,
        idle_wait: parallel_config.idle_wait,
    };

    log::info!(
        "parallel search: {} workers, seed owned by worker {}",
        num_workers,
        seed_owner
    );

    let (events_tx, events_rx) = unbounded();
    let (timed_out, workers) = thread::scope(|scope| -> Result<(bool, Vec<WorkerStatistics>)> {
        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let events = events_tx.clone();
            let ctx = &ctx;
            let spawned = thread::Builder::new()
                .name(format!("parastar-worker-{}", worker_id))
                .spawn_scoped(scope, move || Worker::new(worker_id, ctx, events).run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    shared.signal_stop();
                    return Err(SearchError::WorkerSpawn { worker_id, source });
                }
            }
        }
        drop(events_tx);

        let timed_out = run_scheduler(
            &events_rx,
            &shared,
            parallel_config,
            search_config,
            start_time,
        );
        shared.signal_stop();

        let mut workers = Vec::with_capacity(num_workers);
        let mut failure = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(stats)) => workers.push(stats),
                Ok(Err(err)) => {
                    failure.get_or_insert(err);
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok((timed_out, workers)),
        }
    })?;

    let mut statistics = SearchStatistics::new(Algorithm::Parallel);
    statistics.stop_on_first_solution = parallel_config.stop_on_first_solution;
    statistics.timed_out = timed_out;
    statistics.states_interned = states.len() as u64;
    statistics.nodes_created = nodes.len() as u64;
    statistics.absorb_workers(workers);

    // parents may have been relaxed after the goal was accepted, so the cost
    // is taken from the path that is reported
    let solution = shared.solution().map(|(_, node)| {
        let path = node
            .path(nodes.len())
            .into_iter()
            .map(|state| state.bytes().to_vec())
            .collect();
        Solution::from_path(domain, path)
    });
    statistics.elapsed_time = start_time.elapsed();

    log::info!(
        "parallel search finished: {} expanded, solution {:?}{}",
        statistics.counters.expanded,
        solution.as_ref().map(|s| s.cost),
        if timed_out { " (timed out)" } else { "" }
    );

    Ok(SearchResult {
        solution,
        statistics,
    })
}

/// Scheduler loop. Returns true if the search was stopped by its timeout.
fn run_scheduler(
    events: &Receiver<WorkerEvent>,
    shared: &SharedSearch<'_>,
    config: &ParallelConfig,
    search_config: &SearchConfig,
    start_time: Instant,
) -> bool {
    let deadline = search_config.timeout.map(|t| start_time + t);

    loop {
        if shared.should_stop() {
            return false;
        }

        let mut wait = config.poll_interval;
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                log::info!("parallel search timed out");
                return true;
            }
            wait = wait.min(deadline - now);
        }

        match events.recv_timeout(wait) {
            Ok(WorkerEvent::Solution { worker_id, cost }) => {
                log::debug!("worker {} reported a solution of cost {}", worker_id, cost);
                if config.stop_on_first_solution {
                    return false;
                }
            }
            Ok(WorkerEvent::Idle { .. }) | Err(RecvTimeoutError::Timeout) => {}
            // every worker has exited
            Err(RecvTimeoutError::Disconnected) => return false,
        }

        if shared.is_quiescent() {
            return false;
        }
    }
}
