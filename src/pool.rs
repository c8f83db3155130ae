//! Fixed worker pool with barrier-staged execution.
//!
//! A pool of long-lived worker threads listens on a stage dispatch; the
//! coordinating thread publishes a stage id, wakes every worker, and blocks
//! on a countdown latch until all of them acknowledge completion. That makes
//! every [`WorkerPool::run`] call a full barrier: no worker can observe
//! stage N+1 before every worker has finished stage N. Later stages rely on
//! this to read border reflections written across thread row-boundaries.
//!
//! Threads are created once at filter construction and joined at teardown;
//! no per-frame thread creation. A failure to spawn any worker is a fatal
//! construction error.

use crate::error::{DenoiseError, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Split `total` work units into the contiguous range owned by `worker` of
/// `workers`.
///
/// Ranges are contiguous, non-overlapping, and cover `[0, total)`; a range
/// may be empty when there are more workers than units. Stages that operate
/// on blocks of rows pass the block count here and scale the result.
pub(crate) fn split_range(total: usize, workers: usize, worker: usize) -> (usize, usize) {
    (total * worker / workers, total * (worker + 1) / workers)
}

struct Dispatch<S> {
    stage: Option<S>,
    epoch: u64,
    pending: usize,
    shutdown: bool,
}

struct Shared<S> {
    dispatch: Mutex<Dispatch<S>>,
    stage_ready: Condvar,
    stage_done: Condvar,
}

/// Fixed set of worker threads executing named stages over a shared state.
pub(crate) struct WorkerPool<S: Copy + Send + 'static> {
    shared: Arc<Shared<S>>,
    workers: Vec<JoinHandle<()>>,
}

impl<S: Copy + Send + 'static> WorkerPool<S> {
    /// Spawn `threads` workers, each invoking `run(stage, worker_index)` for
    /// every dispatched stage.
    pub(crate) fn new<F>(threads: usize, run: F) -> Result<Self>
    where
        F: Fn(S, usize) + Send + Sync + 'static,
    {
        debug_assert!(threads >= 1);

        let shared = Arc::new(Shared {
            dispatch: Mutex::new(Dispatch {
                stage: None,
                epoch: 0,
                pending: 0,
                shutdown: false,
            }),
            stage_ready: Condvar::new(),
            stage_done: Condvar::new(),
        });
        let run = Arc::new(run);

        let mut workers = Vec::with_capacity(threads);
        for id in 0..threads {
            let shared = Arc::clone(&shared);
            let run = Arc::clone(&run);
            let handle = std::thread::Builder::new()
                .name(format!("mosquito-{id}"))
                .spawn(move || worker_loop(shared, run, id))
                .map_err(|e| DenoiseError::worker_spawn(e.to_string()))?;
            workers.push(handle);
        }

        Ok(Self { shared, workers })
    }

    /// Execute one stage on every worker; returns after all have finished.
    pub(crate) fn run(&self, stage: S) {
        let mut d = self.shared.dispatch.lock();
        d.stage = Some(stage);
        d.epoch += 1;
        d.pending = self.workers.len();
        self.shared.stage_ready.notify_all();
        while d.pending > 0 {
            self.shared.stage_done.wait(&mut d);
        }
    }

    /// Number of worker threads in the pool.
    pub(crate) fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl<S: Copy + Send + 'static> Drop for WorkerPool<S> {
    fn drop(&mut self) {
        {
            let mut d = self.shared.dispatch.lock();
            d.shutdown = true;
            self.shared.stage_ready.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop<S, F>(shared: Arc<Shared<S>>, run: Arc<F>, id: usize)
where
    S: Copy + Send + 'static,
    F: Fn(S, usize) + Send + Sync + 'static,
{
    let mut seen = 0u64;
    loop {
        let stage = {
            let mut d = shared.dispatch.lock();
            while !d.shutdown && d.epoch == seen {
                shared.stage_ready.wait(&mut d);
            }
            if d.shutdown {
                return;
            }
            seen = d.epoch;
            d.stage.expect("stage is published before the epoch advances")
        };

        run(stage, id);

        let mut d = shared.dispatch.lock();
        d.pending -= 1;
        if d.pending == 0 {
            shared.stage_done.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_split_range_covers_and_partitions() {
        for total in [0usize, 1, 2, 5, 8, 17, 100] {
            for workers in 1..=8usize {
                let mut next = 0;
                for worker in 0..workers {
                    let (start, end) = split_range(total, workers, worker);
                    assert_eq!(start, next, "ranges must be contiguous");
                    assert!(end >= start);
                    next = end;
                }
                assert_eq!(next, total, "ranges must cover [0, total)");
            }
        }
    }

    #[test]
    fn test_split_range_last_worker_owns_tail() {
        // The final worker always owns the last unit when total >= 1.
        for total in 1..20usize {
            for workers in 1..=8usize {
                let (start, end) = split_range(total, workers, workers - 1);
                assert_eq!(end, total);
                assert!(start < end);
            }
        }
    }

    #[test]
    fn test_pool_runs_every_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let pool = WorkerPool::new(4, move |_stage: u8, _worker| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.run(0);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        pool.run(1);
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_run_is_a_full_barrier() {
        // Stage 0 marks per-worker slots; stage 1 requires all of them set.
        let slots: Arc<Vec<AtomicUsize>> =
            Arc::new((0..4).map(|_| AtomicUsize::new(0)).collect());
        let seen_incomplete = Arc::new(AtomicUsize::new(0));

        let s = Arc::clone(&slots);
        let incomplete = Arc::clone(&seen_incomplete);
        let pool = WorkerPool::new(4, move |stage: u8, worker| match stage {
            0 => {
                s[worker].store(1, Ordering::SeqCst);
            }
            _ => {
                if s.iter().any(|slot| slot.load(Ordering::SeqCst) == 0) {
                    incomplete.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
        .unwrap();

        pool.run(0);
        pool.run(1);
        assert_eq!(seen_incomplete.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_joins_workers() {
        let pool = WorkerPool::new(2, |_stage: u8, _worker| {}).unwrap();
        assert_eq!(pool.threads(), 2);
        drop(pool); // must not hang
    }
}
