//! Bounded worker pool with index-addressed results.

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a pool run.
#[derive(Debug)]
pub struct PoolOutput<R> {
    /// One slot per job; `None` when the job missed the deadline
    pub results: Vec<Option<R>>,
    /// Time spent waiting for results
    pub elapsed: Duration,
}

impl<R> PoolOutput<R> {
    /// Number of jobs without a result.
    pub fn pending(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }
}

/// Run `work` over `jobs` on `workers` threads.
///
/// Jobs go through a bounded queue; results come back tagged with their
/// index and are written into their slot. Waiting stops at the deadline.
/// Workers still busy at that point are abandoned and finish on their own.
pub fn run_indexed<T, R, F>(
    jobs: Vec<T>,
    workers: usize,
    timeout: Duration,
    work: F,
) -> PoolOutput<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let total = jobs.len();
    let workers = workers.clamp(1, total.max(1));

    let (job_tx, job_rx) = bounded::<(usize, T)>(workers * 2);
    let (result_tx, result_rx) = bounded::<(usize, R)>(total.max(1));
    let work = Arc::new(work);

    for id in 0..workers {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let work = Arc::clone(&work);
        let spawned = thread::Builder::new()
            .name(format!("bionify-worker-{}", id))
            .spawn(move || {
                for (index, job) in job_rx.iter() {
                    if result_tx.send((index, work(job))).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            warn!("Failed to spawn worker {}: {}", id, e);
        }
    }
    drop(job_rx);
    drop(result_tx);

    // Feed from a separate thread so collection can observe the deadline.
    let feeder = thread::Builder::new()
        .name("bionify-feeder".to_string())
        .spawn(move || {
            for (index, job) in jobs.into_iter().enumerate() {
                if job_tx.send_deadline((index, job), deadline).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = feeder {
        warn!("Failed to spawn job feeder: {}", e);
    }

    let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
    let mut received = 0;
    while received < total {
        match result_rx.recv_deadline(deadline) {
            Ok((index, result)) => {
                if let Some(slot) = results.get_mut(index) {
                    *slot = Some(result);
                    received += 1;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Worker pool timed out after {:?} with {} of {} jobs pending",
                    timeout,
                    total - received,
                    total
                );
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("All workers exited with {} of {} results", received, total);
                break;
            }
        }
    }

    PoolOutput {
        results,
        elapsed: start.elapsed(),
    }
}
