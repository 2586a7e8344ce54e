// Copyright (c) 2026 Lets Dance
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! In-process scheduler for named one-shot and recurring jobs.
//!
//! Jobs are best-effort (gossip retries, TTL sweeps): nothing is durable and
//! queued work is dropped on [`Scheduler::stop`]. At most one job per id is
//! queued at a time; insertion picks between replacing the queued job and
//! keeping it. A min-heap orders jobs by run time while an id table carries
//! the callables; heap entries whose sequence number no longer matches the
//! table are superseded and never fire.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::{Notify, Semaphore};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Future run by a fired job.
pub type JobFuture = BoxFuture<'static, ()>;

/// Boxed job callable.
pub type JobFn = Box<dyn FnOnce() -> JobFuture + Send>;

/// What to do when a job id is already queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacePolicy {
    /// Unconditionally replace the queued job. The superseded callable
    /// never runs.
    Replace,
    /// Keep the queued job and signal the conflict to the caller.
    KeepExisting,
}

/// Scheduler error.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job with this id is queued and the policy keeps it.
    #[error("conflicting job id")]
    ConflictingId,
    /// The scheduler no longer accepts jobs.
    #[error("scheduler stopped")]
    Stopped,
}

struct HeapEntry {
    run_at: Instant,
    seq: u64,
    id: String,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_at == other.run_at && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.run_at
            .cmp(&other.run_at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

struct Pending {
    seq: u64,
    job: JobFn,
}

#[derive(Default)]
struct JobTable {
    heap: BinaryHeap<Reverse<HeapEntry>>,
    jobs: HashMap<String, Pending>,
    next_seq: u64,
    stopped: bool,
}

struct Inner {
    table: Mutex<JobTable>,
    notify: Notify,
    workers: Arc<Semaphore>,
    started: AtomicBool,
}

/// Handle to the process-wide scheduler. Cheap to clone.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Create a scheduler whose worker pool runs at most `workers` jobs
    /// concurrently. The driver does not run until [`Scheduler::start`].
    pub fn new(workers: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                table: Mutex::new(JobTable::default()),
                notify: Notify::new(),
                workers: Arc::new(Semaphore::new(workers.max(1))),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Queue `job` under `id` to run after `delay`.
    pub fn add<F, Fut>(
        &self,
        id: &str,
        delay: Duration,
        policy: ReplacePolicy,
        job: F,
    ) -> Result<(), SchedulerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let boxed: JobFn = Box::new(move || {
            let fut: JobFuture = Box::pin(job());
            fut
        });
        self.add_boxed(id.to_string(), delay, policy, boxed)
    }

    fn add_boxed(
        &self,
        id: String,
        delay: Duration,
        policy: ReplacePolicy,
        job: JobFn,
    ) -> Result<(), SchedulerError> {
        {
            let mut table = self
                .inner
                .table
                .lock()
                .map_err(|_| SchedulerError::Stopped)?;
            if table.stopped {
                return Err(SchedulerError::Stopped);
            }
            if table.jobs.contains_key(&id) && policy == ReplacePolicy::KeepExisting {
                return Err(SchedulerError::ConflictingId);
            }

            let seq = table.next_seq;
            table.next_seq += 1;
            let run_at = Instant::now() + delay;
            // A replaced entry stays in the heap with its old seq; the driver
            // discards it once popped.
            table.jobs.insert(id.clone(), Pending { seq, job });
            table.heap.push(Reverse(HeapEntry { run_at, seq, id }));
        }
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Queue a recurring job under `id`, first firing after `every` and then
    /// rescheduling itself on the same cadence.
    pub fn interval<F, Fut>(&self, id: &str, every: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let factory: Arc<dyn Fn() -> JobFuture + Send + Sync> =
            Arc::new(move || -> JobFuture { Box::pin(job()) });
        self.schedule_recurring(id.to_string(), every, factory);
    }

    fn schedule_recurring(
        &self,
        id: String,
        every: Duration,
        job: Arc<dyn Fn() -> JobFuture + Send + Sync>,
    ) {
        let scheduler = self.clone();
        let next_id = id.clone();
        let fire: JobFn = Box::new(move || {
            let fut: JobFuture = Box::pin(async move {
                let run = (job.as_ref())();
                run.await;
                scheduler.schedule_recurring(next_id, every, job);
            });
            fut
        });
        if let Err(e) = self.add_boxed(id, every, ReplacePolicy::Replace, fire) {
            debug!(error = %e, "recurring job not rescheduled");
        }
    }

    /// Is a job with this id queued?
    pub fn is_queued(&self, id: &str) -> bool {
        self.inner
            .table
            .lock()
            .map(|table| table.jobs.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of queued jobs.
    pub fn queued_len(&self) -> usize {
        self.inner
            .table
            .lock()
            .map(|table| table.jobs.len())
            .unwrap_or(0)
    }

    /// Start the driver task. Must be called exactly once per process; a
    /// second call is ignored with a warning.
    pub fn start(&self) {
        if self.inner.started.swap(true, AtomicOrdering::SeqCst) {
            warn!("scheduler already started");
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            Self::drive(inner).await;
        });
    }

    /// Stop accepting jobs and drop everything queued. In-flight jobs run to
    /// completion; queued retries are lost (gossip is best-effort).
    pub fn stop(&self) {
        if let Ok(mut table) = self.inner.table.lock() {
            table.stopped = true;
            table.jobs.clear();
            table.heap.clear();
        }
        self.inner.notify.notify_one();
    }

    async fn drive(inner: Arc<Inner>) {
        loop {
            let mut due: Vec<(String, JobFn)> = Vec::new();
            let next_wakeup = {
                let mut table = match inner.table.lock() {
                    Ok(table) => table,
                    Err(_) => {
                        warn!("scheduler job table poisoned; driver exiting");
                        return;
                    }
                };
                if table.stopped {
                    return;
                }

                let now = Instant::now();
                let mut next = None;
                loop {
                    let (run_at, seq, id) = match table.heap.peek() {
                        Some(Reverse(top)) => (top.run_at, top.seq, top.id.clone()),
                        None => break,
                    };
                    if table.jobs.get(&id).map(|p| p.seq) != Some(seq) {
                        // Superseded by a replace, or already fired.
                        table.heap.pop();
                        continue;
                    }
                    if run_at <= now {
                        table.heap.pop();
                        if let Some(pending) = table.jobs.remove(&id) {
                            due.push((id, pending.job));
                        }
                    } else {
                        next = Some(run_at);
                        break;
                    }
                }
                next
            };

            for (id, job) in due {
                debug!(job = %id, "firing job");
                let permits = Arc::clone(&inner.workers);
                tokio::spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    job().await;
                });
            }

            match next_wakeup {
                Some(at) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(at) => {}
                        _ = inner.notify.notified() => {}
                    }
                }
                None => inner.notify.notified().await,
            }
        }
    }
}
