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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use lets_dance::core::store::BoardStore;
use lets_dance::core::timecodec::Clock;
use lets_dance::core::types::Board;
use lets_dance::monitoring::metrics::Metrics;
use lets_dance::scheduler::{ReplacePolicy, Scheduler, SchedulerError};
use lets_dance::tasks::schedule_board_expiry;

/// Let spawned worker tasks run to completion on the paused runtime.
async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

fn counting_job(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> futures::future::BoxFuture<'static, ()> {
    let counter = Arc::clone(counter);
    move || -> futures::future::BoxFuture<'static, ()> {
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[tokio::test(start_paused = true)]
async fn delayed_job_fires_after_its_delay() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let fired = Arc::new(AtomicUsize::new(0));
    scheduler
        .add(
            "job",
            Duration::from_secs(300),
            ReplacePolicy::Replace,
            counting_job(&fired),
        )
        .unwrap();
    assert!(scheduler.is_queued("job"));

    tokio::time::sleep(Duration::from_secs(299)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_queued("job"));
}

#[tokio::test(start_paused = true)]
async fn zero_delay_job_fires_promptly() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let fired = Arc::new(AtomicUsize::new(0));
    scheduler
        .add("job", Duration::ZERO, ReplacePolicy::Replace, counting_job(&fired))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn keep_existing_signals_the_conflict() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    scheduler
        .add(
            "job",
            Duration::from_secs(100),
            ReplacePolicy::KeepExisting,
            counting_job(&first),
        )
        .unwrap();
    let conflict = scheduler.add(
        "job",
        Duration::from_secs(1),
        ReplacePolicy::KeepExisting,
        counting_job(&second),
    );
    assert!(matches!(conflict, Err(SchedulerError::ConflictingId)));
    assert_eq!(scheduler.queued_len(), 1);

    // The first schedule survives: nothing fires at the second delay.
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(99)).await;
    settle().await;
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn replace_supersedes_the_queued_callable() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    scheduler
        .add(
            "job",
            Duration::from_secs(50),
            ReplacePolicy::Replace,
            counting_job(&first),
        )
        .unwrap();
    scheduler
        .add(
            "job",
            Duration::from_secs(100),
            ReplacePolicy::Replace,
            counting_job(&second),
        )
        .unwrap();
    assert_eq!(scheduler.queued_len(), 1);

    // The replaced callable must not run at its old deadline.
    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(41)).await;
    settle().await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn jobs_can_reschedule_themselves() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let chain = scheduler.clone();
    scheduler
        .add("retry", Duration::from_secs(10), ReplacePolicy::Replace, move || {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let counter2 = Arc::clone(&counter);
                let _ = chain.add(
                    "retry",
                    Duration::from_secs(20),
                    ReplacePolicy::Replace,
                    move || {
                        Box::pin(async move {
                            counter2.fetch_add(1, Ordering::SeqCst);
                        })
                    },
                );
            })
        })
        .unwrap();

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_queued("retry"));

    tokio::time::sleep(Duration::from_secs(21)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
    assert!(!scheduler.is_queued("retry"));
}

#[tokio::test(start_paused = true)]
async fn interval_job_recurs() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    scheduler.interval("tick", Duration::from_secs(10), move || {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
    }
    assert_eq!(ticks.load(Ordering::SeqCst), 3);
    assert!(scheduler.is_queued("tick"));
}

#[tokio::test(start_paused = true)]
async fn expiry_job_sweeps_old_boards_every_hour() {
    struct FixedClock(DateTime<Utc>);
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    let now = Utc.with_ymd_and_hms(2022, 5, 20, 12, 0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = BoardStore::open(dir.path().to_str().unwrap()).unwrap();

    let board = |n: u32, last_modified: DateTime<Utc>| Board {
        key: format!("{n:064x}"),
        content: "irrelevant".to_string(),
        signature: "ab".repeat(64),
        last_modified,
    };
    store.upsert(&board(1, now - chrono::Duration::days(23))).unwrap();
    store.upsert(&board(2, now - chrono::Duration::days(1))).unwrap();

    let scheduler = Scheduler::new(2);
    scheduler.start();
    let metrics = Arc::new(Metrics::new().unwrap());
    schedule_board_expiry(
        &scheduler,
        store.clone(),
        Arc::new(FixedClock(now)),
        Arc::clone(&metrics),
    );

    tokio::time::sleep(Duration::from_secs(3601)).await;
    settle().await;

    assert_eq!(store.count(), 1);
    assert!(store.get(&board(2, now).key).unwrap().is_some());
    assert_eq!(metrics.boards_expired_total.get(), 1);
    // Still queued for the next hourly run.
    assert!(scheduler.is_queued("expire_old_boards"));
}

#[tokio::test(start_paused = true)]
async fn stop_drops_queued_jobs_and_rejects_new_ones() {
    let scheduler = Scheduler::new(2);
    scheduler.start();

    let fired = Arc::new(AtomicUsize::new(0));
    scheduler
        .add(
            "job",
            Duration::from_secs(10),
            ReplacePolicy::Replace,
            counting_job(&fired),
        )
        .unwrap();

    scheduler.stop();
    assert_eq!(scheduler.queued_len(), 0);

    tokio::time::sleep(Duration::from_secs(20)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    let rejected = scheduler.add(
        "late",
        Duration::ZERO,
        ReplacePolicy::Replace,
        counting_job(&fired),
    );
    assert!(matches!(rejected, Err(SchedulerError::Stopped)));
}
