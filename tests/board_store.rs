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

use chrono::{DateTime, Duration, TimeZone, Utc};
use lets_dance::core::constants::BOARD_MAX_COUNT;
use lets_dance::core::store::{BoardStore, StoreError};
use lets_dance::core::types::Board;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 5, 20, 12, 0, 0).unwrap()
}

fn open_store(dir: &tempfile::TempDir) -> BoardStore {
    BoardStore::open(dir.path().to_str().unwrap()).unwrap()
}

fn board(n: u32, last_modified: DateTime<Utc>) -> Board {
    Board {
        key: format!("{n:064x}"),
        content: format!("<time datetime=\"x\">board {n}</time>"),
        signature: "ab".repeat(64),
        last_modified,
    }
}

#[test]
fn upsert_creates_then_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let first = board(1, now());
    assert!(store.upsert(&first).unwrap());
    assert_eq!(store.get(&first.key).unwrap().unwrap(), first);
    assert_eq!(store.count(), 1);

    let mut second = board(1, now() + Duration::hours(1));
    second.content = "<time datetime=\"x\">rewritten</time>".to_string();
    assert!(!store.upsert(&second).unwrap());

    let stored = store.get(&first.key).unwrap().unwrap();
    assert_eq!(stored, second);
    assert_eq!(store.count(), 1);
}

#[test]
fn upsert_rejects_equal_or_older_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let current = board(2, now());
    store.upsert(&current).unwrap();

    let same = board(2, now());
    assert!(matches!(store.upsert(&same), Err(StoreError::Stale)));

    let older = board(2, now() - Duration::hours(1));
    assert!(matches!(store.upsert(&older), Err(StoreError::Stale)));

    // The stored row is untouched.
    assert_eq!(store.get(&current.key).unwrap().unwrap(), current);
}

#[test]
fn get_missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    assert!(store.get(&"0".repeat(64)).unwrap().is_none());
}

#[test]
fn expire_sweeps_only_old_boards() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.upsert(&board(1, now() - Duration::days(23))).unwrap();
    store.upsert(&board(2, now() - Duration::days(25))).unwrap();
    store.upsert(&board(3, now() - Duration::days(1))).unwrap();

    let removed = store.expire(now() - Duration::days(22)).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.count(), 1);
    assert!(store.get(&board(3, now()).key).unwrap().is_some());
    assert!(store.get(&board(1, now()).key).unwrap().is_none());
}

#[test]
fn difficulty_follows_the_quartic_curve() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert_eq!(store.difficulty(), 0.0);

    for n in 0..10 {
        store.upsert(&board(n, now())).unwrap();
    }
    let expected = (10.0 / BOARD_MAX_COUNT as f64).powi(4);
    assert!((store.difficulty() - expected).abs() < f64::EPSILON);
}

#[test]
fn sample_returns_distinct_boards_up_to_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    for n in 0..5 {
        store.upsert(&board(n, now())).unwrap();
    }

    let some = store.sample(3).unwrap();
    assert_eq!(some.len(), 3);
    let mut keys: Vec<_> = some.iter().map(|b| b.key.clone()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 3);

    let all = store.sample(10).unwrap();
    assert_eq!(all.len(), 5);
}

#[test]
fn peer_roster_add_remove_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert!(store.add_peer("https://bogbody.biz").unwrap());
    assert!(store.add_peer("https://spring83.kindrobot.ca").unwrap());
    // Re-adding is a no-op.
    assert!(!store.add_peer("https://bogbody.biz").unwrap());

    let peers = store.peers().unwrap();
    assert_eq!(peers.len(), 2);

    assert!(store.remove_peer("https://bogbody.biz").unwrap());
    assert!(!store.remove_peer("https://bogbody.biz").unwrap());
    assert_eq!(store.peers().unwrap().len(), 1);
}

#[test]
fn reopened_store_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(&dir);
        store.upsert(&board(7, now())).unwrap();
    }
    let store = open_store(&dir);
    assert_eq!(store.count(), 1);
    assert_eq!(store.get(&board(7, now()).key).unwrap().unwrap().last_modified, now());
}
