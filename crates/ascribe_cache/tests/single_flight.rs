//! Concurrency tests for the memo store on a multi-threaded runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ascribe_cache::{EntryState, Fingerprint, MemoStore};

fn fp(key: &str) -> Fingerprint {
    Fingerprint::compute("= Title\n\nHello world.", "/docs/a.adoc", 1, key)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_computation() {
    let store = Arc::new(MemoStore::<Arc<str>>::new(16).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let store = Arc::clone(&store);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                store
                    .get_or_try_insert_with(fp("html"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, std::io::Error>(Arc::<str>::from("<p>Hello world.</p>"))
                    })
                    .await
            })
        })
        .collect();

    let mut outputs = Vec::new();
    for task in tasks {
        outputs.push(task.await.unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(outputs.iter().all(|out| Arc::ptr_eq(out, &outputs[0])));
    assert_eq!(store.state(&fp("html")), EntryState::Resolved);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_keys_compute_independently() {
    let store = Arc::new(MemoStore::<usize>::new(16).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = ["ast", "html", "headings", "timeToRead"]
        .into_iter()
        .enumerate()
        .map(|(index, key)| {
            let store = Arc::clone(&store);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                store
                    .get_or_try_insert_with(fp(key), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, std::io::Error>(index)
                    })
                    .await
            })
        })
        .collect();

    for (index, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap().unwrap(), index);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(store.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_computation_does_not_poison_later_calls() {
    let store = MemoStore::<u32>::new(4).unwrap();

    let first = store
        .get_or_try_insert_with(fp("ast"), || async {
            Err::<u32, _>(std::io::Error::other("unterminated block"))
        })
        .await;
    assert!(first.is_err());
    assert_eq!(store.state(&fp("ast")), EntryState::Absent);

    let second = store
        .get_or_try_insert_with(fp("ast"), || async { Ok::<_, std::io::Error>(3) })
        .await
        .unwrap();
    assert_eq!(second, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiter_recomputes_after_failed_computation() {
    let store = Arc::new(MemoStore::<u32>::new(4).unwrap());
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let first = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .get_or_try_insert_with(fp("ast"), || async move {
                    let _ = release_rx.await;
                    Err::<u32, _>(std::io::Error::other("unterminated block"))
                })
                .await
        })
    };
    while store.state(&fp("ast")) != EntryState::Pending {
        tokio::task::yield_now().await;
    }

    let waiter = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .get_or_try_insert_with(fp("ast"), || async { Ok::<_, std::io::Error>(5) })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    release_tx.send(()).unwrap();

    assert!(first.await.unwrap().is_err());
    assert_eq!(waiter.await.unwrap().unwrap(), 5);
    assert_eq!(store.state(&fp("ast")), EntryState::Resolved);
}
