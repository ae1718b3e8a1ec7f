use std::time::Duration;

use localedge_common::{EngineError, FailureReason};
use localedge_engine::batch::{run_batch, run_batch_concurrent, CancelFlag};

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Done(usize),
    Failed(FailureReason),
}

fn tag(_: usize, _: &usize, reason: FailureReason, _: String) -> Outcome {
    Outcome::Failed(reason)
}

#[tokio::test(start_paused = true)]
async fn results_preserve_submission_order_and_length() {
    let items: Vec<usize> = (0..5).collect();
    let cancel = CancelFlag::new();

    let results = run_batch(
        &items,
        Duration::from_millis(1500),
        &cancel,
        |_, item| async move { Ok::<_, EngineError>(Outcome::Done(*item)) },
        tag,
    )
    .await;

    assert_eq!(results.len(), items.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(*result, Outcome::Done(i));
    }
}

#[tokio::test(start_paused = true)]
async fn one_failing_item_does_not_affect_the_others() {
    let items: Vec<usize> = (0..3).collect();
    let cancel = CancelFlag::new();

    let results = run_batch(
        &items,
        Duration::from_millis(1500),
        &cancel,
        |index, item| async move {
            if index == 1 {
                Err(EngineError::NavigationTimeout {
                    url: "https://slowsite.example".into(),
                    timeout_secs: 30,
                })
            } else {
                Ok(Outcome::Done(*item))
            }
        },
        tag,
    )
    .await;

    assert_eq!(
        results,
        vec![
            Outcome::Done(0),
            Outcome::Failed(FailureReason::NavigationTimeout),
            Outcome::Done(2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn politeness_delay_runs_after_every_item() {
    let items: Vec<usize> = (0..3).collect();
    let cancel = CancelFlag::new();
    let delay = Duration::from_millis(1000);

    let start = tokio::time::Instant::now();
    let results = run_batch(
        &items,
        delay,
        &cancel,
        |_, item| async move { Ok::<_, EngineError>(Outcome::Done(*item)) },
        tag,
    )
    .await;

    assert_eq!(results.len(), 3);
    // Three base delays; jitter only adds on top.
    assert!(start.elapsed() >= delay * 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_tags_the_unprocessed_tail() {
    let items: Vec<usize> = (0..5).collect();
    let cancel = CancelFlag::new();
    let cancel_inside = cancel.clone();

    let results = run_batch(
        &items,
        Duration::from_millis(1500),
        &cancel,
        |index, item| {
            let cancel_inside = cancel_inside.clone();
            async move {
                if index == 1 {
                    cancel_inside.cancel();
                }
                Ok::<_, EngineError>(Outcome::Done(*item))
            }
        },
        tag,
    )
    .await;

    assert_eq!(results.len(), 5);
    assert_eq!(results[0], Outcome::Done(0));
    assert_eq!(results[1], Outcome::Done(1));
    for result in &results[2..] {
        assert_eq!(*result, Outcome::Failed(FailureReason::Cancelled));
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_mode_returns_results_in_submission_order() {
    let items: Vec<usize> = (0..6).collect();
    let cancel = CancelFlag::new();

    // Earlier items take longer, so completion order inverts submission
    // order; the returned vector must not.
    let results = run_batch_concurrent(
        &items,
        3,
        Duration::from_millis(100),
        &cancel,
        |index, item| {
            let item = *item;
            async move {
                tokio::time::sleep(Duration::from_millis(((6 - index) * 50) as u64)).await;
                Ok::<_, EngineError>(Outcome::Done(item))
            }
        },
        tag,
    )
    .await;

    assert_eq!(results.len(), items.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(*result, Outcome::Done(i));
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_mode_isolates_failures_too() {
    let items: Vec<usize> = (0..4).collect();
    let cancel = CancelFlag::new();

    let results = run_batch_concurrent(
        &items,
        2,
        Duration::from_millis(100),
        &cancel,
        |index, item| {
            let item = *item;
            async move {
                if index == 2 {
                    Err(EngineError::NavigationFailed {
                        url: "https://downsite.example".into(),
                        cause: "connection refused".into(),
                    })
                } else {
                    Ok(Outcome::Done(item))
                }
            }
        },
        tag,
    )
    .await;

    assert_eq!(
        results,
        vec![
            Outcome::Done(0),
            Outcome::Done(1),
            Outcome::Failed(FailureReason::NavigationFailed),
            Outcome::Done(3),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_batch_returns_empty_results() {
    let items: Vec<usize> = Vec::new();
    let cancel = CancelFlag::new();

    let results = run_batch(
        &items,
        Duration::from_millis(1500),
        &cancel,
        |_, item| async move { Ok::<_, EngineError>(Outcome::Done(*item)) },
        tag,
    )
    .await;

    assert!(results.is_empty());
}
