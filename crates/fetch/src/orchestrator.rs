//! Per-view fetch coordination.
//!
//! One orchestrator instance lives per view. Every `run` starts all slots
//! concurrently, so the worst-case view latency is the slowest single fetch,
//! not the sum. Slot failures are contained: the slot's fallback is surfaced
//! and the error recorded, the rest of the view loads normally.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use freightline_core::ClientError;

use crate::lifetime::ViewLifetime;
use crate::state::{FetchSlot, ViewLoadState};

/// Handle to one view activation's in-flight fetch set.
pub struct ViewHandle {
    lifetime: ViewLifetime,
    tasks: Vec<JoinHandle<()>>,
}

impl ViewHandle {
    /// The activation's lifetime token.
    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// Called when the view goes away. Any slot resolving after this is a
    /// no-op: no state write, no notification.
    pub fn dispose(&self) {
        self.lifetime.dispose();
    }

    /// Wait for every spawned slot task to finish. Disposal does not abort
    /// the tasks (cancellation is cooperative), so this quiesces the run.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Coordinates a view's independent fetches.
///
/// Holds the current activation's shared state, which also keeps the watch
/// sender alive for late subscribers until the run is superseded or the
/// orchestrator is dropped.
pub struct DataOrchestrator {
    current: Mutex<Option<Arc<RunShared>>>,
}

struct RunShared {
    lifetime: ViewLifetime,
    state: Mutex<RunState>,
    tx: watch::Sender<ViewLoadState>,
}

struct RunState {
    view: ViewLoadState,
    remaining: usize,
}

impl DataOrchestrator {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Start all slots concurrently and stream the unified load state.
    ///
    /// A second `run` on the same orchestrator (manual refresh) supersedes
    /// the previous activation: its lifetime token is disposed, so stale
    /// resolutions from the old run can never leak into the new state.
    pub fn run(&self, slots: Vec<FetchSlot>) -> (ViewHandle, watch::Receiver<ViewLoadState>) {
        let lifetime = ViewLifetime::new();

        let initial = if slots.is_empty() {
            ViewLoadState::settled()
        } else {
            ViewLoadState::pending()
        };
        let (tx, rx) = watch::channel(initial);

        let shared = Arc::new(RunShared {
            lifetime: lifetime.clone(),
            state: Mutex::new(RunState {
                view: ViewLoadState::pending(),
                remaining: slots.len(),
            }),
            tx,
        });

        {
            let mut current = self.current.lock().expect("orchestrator lock poisoned");
            if let Some(previous) = current.replace(shared.clone()) {
                previous.lifetime.dispose();
            }
        }

        let mut tasks = Vec::with_capacity(slots.len());
        for slot in slots {
            let shared = shared.clone();
            tasks.push(tokio::spawn(async move {
                let outcome = slot.run.await;
                resolve(&shared, slot.key, slot.fallback, outcome);
            }));
        }

        (ViewHandle { lifetime, tasks }, rx)
    }
}

impl Default for DataOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold one slot's outcome into the shared state and publish a snapshot.
///
/// The lifetime check happens here, at resolution time: a disposed view gets
/// neither the write nor the notification.
fn resolve(shared: &RunShared, key: String, fallback: Value, outcome: Result<Value, ClientError>) {
    if shared.lifetime.is_disposed() {
        tracing::debug!(slot = %key, "dropping resolution for disposed view");
        return;
    }

    let snapshot = {
        let mut run = shared.state.lock().expect("run state lock poisoned");
        match outcome {
            Ok(value) => {
                run.view.values.insert(key, value);
            }
            Err(err) => {
                tracing::warn!(slot = %key, error = %err, "fetch slot failed, using fallback");
                run.view.values.insert(key.clone(), fallback);
                run.view.errors.insert(key, err);
            }
        }
        run.remaining -= 1;
        if run.remaining == 0 {
            run.view.pending = false;
        }
        run.view.clone()
    };

    // Re-check: disposal may have raced the fold above. Resolution-time
    // suppression only needs to be cooperative, but skipping the send keeps
    // disposed receivers quiet.
    if shared.lifetime.is_live() {
        let _ = shared.tx.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightline_core::ClientError;
    use serde_json::{Value, json};
    use tokio::sync::{Barrier, oneshot};

    fn ok_slot(key: &str, value: Value) -> FetchSlot {
        FetchSlot::new(key, json!(null), async move { Ok(value) })
    }

    fn failing_slot(key: &str, fallback: Value) -> FetchSlot {
        FetchSlot::new(key, fallback, async {
            Err(ClientError::network("connection refused"))
        })
    }

    #[tokio::test]
    async fn all_successes_settle_with_every_value() {
        let orchestrator = DataOrchestrator::new();
        let (handle, rx) = orchestrator.run(vec![
            ok_slot("stats", json!({"active": 3})),
            ok_slot("freights", json!(["f1", "f2"])),
        ]);

        handle.join().await;

        let state = rx.borrow().clone();
        assert!(!state.pending);
        assert_eq!(state.values.len(), 2);
        assert!(state.errors.is_empty());
        assert_eq!(state.value("stats"), Some(&json!({"active": 3})));
    }

    #[tokio::test]
    async fn failures_are_contained_to_their_slot() {
        let orchestrator = DataOrchestrator::new();
        let (handle, rx) = orchestrator.run(vec![
            failing_slot("stats", json!({"active": 0, "total": 0})),
            ok_slot("freights", json!(["f1", "f2"])),
        ]);

        handle.join().await;

        let state = rx.borrow().clone();
        assert!(!state.pending);
        // Every slot reports a value: the failed one degrades to its fallback.
        assert_eq!(state.values.len(), 2);
        assert_eq!(state.value("stats"), Some(&json!({"active": 0, "total": 0})));
        assert_eq!(state.value("freights"), Some(&json!(["f1", "f2"])));
        assert_eq!(state.errors.len(), 1);
        assert!(state.error("stats").is_some());
        assert!(state.error("freights").is_none());
    }

    #[tokio::test]
    async fn error_count_matches_failing_slots() {
        let orchestrator = DataOrchestrator::new();
        let slots = vec![
            ok_slot("a", json!(1)),
            failing_slot("b", json!(null)),
            ok_slot("c", json!(3)),
            failing_slot("d", json!(null)),
            failing_slot("e", json!(null)),
        ];
        let k = slots.len();

        let (handle, rx) = orchestrator.run(slots);
        handle.join().await;

        let state = rx.borrow().clone();
        assert!(!state.pending);
        assert_eq!(state.values.len(), k);
        assert_eq!(state.errors.len(), 3);
    }

    #[tokio::test]
    async fn slots_run_concurrently_not_sequentially() {
        // Both slots block on the same barrier; sequential execution would
        // never release it.
        let barrier = Arc::new(Barrier::new(2));
        let b1 = barrier.clone();
        let b2 = barrier.clone();

        let orchestrator = DataOrchestrator::new();
        let (handle, _rx) = orchestrator.run(vec![
            FetchSlot::new("first", json!(null), async move {
                b1.wait().await;
                Ok(json!(1))
            }),
            FetchSlot::new("second", json!(null), async move {
                b2.wait().await;
                Ok(json!(2))
            }),
        ]);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle.join())
            .await
            .expect("slots did not run concurrently");
    }

    #[tokio::test]
    async fn disposed_view_receives_no_writes() {
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let orchestrator = DataOrchestrator::new();
        let (handle, rx) = orchestrator.run(vec![FetchSlot::new(
            "slow",
            json!(null),
            async move {
                let _ = release_rx.await;
                Ok(json!("too late"))
            },
        )]);

        handle.dispose();
        release_tx.send(()).unwrap();

        let lifetime = handle.lifetime().clone();
        handle.join().await;
        assert!(lifetime.is_disposed());

        // Spy: the watch channel never saw a post-disposal notification and
        // the state still holds zero resolutions.
        assert!(!rx.has_changed().unwrap());
        let state = rx.borrow().clone();
        assert!(state.pending);
        assert!(state.values.is_empty());
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn refresh_supersedes_the_previous_run() {
        let (slow_tx, slow_rx) = oneshot::channel::<()>();

        let orchestrator = DataOrchestrator::new();
        let (first_handle, first_rx) = orchestrator.run(vec![FetchSlot::new(
            "data",
            json!(null),
            async move {
                let _ = slow_rx.await;
                Ok(json!("stale"))
            },
        )]);

        // Manual refresh before the first run resolves.
        let (second_handle, second_rx) =
            orchestrator.run(vec![ok_slot("data", json!("fresh"))]);
        second_handle.join().await;

        // Now let the superseded fetch land.
        slow_tx.send(()).unwrap();
        first_handle.join().await;

        let stale = first_rx.borrow().clone();
        assert!(stale.pending);
        assert!(stale.values.is_empty());

        let fresh = second_rx.borrow().clone();
        assert!(!fresh.pending);
        assert_eq!(fresh.value("data"), Some(&json!("fresh")));
    }

    #[tokio::test]
    async fn empty_slot_set_settles_immediately() {
        let orchestrator = DataOrchestrator::new();
        let (handle, rx) = orchestrator.run(Vec::new());
        handle.join().await;

        let state = rx.borrow().clone();
        assert!(!state.pending);
        assert!(state.values.is_empty());
    }

    #[tokio::test]
    async fn partial_results_stream_incrementally() {
        let (gate_tx, gate_rx) = oneshot::channel::<()>();

        let orchestrator = DataOrchestrator::new();
        let (handle, mut rx) = orchestrator.run(vec![
            ok_slot("fast", json!("done")),
            FetchSlot::new("slow", json!(null), async move {
                let _ = gate_rx.await;
                Ok(json!("later"))
            }),
        ]);

        // First update: fast slot resolved, view still pending.
        rx.changed().await.unwrap();
        {
            let state = rx.borrow_and_update().clone();
            assert!(state.pending);
            assert_eq!(state.value("fast"), Some(&json!("done")));
        }

        gate_tx.send(()).unwrap();
        handle.join().await;

        let state = rx.borrow().clone();
        assert!(!state.pending);
        assert_eq!(state.values.len(), 2);
    }
}
