//! In-flight gates: at most one holder at a time, released on drop.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A non-blocking mutual-exclusion flag.
///
/// Unlike a mutex, a second caller does not wait: it is turned away and the
/// work it wanted to do is dropped.
#[derive(Debug, Clone, Default)]
pub struct InFlightGate {
    busy: Arc<AtomicBool>,
}

/// Holds an [`InFlightGate`] until dropped.
#[derive(Debug)]
pub struct GateGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl InFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate, or `None` if someone already holds it.
    pub fn try_enter(&self) -> Option<GateGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run `work` if the gate is free. Returns `None` without polling `work`
    /// when it is held.
    pub async fn run_exclusive<F: Future>(&self, work: F) -> Option<F::Output> {
        let _guard = self.try_enter()?;
        Some(work.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn second_entry_is_refused_until_release() {
        let gate = InFlightGate::new();
        let guard = gate.try_enter().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_enter().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_enter().is_some());
    }

    #[tokio::test]
    async fn run_exclusive_coalesces_overlapping_work() {
        let gate = InFlightGate::new();
        let slow = gate.run_exclusive(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            1
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            gate.run_exclusive(async { 2 }).await
        };

        let (first, second) = tokio::join!(slow, fast);
        assert_eq!(first, Some(1));
        assert_eq!(second, None);
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn released_after_error() {
        let gate = InFlightGate::new();
        let result: Option<Result<(), &str>> = gate.run_exclusive(async { Err("failed") }).await;
        assert_eq!(result, Some(Err("failed")));
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn released_after_panic() {
        let gate = InFlightGate::new();
        let task_gate = gate.clone();
        let handle = tokio::spawn(async move {
            task_gate
                .run_exclusive(async {
                    let fail = true;
                    if fail {
                        panic!("analysis blew up");
                    }
                })
                .await
        });
        assert!(handle.await.is_err());
        assert!(!gate.is_busy());
    }

    #[test]
    fn clones_share_the_flag() {
        let gate = InFlightGate::new();
        let other = gate.clone();
        let _guard = gate.try_enter().unwrap();
        assert!(other.try_enter().is_none());
    }
}
