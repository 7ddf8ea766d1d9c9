//! Once-only, monotonic lifecycle transitions.
//!
//! A [`Lifecycle`] walks `Unbooted -> Booted -> ShuttingDown -> Shutdown` and
//! never goes back. Each of [`Lifecycle::boot`] and [`Lifecycle::shutdown`] runs
//! its transition at most once; concurrent callers wait for the first one to
//! finish and then return without doing anything.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Unbooted,
    Booted,
    ShuttingDown,
    Shutdown,
}

pub struct Lifecycle {
    state: Mutex<LifecycleState>,
    booted: OnceCell<()>,
    shut_down: OnceCell<()>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Unbooted),
            booted: OnceCell::new(),
            shut_down: OnceCell::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Runs `hook` and enters `Booted`, unless a boot already happened or the
    /// lifecycle is already past `Unbooted`.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub async fn boot<F>(&self, hook: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let mut performed = false;
        let flag = &mut performed;
        self.booted
            .get_or_init(|| async move {
                if self.state() == LifecycleState::Unbooted {
                    hook.await;
                    *flag = self.advance(LifecycleState::Booted);
                }
            })
            .await;
        performed
    }

    /// Enters `ShuttingDown`, runs `hook`, then enters `Shutdown`.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub async fn shutdown<F>(&self, hook: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let mut performed = false;
        let flag = &mut performed;
        self.shut_down
            .get_or_init(|| async move {
                if self.advance(LifecycleState::ShuttingDown) {
                    hook.await;
                    *flag = self.advance(LifecycleState::Shutdown);
                }
            })
            .await;
        performed
    }

    fn advance(&self, next: LifecycleState) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *state >= next {
            return false;
        }
        *state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_boot_then_shutdown() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Unbooted);

        assert!(lifecycle.boot(async {}).await);
        assert_eq!(lifecycle.state(), LifecycleState::Booted);

        assert!(lifecycle.shutdown(async {}).await);
        assert_eq!(lifecycle.state(), LifecycleState::Shutdown);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_no_ops() {
        let lifecycle = Lifecycle::new();
        let hooks = AtomicUsize::new(0);

        assert!(lifecycle.boot(async { hooks.fetch_add(1, Ordering::SeqCst); }).await);
        assert!(!lifecycle.boot(async { hooks.fetch_add(1, Ordering::SeqCst); }).await);
        assert!(lifecycle.shutdown(async { hooks.fetch_add(1, Ordering::SeqCst); }).await);
        assert!(!lifecycle.shutdown(async { hooks.fetch_add(1, Ordering::SeqCst); }).await);

        assert_eq!(hooks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_boot_after_shutdown_does_not_revive() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.shutdown(async {}).await);
        assert!(!lifecycle.boot(async {}).await);
        assert_eq!(lifecycle.state(), LifecycleState::Shutdown);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_boot_runs_hook_once() {
        let lifecycle = Arc::new(Lifecycle::new());
        let hooks = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let lifecycle = lifecycle.clone();
                let hooks = hooks.clone();
                tokio::spawn(async move {
                    lifecycle
                        .boot(async {
                            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
                            hooks.fetch_add(1, Ordering::SeqCst);
                        })
                        .await
                })
            })
            .collect();

        let performed = futures::future::join_all(handles)
            .await
            .into_iter()
            .filter(|r| *r.as_ref().unwrap())
            .count();

        assert_eq!(performed, 1);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
        assert_eq!(lifecycle.state(), LifecycleState::Booted);
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(LifecycleState::Unbooted < LifecycleState::Booted);
        assert!(LifecycleState::Booted < LifecycleState::ShuttingDown);
        assert!(LifecycleState::ShuttingDown < LifecycleState::Shutdown);
    }
}
