//! Component lifetime scope.
//!
//! Async work started by a component runs inside its scope. Once the scope
//! is unmounted, in-flight futures resolve to `None` and spawned tasks are
//! aborted, so nothing writes to state that no longer has an owner.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Clone)]
pub struct ComponentScope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    unmounted: watch::Sender<bool>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ComponentScope {
    pub fn new() -> Self {
        let (unmounted, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner {
                unmounted,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !*self.inner.unmounted.borrow()
    }

    /// Await `fut` unless the scope is unmounted first.
    ///
    /// Returns `None` if the scope was (or became) unmounted; the result of
    /// `fut`, if any, is discarded.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        let mut rx = self.inner.unmounted.subscribe();
        if *rx.borrow_and_update() {
            return None;
        }
        tokio::select! {
            out = fut => self.is_mounted().then_some(out),
            _ = rx.wait_for(|unmounted| *unmounted) => None,
        }
    }

    /// Spawn a task that is aborted when the scope unmounts.
    ///
    /// Returns `None` without spawning if the scope is already unmounted.
    pub fn spawn<F>(&self, fut: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if !self.is_mounted() {
            return None;
        }
        let handle = tokio::spawn(fut);
        if let Ok(mut tasks) = self.inner.tasks.lock() {
            tasks.retain(|t| !t.is_finished());
            tasks.push(handle.abort_handle());
        }
        Some(handle)
    }

    /// Tear down: cancel in-flight `run` futures and abort spawned tasks.
    pub fn unmount(&self) {
        self.inner.unmounted.send_replace(true);
        if let Ok(mut tasks) = self.inner.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

impl Default for ComponentScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn run_returns_output_while_mounted() {
        let scope = ComponentScope::new();
        assert_eq!(scope.run(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn run_after_unmount_is_none() {
        let scope = ComponentScope::new();
        scope.unmount();
        assert!(!scope.is_mounted());
        assert_eq!(scope.run(async { 42 }).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_in_flight_run() {
        let scope = ComponentScope::new();
        let child = scope.clone();
        let pending = tokio::spawn(async move {
            child
                .run(async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    "late"
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        scope.unmount();
        assert_eq!(pending.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_aborts_spawned_tasks() {
        let scope = ComponentScope::new();
        let handle = scope
            .spawn(async {
                tokio::time::sleep(Duration::from_secs(3)).await;
            })
            .unwrap();

        scope.unmount();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(scope.spawn(async {}).is_none());
    }
}
