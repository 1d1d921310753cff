//! Host context primitives
//!
//! The two operations the override machinery needs from the surrounding call
//! tree: publish a registry for everything invoked below a point, and read
//! the nearest published registry.
//!
//! The current registry lives in a thread-local slot. [`provide`] installs a
//! registry for the duration of a closure and restores the previous one
//! afterwards, also when the closure unwinds. [`provide_future`] does the same
//! around every poll of a future, so the registry follows the task across
//! `.await` points and worker threads.

use crate::registry::Registry;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

thread_local! {
    static CURRENT: RefCell<Option<Arc<Registry>>> = const { RefCell::new(None) };
}

/// Restores the previously published registry on drop
struct Restore {
    previous: Option<Arc<Registry>>,
}

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // Slot may already be gone during thread teardown.
        let _ = CURRENT.try_with(|slot| *slot.borrow_mut() = previous);
    }
}

fn enter(registry: Arc<Registry>) -> Restore {
    let previous = CURRENT.with(|slot| slot.replace(Some(registry)));
    Restore { previous }
}

/// Run `f` with `registry` as the nearest published registry
pub fn provide<T>(registry: Arc<Registry>, f: impl FnOnce() -> T) -> T {
    let _restore = enter(registry);
    f()
}

/// Nearest published registry on this thread, if any
#[must_use]
pub fn nearest() -> Option<Arc<Registry>> {
    CURRENT.try_with(|slot| slot.borrow().clone()).ok().flatten()
}

/// Publish `registry` around every poll of `future`
pub fn provide_future<F: Future>(registry: Arc<Registry>, future: F) -> Provided<F> {
    Provided {
        registry,
        inner: Box::pin(future),
    }
}

/// Future returned by [`provide_future`]
#[must_use = "futures do nothing unless polled"]
pub struct Provided<F> {
    registry: Arc<Registry>,
    inner: Pin<Box<F>>,
}

impl<F> Provided<F> {
    /// Registry published while the inner future runs
    #[inline]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl<F: Future> Future for Provided<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let _restore = enter(Arc::clone(&this.registry));
        this.inner.as_mut().poll(cx)
    }
}

impl<F> std::fmt::Debug for Provided<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provided")
            .field("depth", &self.registry.depth())
            .finish_non_exhaustive()
    }
}
