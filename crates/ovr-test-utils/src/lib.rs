//! Testing utilities for OVR workspace
//!
//! Shared fixtures (a counter and a toggle unit), log capture and call
//! recorders.

#![allow(missing_docs)]

use mockall::automock;
use ovr_unit::{make_overridable, Overridable, OverridableOptions};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

pub type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Result of the counter unit
#[derive(Clone)]
pub struct Counter {
    pub count: i64,
    pub increment: Callback<()>,
    state: Arc<AtomicI64>,
}

impl Counter {
    /// Counter stuck at `count`, `increment` does nothing
    pub fn fixed(count: i64) -> Self {
        Self::with_increment(count, Arc::new(|()| {}))
    }

    /// Counter stuck at `count` with a custom `increment`
    pub fn with_increment(count: i64, increment: Callback<()>) -> Self {
        Self {
            count,
            increment,
            state: Arc::new(AtomicI64::new(count)),
        }
    }

    pub fn increment(&self) {
        (self.increment)(());
    }

    /// Count after any increments made through this value
    pub fn current(&self) -> i64 {
        self.state.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("count", &self.count)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

pub fn use_counter_raw(initial: i64) -> Counter {
    let state = Arc::new(AtomicI64::new(initial));
    let cell = Arc::clone(&state);
    Counter {
        count: initial,
        increment: Arc::new(move |()| {
            cell.fetch_add(1, Ordering::SeqCst);
        }),
        state,
    }
}

pub fn use_counter() -> Overridable<i64, Counter> {
    make_overridable(use_counter_raw, OverridableOptions::new())
}

/// Result of the toggle unit
#[derive(Clone)]
pub struct Toggle {
    pub toggled: bool,
    pub toggle: Callback<Option<bool>>,
    state: Arc<AtomicBool>,
}

impl Toggle {
    pub fn fixed(toggled: bool, toggle: Callback<Option<bool>>) -> Self {
        Self {
            toggled,
            toggle,
            state: Arc::new(AtomicBool::new(toggled)),
        }
    }

    pub fn current(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggle")
            .field("toggled", &self.toggled)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

pub fn use_toggle_raw(initial: bool) -> Toggle {
    let state = Arc::new(AtomicBool::new(initial));
    let cell = Arc::clone(&state);
    Toggle {
        toggled: initial,
        toggle: Arc::new(move |to: Option<bool>| match to {
            Some(value) => cell.store(value, Ordering::SeqCst),
            None => {
                cell.fetch_xor(true, Ordering::SeqCst);
            }
        }),
        state,
    }
}

pub fn use_toggle() -> Overridable<bool, Toggle> {
    make_overridable(use_toggle_raw, OverridableOptions::new())
}

/// Mockable side effect for substitute callbacks
#[automock]
pub trait Tick {
    fn tick(&self);
}

pub type SharedTick = Arc<Mutex<MockTick>>;

pub fn shared_tick(mock: MockTick) -> SharedTick {
    Arc::new(Mutex::new(mock))
}

/// Callback forwarding to the shared mock
pub fn tick_callback<A: 'static>(mock: &SharedTick) -> Callback<A> {
    let mock = Arc::clone(mock);
    Arc::new(move |_: A| mock.lock().tick())
}

/// Counts invocations of wrapped callables
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn counting<A, R, F>(&self, f: F) -> impl Fn(A) -> R + Send + Sync + 'static
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let hits = Arc::clone(&self.0);
        move |args: A| {
            hits.fetch_add(1, Ordering::SeqCst);
            f(args)
        }
    }
}

/// In-memory log sink
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every tracing event on this thread captured as plain text
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}

/// Install a global test subscriber filtered by `RUST_LOG`
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
