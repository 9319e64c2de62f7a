//! Handler records.
//!
//! A `Handler` is owned by the subsystem that registers it, normally as a
//! `static`, and carries its own chain links so that attaching and detaching
//! never allocate.
//!
//! ```ignore
//! static TICKS: AtomicU64 = AtomicU64::new(0);
//! static TICK: Handler = Handler::new(on_tick, Some(&TICKS));
//!
//! fn on_tick(_v: Vector, _ctx: &mut Context, data: HandlerData) -> Status {
//!     match data.and_then(|d| d.downcast_ref::<AtomicU64>()) {
//!         Some(ticks) => { ticks.fetch_add(1, Ordering::Relaxed); Status::Handled }
//!         None => Status::Error,
//!     }
//! }
//! ```

use core::any::Any;
use core::cell::UnsafeCell;
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::Vector;
use crate::hal::cpu::Context;

/// What a handler reports for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The interrupt was raised by this handler's device.
    Handled,
    /// Not this handler's interrupt.
    NotMine,
    /// The handler failed. Counted; the rest of the chain still runs.
    Error,
}

/// Opaque per-handler data, recovered by the callback with `downcast_ref`.
pub type HandlerData = Option<&'static (dyn Any + Send + Sync)>;

pub type HandlerFn = fn(Vector, &mut Context, HandlerData) -> Status;

const DETACHED: usize = usize::MAX;

#[derive(Clone, Copy)]
pub(super) struct Links {
    pub(super) next: Option<NonNull<Handler>>,
    pub(super) prev: Option<NonNull<Handler>>,
}

impl Links {
    const fn unlinked() -> Self {
        Self {
            next: None,
            prev: None,
        }
    }
}

pub struct Handler {
    callback: HandlerFn,
    data: HandlerData,
    /// Vector the record is linked on, or `DETACHED`.
    owner: AtomicUsize,
    links: UnsafeCell<Links>,
}

// Safety: `links` is only read or written while holding the chain lock of the
// vector recorded in `owner`, and `owner` is claimed atomically.
unsafe impl Sync for Handler {}
unsafe impl Send for Handler {}

impl Handler {
    pub const fn new(callback: HandlerFn, data: HandlerData) -> Self {
        Self {
            callback,
            data,
            owner: AtomicUsize::new(DETACHED),
            links: UnsafeCell::new(Links::unlinked()),
        }
    }

    /// Vector this record is attached to, if any.
    pub fn vector(&self) -> Option<Vector> {
        match self.owner.load(Ordering::Acquire) {
            DETACHED => None,
            n => Vector::new(n).ok(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.owner.load(Ordering::Acquire) != DETACHED
    }

    pub fn data(&self) -> HandlerData {
        self.data
    }

    pub(super) fn invoke(&self, vector: Vector, ctx: &mut Context) -> Status {
        (self.callback)(vector, ctx, self.data)
    }

    /// Take ownership of the record for `vector`. Fails with the vector that
    /// already owns it.
    pub(super) fn claim(&self, vector: Vector) -> Result<(), usize> {
        self.owner
            .compare_exchange(DETACHED, vector.index(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
    }

    pub(super) fn release(&self) {
        self.owner.store(DETACHED, Ordering::Release);
    }

    pub(super) fn owned_by(&self, vector: Vector) -> bool {
        self.owner.load(Ordering::Acquire) == vector.index()
    }

    /// # Safety
    /// Caller holds the lock of the chain this record is linked on.
    pub(super) unsafe fn links(&self) -> Links {
        *self.links.get()
    }

    /// # Safety
    /// Caller holds the lock of the chain this record is being linked on.
    pub(super) unsafe fn set_links(&self, links: Links) {
        *self.links.get() = links;
    }

    /// # Safety
    /// As for `set_links`.
    pub(super) unsafe fn set_next(&self, next: NonNull<Handler>) {
        (*self.links.get()).next = Some(next);
    }

    /// # Safety
    /// As for `set_links`.
    pub(super) unsafe fn set_prev(&self, prev: NonNull<Handler>) {
        (*self.links.get()).prev = Some(prev);
    }

    pub(super) fn unlinked() -> Links {
        Links::unlinked()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("callback", &(self.callback as *const ()))
            .field("vector", &self.vector())
            .finish_non_exhaustive()
    }
}
