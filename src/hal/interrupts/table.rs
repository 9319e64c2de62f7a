//! # Handler Registry
//!
//! One chain per vector, stored in a fixed array that is fully initialized at
//! compile time. Attach and detach are O(1) and run with the vector masked on
//! the local CPU and the chain's spin lock held, so a dispatch never observes
//! a half-linked record.
//!
//! Each chain lock records the CPU holding it, and a CPU asking for a lock it
//! already holds is refused instead of spinning forever. Calls made from a
//! handler or a `for_each` visitor get `IntrError::Reentrant`; a dispatch
//! that finds its own CPU holding the chain (an exception taken halfway
//! through a mutation) halts the kernel. Other CPUs wait their turn.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use spin::{Mutex, MutexGuard};

use super::chain::Chain;
use super::mask::{MaskGuard, Platform};
use super::vectors::VECTOR_COUNT;
use super::{Handler, IntrError, Vector};

const NO_CPU: usize = usize::MAX;

/// Counters for one vector, as returned by `IntrTable::stats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VectorStats {
    /// Dispatches of this vector.
    pub fired: u64,
    /// Dispatches claimed by at least one handler.
    pub handled: u64,
    /// Dispatches nobody claimed, including those with an empty chain.
    pub unclaimed: u64,
    /// Handler invocations that returned `Status::Error`.
    pub errors: u64,
}

pub(super) struct Counters {
    pub(super) fired: AtomicU64,
    pub(super) handled: AtomicU64,
    pub(super) unclaimed: AtomicU64,
    pub(super) errors: AtomicU64,
}

impl Counters {
    const fn new() -> Self {
        Self {
            fired: AtomicU64::new(0),
            handled: AtomicU64::new(0),
            unclaimed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> VectorStats {
        VectorStats {
            fired: self.fired.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            unclaimed: self.unclaimed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

pub(super) struct Slot {
    chain: Mutex<Chain>,
    /// CPU holding `chain`, or `NO_CPU`.
    locked_by: AtomicUsize,
    pub(super) counters: Counters,
}

impl Slot {
    const fn new() -> Self {
        Self {
            chain: Mutex::new(Chain::new()),
            locked_by: AtomicUsize::new(NO_CPU),
            counters: Counters::new(),
        }
    }

    /// Take the chain lock on behalf of `cpu`.
    ///
    /// Spins while another CPU holds it. Returns `None` when `cpu` is the
    /// holder, since the lock would then never be released.
    pub(super) fn lock(&self, cpu: usize) -> Option<ChainGuard<'_>> {
        loop {
            if let Some(chain) = self.chain.try_lock() {
                self.locked_by.store(cpu, Ordering::Release);
                return Some(ChainGuard {
                    chain,
                    locked_by: &self.locked_by,
                });
            }
            // Only this CPU ever stores its own id, and it clears the word
            // before unlocking, so seeing it here means we are the holder.
            if self.locked_by.load(Ordering::Acquire) == cpu {
                return None;
            }
            core::hint::spin_loop();
        }
    }
}

/// A held chain lock. Forgets its holder before the lock is released.
pub(super) struct ChainGuard<'a> {
    chain: MutexGuard<'a, Chain>,
    locked_by: &'a AtomicUsize,
}

impl Deref for ChainGuard<'_> {
    type Target = Chain;

    fn deref(&self) -> &Chain {
        &self.chain
    }
}

impl DerefMut for ChainGuard<'_> {
    fn deref_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        self.locked_by.store(NO_CPU, Ordering::Release);
    }
}

pub struct IntrTable<P: Platform> {
    platform: P,
    slots: [Slot; VECTOR_COUNT],
}

impl<P: Platform> IntrTable<P> {
    pub const fn new(platform: P) -> Self {
        const EMPTY: Slot = Slot::new();
        Self {
            platform,
            slots: [EMPTY; VECTOR_COUNT],
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub(super) fn slot(&self, vector: Vector) -> &Slot {
        &self.slots[vector.index()]
    }

    /// Append `handler` to the chain of `vector`; it runs after every
    /// handler attached before it.
    pub fn attach(&self, vector: usize, handler: &'static Handler) -> Result<(), IntrError> {
        let vector = Vector::new(vector)?;
        let _mask = MaskGuard::new(&self.platform, vector);
        let mut chain = self.lock_chain(vector)?;

        if let Err(owner) = handler.claim(vector) {
            return Err(IntrError::AlreadyAttached(Vector::new(owner).unwrap_or(vector)));
        }
        // Safety: the record was just claimed for this chain, so it is not
        // linked anywhere, and the chain lock is held
        unsafe { chain.push_back(handler) };
        Ok(())
    }

    /// Remove `handler` from the chain of `vector`.
    pub fn detach(&self, vector: usize, handler: &'static Handler) -> Result<(), IntrError> {
        let vector = Vector::new(vector)?;
        if !handler.owned_by(vector) {
            return Err(IntrError::NotAttached(vector));
        }

        let _mask = MaskGuard::new(&self.platform, vector);
        let mut chain = self.lock_chain(vector)?;
        // Another CPU may have detached it while we waited for the lock.
        if !handler.owned_by(vector) {
            return Err(IntrError::NotAttached(vector));
        }
        // Safety: owned by this vector and the lock is held, so it is linked here
        unsafe { chain.unlink(handler) };
        handler.release();
        Ok(())
    }

    /// Remove `handler` from whichever chain it is on.
    pub fn detach_any(&self, handler: &'static Handler) -> Result<(), IntrError> {
        match handler.vector() {
            Some(vector) => self.detach(vector.index(), handler),
            None => Err(IntrError::Detached),
        }
    }

    /// Visit the handlers of `vector` head to tail.
    pub fn for_each<F>(&self, vector: usize, mut visit: F) -> Result<(), IntrError>
    where
        F: FnMut(&'static Handler),
    {
        let vector = Vector::new(vector)?;
        let _mask = MaskGuard::new(&self.platform, vector);
        let chain = self.lock_chain(vector)?;
        chain.iter().for_each(&mut visit);
        Ok(())
    }

    /// Number of handlers attached to `vector`.
    pub fn len(&self, vector: usize) -> Result<usize, IntrError> {
        let vector = Vector::new(vector)?;
        let _mask = MaskGuard::new(&self.platform, vector);
        let chain = self.lock_chain(vector)?;
        Ok(chain.len())
    }

    pub fn stats(&self, vector: usize) -> Result<VectorStats, IntrError> {
        let vector = Vector::new(vector)?;
        Ok(self.slot(vector).counters.snapshot())
    }

    fn lock_chain(&self, vector: Vector) -> Result<ChainGuard<'_>, IntrError> {
        self.slot(vector)
            .lock(self.platform.cpu_id())
            .ok_or(IntrError::Reentrant(vector))
    }
}
