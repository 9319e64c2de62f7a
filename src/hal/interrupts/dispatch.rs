//! # Dispatcher
//!
//! Runs every handler on a fired vector's chain, head to tail, and folds
//! their statuses into one `Outcome`:
//!
//! | Statuses seen                   | Outcome   |
//! |---------------------------------|-----------|
//! | at least one `Handled`          | `Handled` |
//! | only `NotMine` / `Error`, none  | `NotMine` |
//!
//! A handler returning `Error` is counted and the walk goes on; its
//! neighbours still get to look at the interrupt. What to do with an
//! unclaimed interrupt is up to the trap glue.

use core::fmt::Write;
use core::sync::atomic::Ordering;

use super::mask::Platform;
use super::table::IntrTable;
use super::vectors::MAX_VECTOR;
use super::{IntrError, Status, Vector};
use crate::format::FmtBuf;
use crate::hal::console::Attr;
use crate::hal::cpu::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    NotMine,
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        self == Outcome::Handled
    }
}

impl<P: Platform> IntrTable<P> {
    /// Invoke the handlers of `vector` for one hardware event.
    ///
    /// An out-of-range vector means the vector routing is broken; it is
    /// reported and the kernel halts.
    pub fn dispatch(&self, vector: usize, ctx: &mut Context) -> Outcome {
        let vector = match Vector::new(vector) {
            Ok(v) => v,
            Err(e) => self.fatal(e),
        };
        let slot = self.slot(vector);
        // A holder on this CPU is either a handler of this vector raising it
        // again or a thread-context mutation hit by an exception. Neither
        // releases the lock while we wait.
        let chain = match slot.lock(self.platform().cpu_id()) {
            Some(chain) => chain,
            None => self.fatal(IntrError::Reentrant(vector)),
        };

        let mut outcome = Outcome::NotMine;
        let mut errors = 0;
        for handler in chain.iter() {
            match handler.invoke(vector, ctx) {
                Status::Handled => outcome = Outcome::Handled,
                Status::NotMine => {}
                Status::Error => errors += 1,
            }
        }
        drop(chain);

        let counters = &slot.counters;
        counters.fired.fetch_add(1, Ordering::Relaxed);
        if errors > 0 {
            counters.errors.fetch_add(errors, Ordering::Relaxed);
        }
        match outcome {
            Outcome::Handled => counters.handled.fetch_add(1, Ordering::Relaxed),
            Outcome::NotMine => counters.unclaimed.fetch_add(1, Ordering::Relaxed),
        };
        outcome
    }

    fn fatal(&self, err: IntrError) -> ! {
        let mut buf = [0u8; 96];
        let mut line = FmtBuf::new(&mut buf);
        let _ = write!(line, "hal: dispatch failed: {} (vectors 0..={})", err, MAX_VECTOR);
        self.platform().report(Attr::Bold, line.as_str());
        if line.is_truncated() {
            self.platform().report(Attr::Bold, "hal: (diagnostic truncated)");
        }
        panic!("interrupt dispatch: {}", err);
    }
}
