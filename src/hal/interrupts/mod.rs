//! # Interrupt Handling
//!
//! Attach any number of handlers to a vector; when the vector fires they run
//! in the order they were attached.
//!
//! - **Registry** (`table`): one intrusive chain per vector, O(1) attach and
//!   detach, no allocation
//! - **Dispatcher** (`dispatch`): walks a chain and folds handler statuses
//!   into an `Outcome`
//! - **Masking** (`mask`): RAII scope around every chain mutation
//! - **Trap glue** (`idt`, `pic`, feature `image`): IDT stubs that build a
//!   `Context` and call `dispatch`, plus 8259 remap and EOI
//!
//! ## Usage
//!
//! ```ignore
//! static TICKS: AtomicU64 = AtomicU64::new(0);
//! static TICK: Handler = Handler::new(on_tick, Some(&TICKS));
//!
//! interrupts::set_handler(SYSTICK_VECTOR, &TICK)?;
//! // ...
//! interrupts::delete_handler(&TICK)?;
//! ```

mod chain;
mod dispatch;
mod error;
mod handler;
mod mask;
mod table;
pub mod vectors;

#[cfg(feature = "image")]
pub mod idt;
#[cfg(feature = "image")]
pub mod pic;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::hal::cpu::Context;
pub use dispatch::Outcome;
pub use error::{ErrorKind, IntrError};
pub use handler::{Handler, HandlerData, HandlerFn, Status};
pub use mask::{MaskGuard, Pc, Platform};
pub use table::{IntrTable, VectorStats};
pub use vectors::{Vector, MAX_VECTOR, SYSCALL_VECTOR, SYSTICK_VECTOR, TLB_VECTOR};

/// The kernel's vector table. Every chain starts out empty.
#[cfg(not(test))]
pub static INTERRUPTS: IntrTable<Pc> = IntrTable::new(Pc);
#[cfg(test)]
pub static INTERRUPTS: IntrTable<testing::TestPlatform> =
    IntrTable::new(testing::TestPlatform::new());

pub fn set_handler(vector: usize, handler: &'static Handler) -> Result<(), IntrError> {
    INTERRUPTS.attach(vector, handler)
}

pub fn delete_handler(handler: &'static Handler) -> Result<(), IntrError> {
    INTERRUPTS.detach_any(handler)
}

pub fn dispatch(vector: usize, ctx: &mut Context) -> Outcome {
    INTERRUPTS.dispatch(vector, ctx)
}

/// Load the IDT and bring up the PICs with every line masked.
#[cfg(feature = "image")]
pub fn init() {
    idt::init_idt();
    pic::init();
}
