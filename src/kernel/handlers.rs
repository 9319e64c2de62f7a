//! Handlers the kernel keeps on its reserved vectors.
//!
//! | Vector           | Handler            | Private data  |
//! |------------------|--------------------|---------------|
//! | `SYSTICK_VECTOR` | tick counter       | `TickCounter` |
//! | `TLB_VECTOR`     | full TLB flush     | none          |
//! | `SYSCALL_VECTOR` | trap accounting    | `TickCounter` |

use core::sync::atomic::{AtomicU64, Ordering};

use crate::hal::interrupts::{
    set_handler, Context, Handler, HandlerData, IntrError, Status, Vector, SYSCALL_VECTOR,
    SYSTICK_VECTOR, TLB_VECTOR,
};

pub struct TickCounter {
    count: AtomicU64,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn bump(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

pub static TICKS: TickCounter = TickCounter::new();
pub static SYSCALLS: TickCounter = TickCounter::new();

pub static SYSTICK_HANDLER: Handler = Handler::new(count_event, Some(&TICKS));
pub static SYSCALL_HANDLER: Handler = Handler::new(count_event, Some(&SYSCALLS));
pub static TLB_HANDLER: Handler = Handler::new(flush_tlb, None);

fn count_event(_vector: Vector, _ctx: &mut Context, data: HandlerData) -> Status {
    match data.and_then(|d| d.downcast_ref::<TickCounter>()) {
        Some(counter) => {
            counter.bump();
            Status::Handled
        }
        None => Status::Error,
    }
}

fn flush_tlb(_vector: Vector, _ctx: &mut Context, _data: HandlerData) -> Status {
    x86_64::instructions::tlb::flush_all();
    Status::Handled
}

pub fn attach_system_handlers() -> Result<(), IntrError> {
    set_handler(SYSTICK_VECTOR, &SYSTICK_HANDLER)?;
    set_handler(TLB_VECTOR, &TLB_HANDLER)?;
    set_handler(SYSCALL_VECTOR, &SYSCALL_HANDLER)?;
    Ok(())
}

/// Boot-phase message for an `attach_system_handlers` failure.
pub fn attach_failure(e: IntrError) -> &'static str {
    match e {
        IntrError::InvalidVector(_) => "system vector out of range",
        IntrError::AlreadyAttached(_) => "system handler already registered",
        IntrError::NotAttached(_) | IntrError::Detached => "system handler not attached",
        IntrError::Reentrant(_) => "system vector busy on this CPU",
    }
}

/// System ticks since interrupts were enabled.
pub fn ticks() -> u64 {
    TICKS.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::interrupts::testing::TestPlatform;
    use crate::hal::interrupts::{IntrTable, Outcome};

    #[test]
    fn test_tick_counter_handler() {
        static COUNTER: TickCounter = TickCounter::new();
        static TICK: Handler = Handler::new(count_event, Some(&COUNTER));

        let table = Box::new(IntrTable::new(TestPlatform::new()));
        table.attach(SYSTICK_VECTOR, &TICK).unwrap();

        let mut ctx = Context::new(SYSTICK_VECTOR, 0);
        for _ in 0..3 {
            assert_eq!(table.dispatch(SYSTICK_VECTOR, &mut ctx), Outcome::Handled);
        }
        assert_eq!(COUNTER.get(), 3);
    }

    #[test]
    fn test_counter_without_data_reports_error() {
        static BROKEN: Handler = Handler::new(count_event, None);

        let table = Box::new(IntrTable::new(TestPlatform::new()));
        table.attach(SYSCALL_VECTOR, &BROKEN).unwrap();

        let mut ctx = Context::new(SYSCALL_VECTOR, 0);
        assert_eq!(table.dispatch(SYSCALL_VECTOR, &mut ctx), Outcome::NotMine);
        assert_eq!(table.stats(SYSCALL_VECTOR).unwrap().errors, 1);
    }

    #[test]
    fn test_attach_failure_names_the_cause() {
        let table = Box::new(IntrTable::new(TestPlatform::new()));
        static ONCE: Handler = Handler::new(flush_tlb, None);
        table.attach(TLB_VECTOR, &ONCE).unwrap();

        let err = table.attach(TLB_VECTOR, &ONCE).unwrap_err();
        assert_eq!(attach_failure(err), "system handler already registered");
        assert_eq!(
            attach_failure(IntrError::Reentrant(Vector::TLB)),
            "system vector busy on this CPU"
        );
        assert_eq!(attach_failure(IntrError::Detached), "system handler not attached");
        assert_eq!(attach_failure(IntrError::InvalidVector(300)), "system vector out of range");
    }
}
