//! Kernel initialization phases
use crate::hal::console::{self, Attr};
use crate::hal::interrupts::{self, pic, Vector};
use crate::kernel::handlers;
use crate::println;

/// Initialize the kernel in order, stopping at the first failed phase.
pub fn init_kernel() -> Result<(), &'static str> {
    console::init();
    console::print(Attr::Bold, "rtk-hal kernel\n");

    init_phase(1, "Interrupt Table", init_interrupt_table)?;
    init_phase(2, "System Handlers", init_system_handlers)?;
    init_phase(3, "Interrupt Delivery", init_delivery)?;

    println!("Kernel initialization complete");
    Ok(())
}

const PHASES: usize = 3;

fn init_phase(
    n: usize,
    name: &'static str,
    init_fn: fn() -> Result<(), &'static str>,
) -> Result<(), &'static str> {
    println!("[{}/{}] Initializing {}...", n, PHASES, name);

    match init_fn() {
        Ok(()) => {
            println!("    {} initialized", name);
            Ok(())
        }
        Err(e) => {
            println!("    {} failed: {}", name, e);
            Err(e)
        }
    }
}

fn init_interrupt_table() -> Result<(), &'static str> {
    interrupts::init();
    Ok(())
}

fn init_system_handlers() -> Result<(), &'static str> {
    handlers::attach_system_handlers().map_err(|e| {
        println!("    {} (errno {})", e, e.as_errno());
        handlers::attach_failure(e)
    })
}

fn init_delivery() -> Result<(), &'static str> {
    if let Some(line) = Vector::SYSTICK.pic_line() {
        pic::unmask(line);
    }
    x86_64::instructions::interrupts::enable();
    Ok(())
}
