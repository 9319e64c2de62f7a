#![no_std]
#![no_main]

extern crate rlibc;

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;

use rtk_hal::hal::console::{self, Attr};
use rtk_hal::hal::interrupts::{INTERRUPTS, SYSTICK_VECTOR};
use rtk_hal::kernel::{handlers, init_kernel};
use rtk_hal::println;

entry_point!(kernel_main);

/// Ticks between two status lines (~5 s with the PIT's default 18.2 Hz).
const REPORT_EVERY: u64 = 91;

pub fn kernel_main(_boot_info: &'static mut BootInfo) -> ! {
    if let Err(e) = init_kernel() {
        console::print(Attr::Bold, "Kernel initialization failed: ");
        console::print(Attr::Bold, e);
        halt_loop();
    }

    let mut last_report = 0;
    loop {
        x86_64::instructions::hlt();

        let ticks = handlers::ticks();
        if ticks - last_report >= REPORT_EVERY {
            last_report = ticks;
            if let Ok(stats) = INTERRUPTS.stats(SYSTICK_VECTOR) {
                println!(
                    "systick: {} ticks, fired {} handled {} unclaimed {} errors {}",
                    ticks, stats.fired, stats.handled, stats.unclaimed, stats.errors
                );
            }
        }
    }
}

fn halt_loop() -> ! {
    x86_64::instructions::interrupts::disable();
    loop {
        x86_64::instructions::hlt();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let mut buf = [0u8; 512];
    let msg = rtk_hal::format_no_std!(&mut buf, "PANIC : {} | {:?}\n", info.message(), info.location());
    // The panic may have struck with the console lock held.
    unsafe { console::CONSOLE.force_unlock() };
    console::print(Attr::Bold, msg);

    halt_loop()
}
