//! # Interrupt Descriptor Table and Trap Stubs
//!
//! Every wired vector gets a small `x86-interrupt` stub that snapshots the
//! hardware frame into a `Context`, runs the vector's chain and writes the
//! (possibly edited) frame back before `iretq`.
//!
//! | Vector        | Stub                | Unclaimed                |
//! |---------------|---------------------|--------------------------|
//! | 0, 6, 13, 14  | exception stubs     | panic                    |
//! | 1, 3          | debug, breakpoint   | logged, execution resumes|
//! | 8             | double fault        | always panics            |
//! | 32-47         | PIC IRQ 0-15        | counted as unclaimed, EOI|
//! | 0x80          | system call         | counted as unclaimed     |
//! | 0x81          | TLB shootdown       | counted as unclaimed     |

use spin::Lazy;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};
use x86_64::PrivilegeLevel;

use super::vectors::{Vector, SYSCALL_VECTOR, TLB_VECTOR};
use super::{pic, Context, Outcome};
use crate::println;

static IDT: Lazy<InterruptDescriptorTable> = Lazy::new(|| {
    let mut idt = InterruptDescriptorTable::new();

    // CPU EXCEPTIONS (0-31)
    idt.divide_error.set_handler_fn(divide_error_handler);
    idt.debug.set_handler_fn(debug_handler);
    idt.breakpoint.set_handler_fn(breakpoint_handler);
    idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
    idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
    idt.page_fault.set_handler_fn(page_fault_handler);
    idt.double_fault.set_handler_fn(double_fault_handler);

    // HARDWARE INTERRUPTS (32-47 after remapping)
    for (vector, stub) in IRQ_STUBS {
        idt[vector].set_handler_fn(stub);
    }

    // SOFTWARE VECTORS
    idt[SYSCALL_VECTOR as u8]
        .set_handler_fn(syscall_stub)
        .set_privilege_level(PrivilegeLevel::Ring3);
    idt[TLB_VECTOR as u8].set_handler_fn(tlb_stub);

    idt
});

pub fn init_idt() {
    IDT.load();
}

/// Snapshot, dispatch, write back.
fn enter(vector: usize, error_code: u64, frame: &mut InterruptStackFrame) -> Outcome {
    let mut ctx = Context::from_frame(vector, error_code, frame);
    let outcome = super::dispatch(vector, &mut ctx);
    ctx.write_back(frame);
    outcome
}

fn irq_entry(vector: usize, frame: &mut InterruptStackFrame) {
    enter(vector, 0, frame);
    if let Ok(v) = Vector::new(vector) {
        pic::end_of_interrupt(v);
    }
}

fn fatal_exception(vector: usize, error_code: u64, frame: &mut InterruptStackFrame, name: &str) {
    if !enter(vector, error_code, frame).is_handled() {
        panic!("EXCEPTION: {} (error code: {:#x})\n{:#?}", name, error_code, frame);
    }
}

macro_rules! irq_stubs {
    ($($name:ident = $vector:expr),* $(,)?) => {
        $(
            extern "x86-interrupt" fn $name(mut frame: InterruptStackFrame) {
                irq_entry($vector as usize, &mut frame);
            }
        )*

        const IRQ_STUBS: [(u8, extern "x86-interrupt" fn(InterruptStackFrame)); 16] = [
            $(($vector, $name)),*
        ];
    };
}

irq_stubs! {
    irq0 = 32, irq1 = 33, irq2 = 34, irq3 = 35,
    irq4 = 36, irq5 = 37, irq6 = 38, irq7 = 39,
    irq8 = 40, irq9 = 41, irq10 = 42, irq11 = 43,
    irq12 = 44, irq13 = 45, irq14 = 46, irq15 = 47,
}

extern "x86-interrupt" fn syscall_stub(mut frame: InterruptStackFrame) {
    enter(SYSCALL_VECTOR, 0, &mut frame);
}

extern "x86-interrupt" fn tlb_stub(mut frame: InterruptStackFrame) {
    enter(TLB_VECTOR, 0, &mut frame);
}

extern "x86-interrupt" fn divide_error_handler(mut frame: InterruptStackFrame) {
    fatal_exception(0, 0, &mut frame, "DIVIDE BY ZERO");
}

extern "x86-interrupt" fn debug_handler(mut frame: InterruptStackFrame) {
    if !enter(1, 0, &mut frame).is_handled() {
        println!("EXCEPTION: DEBUG at {:#x}", frame.instruction_pointer.as_u64());
    }
}

extern "x86-interrupt" fn breakpoint_handler(mut frame: InterruptStackFrame) {
    if !enter(3, 0, &mut frame).is_handled() {
        println!("EXCEPTION: BREAKPOINT\n{:#?}", frame);
    }
}

extern "x86-interrupt" fn invalid_opcode_handler(mut frame: InterruptStackFrame) {
    fatal_exception(6, 0, &mut frame, "INVALID OPCODE");
}

extern "x86-interrupt" fn general_protection_fault_handler(mut frame: InterruptStackFrame, error_code: u64) {
    fatal_exception(13, error_code, &mut frame, "GENERAL PROTECTION FAULT");
}

extern "x86-interrupt" fn page_fault_handler(mut frame: InterruptStackFrame, error_code: PageFaultErrorCode) {
    use x86_64::registers::control::Cr2;

    if !enter(14, error_code.bits(), &mut frame).is_handled() {
        panic!(
            "EXCEPTION: PAGE FAULT\nAccessed Address: {:?}\nError Code: {:?}\n{:#?}",
            Cr2::read(),
            error_code,
            frame
        );
    }
}

extern "x86-interrupt" fn double_fault_handler(frame: InterruptStackFrame, error_code: u64) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{frame:#?}\n CODE{error_code}");
}
