//! Saved machine state of the code interrupted by a trap.
//!
//! The trap stubs use the `x86-interrupt` calling convention, which saves and
//! restores the general-purpose registers on its own; what the handlers see
//! is the hardware frame plus the vector and error code. Handlers that change
//! control flow edit the frame fields and the stub writes them back.

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl Context {
    pub fn new(vector: usize, error_code: u64) -> Self {
        Self {
            vector: vector as u64,
            error_code,
            ..Self::default()
        }
    }

    pub fn ip(&self) -> u64 {
        self.rip
    }

    pub fn set_ip(&mut self, rip: u64) {
        self.rip = rip;
    }

    pub fn sp(&self) -> u64 {
        self.rsp
    }

    pub fn set_sp(&mut self, rsp: u64) {
        self.rsp = rsp;
    }

    /// Trapped from ring 3.
    pub fn is_user(&self) -> bool {
        self.cs & 0b11 == 0b11
    }
}

#[cfg(feature = "image")]
mod frame {
    use super::Context;
    use x86_64::registers::rflags::RFlags;
    use x86_64::structures::gdt::SegmentSelector;
    use x86_64::structures::idt::InterruptStackFrame;
    use x86_64::VirtAddr;

    impl Context {
        pub fn from_frame(vector: usize, error_code: u64, frame: &InterruptStackFrame) -> Self {
            Self {
                vector: vector as u64,
                error_code,
                rip: frame.instruction_pointer.as_u64(),
                cs: u64::from(frame.code_segment.0),
                rflags: frame.cpu_flags.bits(),
                rsp: frame.stack_pointer.as_u64(),
                ss: u64::from(frame.stack_segment.0),
            }
        }

        /// Write any edits made by the handlers back into the hardware frame.
        pub fn write_back(&self, frame: &mut InterruptStackFrame) {
            let original = Context::from_frame(self.vector as usize, self.error_code, frame);
            if original == *self {
                return;
            }

            let mut value = **frame;
            value.instruction_pointer = VirtAddr::new_truncate(self.rip);
            value.code_segment = SegmentSelector(self.cs as u16);
            value.cpu_flags = RFlags::from_bits_truncate(self.rflags);
            value.stack_pointer = VirtAddr::new_truncate(self.rsp);
            value.stack_segment = SegmentSelector(self.ss as u16);
            // Safety: the frame is the live one the CPU returns through; the
            // handlers that edited it own the decision to resume elsewhere
            unsafe { frame.as_mut().write(value) };
        }
    }
}
