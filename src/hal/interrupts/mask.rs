//! Interrupt masking and the platform seam.
//!
//! Chain mutation runs inside a `MaskGuard`, which suppresses the vector for
//! its lifetime and restores the previous state when dropped, on every path
//! out of the scope.

use super::Vector;
use crate::hal::console::{self, Attr};

/// What the registry needs from the CPU it runs on.
pub trait Platform {
    /// Masking state saved by `mask` and handed back to `unmask`.
    type Saved: Copy;

    /// Suppress delivery of `vector` (or of everything, when the platform
    /// cannot mask a single vector) and return the previous state.
    fn mask(&self, vector: Vector) -> Self::Saved;

    /// Restore the state returned by the matching `mask`.
    fn unmask(&self, vector: Vector, saved: Self::Saved);

    /// Identifier of the executing CPU, distinct for every CPU that can
    /// take interrupts.
    fn cpu_id(&self) -> usize;

    /// Emit one diagnostic line.
    fn report(&self, attr: Attr, text: &str);
}

pub struct MaskGuard<'a, P: Platform> {
    platform: &'a P,
    vector: Vector,
    saved: P::Saved,
}

impl<'a, P: Platform> MaskGuard<'a, P> {
    pub fn new(platform: &'a P, vector: Vector) -> Self {
        let saved = platform.mask(vector);
        Self {
            platform,
            vector,
            saved,
        }
    }
}

impl<'a, P: Platform> Drop for MaskGuard<'a, P> {
    fn drop(&mut self) {
        self.platform.unmask(self.vector, self.saved);
    }
}

/// x86_64 PC: the 8259 masks whole lines and exceptions cannot be masked at
/// all, so every vector is masked by clearing `RFLAGS.IF`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pc;

impl Platform for Pc {
    type Saved = bool;

    fn mask(&self, _vector: Vector) -> bool {
        let was_enabled = x86_64::instructions::interrupts::are_enabled();
        if was_enabled {
            x86_64::instructions::interrupts::disable();
        }
        was_enabled
    }

    fn unmask(&self, _vector: Vector, was_enabled: bool) {
        if was_enabled {
            x86_64::instructions::interrupts::enable();
        }
    }

    /// Initial local APIC ID, `CPUID.01H:EBX[31:24]`.
    #[allow(unused_unsafe)]
    fn cpu_id(&self) -> usize {
        // Safety: leaf 1 is implemented by every x86_64 processor
        let leaf = unsafe { core::arch::x86_64::__cpuid(1) };
        (leaf.ebx >> 24) as usize
    }

    fn report(&self, attr: Attr, text: &str) {
        console::print(attr, text);
        console::print(Attr::Plain, "\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::interrupts::testing::TestPlatform;

    #[test]
    fn test_guard_restores_on_drop() {
        let platform = TestPlatform::new();
        {
            let _outer = MaskGuard::new(&platform, Vector::SYSTICK);
            assert_eq!(platform.depth(), 1);
            {
                let _inner = MaskGuard::new(&platform, Vector::SYSTICK);
                assert_eq!(platform.depth(), 2);
            }
            assert_eq!(platform.depth(), 1);
        }
        assert_eq!(platform.depth(), 0);
        assert_eq!(platform.mask_calls(), 2);
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn masked_step(platform: &TestPlatform, fail: bool) -> Result<(), ()> {
            let _guard = MaskGuard::new(platform, Vector::TLB);
            if fail {
                return Err(());
            }
            Ok(())
        }

        let platform = TestPlatform::new();
        assert!(masked_step(&platform, true).is_err());
        assert_eq!(platform.depth(), 0);
        assert!(masked_step(&platform, false).is_ok());
        assert_eq!(platform.depth(), 0);
    }
}
