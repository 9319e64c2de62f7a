//! # Vector Numbers
//!
//! Vectors are IDT indices, fixed at build time.
//!
//! | Vector     | Source                                  |
//! |------------|-----------------------------------------|
//! | 0-31       | CPU exceptions                          |
//! | 32-39      | PIC 1, IRQ 0-7 (32 is the system tick)  |
//! | 40-47      | PIC 2, IRQ 8-15                         |
//! | 0x80       | System call trap                        |
//! | 0x81       | TLB shootdown between CPUs              |

use core::fmt;

use super::IntrError;

pub const MAX_VECTOR: usize = 255;
pub const VECTOR_COUNT: usize = MAX_VECTOR + 1;

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = 40;
pub const PIC_LINES: u8 = 16;

pub const SYSTICK_VECTOR: usize = PIC_1_OFFSET as usize;
pub const SYSCALL_VECTOR: usize = 0x80;
pub const TLB_VECTOR: usize = 0x81;

/// A vector number known to be in `0..=MAX_VECTOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vector(u16);

impl Vector {
    pub const SYSTICK: Vector = Vector(SYSTICK_VECTOR as u16);
    pub const SYSCALL: Vector = Vector(SYSCALL_VECTOR as u16);
    pub const TLB: Vector = Vector(TLB_VECTOR as u16);

    pub const fn new(n: usize) -> Result<Self, IntrError> {
        if n > MAX_VECTOR {
            return Err(IntrError::InvalidVector(n));
        }
        Ok(Self(n as u16))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// PIC line behind this vector, if it is one of the remapped IRQs.
    pub fn pic_line(self) -> Option<u8> {
        let first = PIC_1_OFFSET as usize;
        let n = self.index();
        if (first..first + PIC_LINES as usize).contains(&n) {
            Some((n - first) as u8)
        } else {
            None
        }
    }
}

impl From<Vector> for usize {
    fn from(v: Vector) -> usize {
        v.index()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
