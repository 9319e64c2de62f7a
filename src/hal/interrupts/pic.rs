//! # Programmable Interrupt Controller (8259 PIC)
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   PIC 1     │     │   PIC 2     │
//! │  (Master)   │◀────│  (Slave)    │
//! │ IRQ 0-7     │     │ IRQ 8-15    │
//! └─────────────┘     └─────────────┘
//!       │
//!       ▼
//!     CPU
//! ```
//!
//! IRQ 0-15 are remapped to vectors 32-47 so they do not collide with CPU
//! exceptions. All lines start masked; `unmask` opens the ones that have
//! a driver.

use pic8259::ChainedPics;
use spin::Mutex;

use super::vectors::{Vector, PIC_1_OFFSET, PIC_2_OFFSET};

/// IRQ line the slave PIC is cascaded on.
const CASCADE_LINE: u8 = 2;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

pub fn init() {
    let mut pics = PICS.lock();
    unsafe {
        pics.initialize();
        pics.write_masks(!(1 << CASCADE_LINE), 0xff);
    }
}

/// Let IRQ `line` (0-15) through to the CPU.
pub fn unmask(line: u8) {
    let mut pics = PICS.lock();
    unsafe {
        let [mut master, mut slave] = pics.read_masks();
        if line < 8 {
            master &= !(1 << line);
        } else {
            slave &= !(1 << (line - 8));
        }
        pics.write_masks(master, slave);
    }
}

/// Acknowledge `vector` if it came through the PICs.
pub fn end_of_interrupt(vector: Vector) {
    if vector.pic_line().is_some() {
        unsafe {
            PICS.lock().notify_end_of_interrupt(vector.index() as u8);
        }
    }
}
