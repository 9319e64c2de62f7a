//! Host stand-in for the CPU: counts masking and captures reports.
//!
//! Each test thread plays one CPU, number 0 until it calls `set_cpu`.

use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use super::mask::Platform;
use super::Vector;
use crate::hal::console::Attr;

std::thread_local! {
    static CPU: Cell<usize> = const { Cell::new(0) };
}

pub struct TestPlatform {
    depth: AtomicUsize,
    mask_calls: AtomicUsize,
    lines: Mutex<Vec<(Attr, String)>>,
}

impl TestPlatform {
    pub const fn new() -> Self {
        Self {
            depth: AtomicUsize::new(0),
            mask_calls: AtomicUsize::new(0),
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn mask_calls(&self) -> usize {
        self.mask_calls.load(Ordering::SeqCst)
    }

    /// Make the calling thread act as CPU `cpu`.
    pub fn set_cpu(&self, cpu: usize) {
        CPU.with(|c| c.set(cpu));
    }

    pub fn lines(&self) -> Vec<(Attr, String)> {
        self.lines.lock().clone()
    }
}

impl Platform for TestPlatform {
    type Saved = usize;

    fn mask(&self, _vector: Vector) -> usize {
        self.mask_calls.fetch_add(1, Ordering::SeqCst);
        self.depth.fetch_add(1, Ordering::SeqCst)
    }

    fn unmask(&self, _vector: Vector, saved: usize) {
        self.depth.store(saved, Ordering::SeqCst);
    }

    fn cpu_id(&self) -> usize {
        CPU.with(Cell::get)
    }

    fn report(&self, attr: Attr, text: &str) {
        self.lines.lock().push((attr, String::from(text)));
    }
}
