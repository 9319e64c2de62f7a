//! # Hardware Abstraction Layer
//!
//! ## Submodules
//!
//! - `console`: serial console with rendering attributes
//! - `cpu`: saved machine context handed to interrupt handlers
//! - `interrupts`: vector registry, dispatcher, masking and trap glue
//!
//! ## Initialization Order
//!
//! 1. Console (COM1) so that boot failures can be reported
//! 2. IDT with the trap stubs that feed the dispatcher
//! 3. PIC remap and unmask of the lines the kernel uses

pub mod console;
pub mod cpu;
pub mod interrupts;
