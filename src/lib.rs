//! # rtk-hal
//!
//! Hardware-abstraction layer of a small real-time kernel, centred on
//! interrupt-vector dispatch.
//!
//! ## Modules
//!
//! - `hal`: console, CPU context, interrupt registry and dispatcher
//! - `format`: heap-free formatting into fixed buffers
//! - `kernel`: system handlers and the boot sequence of the kernel image
//!
//! The crate is `no_std` and never allocates. Outside the `image` feature it
//! builds on any x86_64 host, which is how the unit tests run.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "image", feature(abi_x86_interrupt))]

pub mod format;
pub mod hal;
pub mod kernel;

pub use hal::interrupts::{
    Context, Handler, HandlerData, HandlerFn, IntrError, IntrTable, Outcome, Status, Vector,
};
