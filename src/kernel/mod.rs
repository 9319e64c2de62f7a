//! # Kernel Bootstrap
//!
//! Boot sequence of the kernel image and the handlers the kernel itself
//! keeps on the reserved vectors.
//!
//! - `init`: ordered init phases with progress on the console
//! - `handlers`: system tick, TLB shootdown and system call handlers

pub mod handlers;
#[cfg(feature = "image")]
pub mod init;

#[cfg(feature = "image")]
pub use init::init_kernel;
