//! # Processor Bring-Up
//!
//! Every core enters the kernel at the same entry point. Each one decides its
//! [`Role`] by comparing its hardware ID with the bootstrap ID from the boot
//! block, then runs exactly one path:
//!
//! ```text
//!                   ┌─► RunningBootstrap ──► seed allocators ─► platform init ─► publish ─┐
//! Unstarted ─ role ─┤                                                                     ├─► Halted
//!                   └─► RunningApplication ─► wait for readiness ─► local init ───────────┘
//! ```
//!
//! The [`SystemState`] readiness flag is the only cross-core synchronization
//! point. Application cores spin on it with a pause between polls. If the
//! bootstrap core fails it reports the error and halts without publishing,
//! which leaves the application cores spinning forever.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod platform;
mod processor;
mod system;

pub use platform::Platform;
pub use processor::{Processor, ProcessorState, Role};
pub use system::SystemState;
