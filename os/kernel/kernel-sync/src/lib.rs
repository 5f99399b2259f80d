//! # Kernel synchronization primitives
//!
//! * [`SpinLock`] guards short read-modify-write sections such as an
//!   allocator watermark.
//! * [`ReadinessFlag`] is the one-shot signal the bootstrap core raises once
//!   the platform is initialized.
//! * [`SyncOnceCell`] publishes a value written by one core to all others.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod readiness;
mod spin_lock;
mod sync_once_cell;

pub use readiness::ReadinessFlag;
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
