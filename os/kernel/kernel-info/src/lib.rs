//! # Boot Interface
//!
//! Read-only views over the structures the boot loader hands to every core,
//! and the compile-time constants the rest of the kernel agrees on.
//!
//! ## Modules
//!
//! ### Boot Information ([`boot`])
//! Decodes the fixed-layout boot information block:
//! * total block size, number of cores and the bootstrap core's hardware ID
//! * memory map entries, each a base address plus a size with a 4-bit type tag
//!
//! ### Environment ([`environment`])
//! Parses the boot loader's `key=value` environment block, used for boot-time
//! configuration such as the log level.
//!
//! ### Memory Layout ([`memory`])
//! Link addresses, table sizes and I/O ports.
//!
//! ## Boot Information Layout
//!
//! ```text
//! Offset  Width  Field
//! 0x00    4      magic (not validated)
//! 0x04    4      total size of the block in bytes
//! 0x0A    2      number of cores
//! 0x0C    2      hardware ID of the bootstrap core
//! 0x80    16*n   memory map entries
//!                  +0  u64 base address
//!                  +8  u64 size, low 4 bits hold the region type
//! ```
//!
//! The number of entries is `(size - 128) / 16`.
//!
//! ```rust
//! # use kernel_info::boot::{BootInfo, MemoryRegionKind};
//! let mut block = [0u8; 0x90];
//! block[0x04..0x08].copy_from_slice(&0x90u32.to_le_bytes());
//! block[0x0A..0x0C].copy_from_slice(&2u16.to_le_bytes());
//! block[0x80..0x88].copy_from_slice(&0x10_0000u64.to_le_bytes());
//! block[0x88..0x90].copy_from_slice(&(0x10_0000u64 | 1).to_le_bytes());
//!
//! let info = BootInfo::new(&block);
//! assert_eq!(info.num_cores(), 2);
//! let region = info.memory_region(0).unwrap();
//! assert_eq!(region.size(), 0x10_0000);
//! assert_eq!(region.kind(), MemoryRegionKind::Free);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod environment;
pub mod memory;
