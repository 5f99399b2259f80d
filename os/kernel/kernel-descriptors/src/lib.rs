//! # x86-64 Descriptor Tables
//!
//! Builds the two tables the CPU needs before it can take an exception in
//! long mode, and reports exceptions once they arrive.
//!
//! ## GDT layout
//! Index | Selector | Meaning
//! ------|----------|--------
//! 0     | 0x00     | Null
//! 1     | 0x08     | Kernel code (64-bit, DPL=0, execute/read)
//! 2     | 0x10     | Kernel data (DPL=0, read/write)
//!
//! The selectors are not hard-coded: [`Gdt::code_selector`] and
//! [`Gdt::data_selector`] find the segments by their access bits.
//!
//! ## IDT layout
//! 256 gates, all not present except the architectural exception vectors
//! `0..32`, which are trap gates into per-vector entry stubs supplied by the
//! caller. Each stub knows its vector and ends up in [`report_exception`].
//!
//! ## Lifetime
//! [`DescriptorTables::build`] places both tables in memory taken from an
//! early-boot [`Allocator`](kernel_alloc::Allocator). That memory is never
//! freed, so the tables can be loaded by every core for the rest of uptime.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod exceptions;
pub mod gdt;
pub mod idt;
mod pointer;
pub mod selectors;
mod tables;

pub use exceptions::{EXCEPTION_NAMES, exception_name, report_exception};
pub use gdt::{Gdt, MISSING_CODE_SEGMENT, MISSING_DATA_SEGMENT, SegmentDescriptor};
pub use idt::{GateDescriptor, GateType, Idt};
pub use pointer::DescriptorTablePointer;
pub use selectors::SegmentSelector;
pub use tables::{DescriptorTables, ExceptionHandlers, NULL_ALLOCATION};
