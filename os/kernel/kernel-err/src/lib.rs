//! # Kernel Error Substrate
//!
//! Every fallible operation in the kernel returns a [`KernelResult`], whose
//! error side is a named [`Error`]. An error is nothing more than a static
//! name plus a 64-bit identity derived from that name with XXH64, so that two
//! errors built from the same string compare equal no matter where they were
//! constructed:
//!
//! ```
//! use kernel_err::Error;
//!
//! const OUT_OF_MEMORY: Error = Error::new("OutOfMemory");
//! assert_eq!(OUT_OF_MEMORY, Error::new("OutOfMemory"));
//! assert_ne!(OUT_OF_MEMORY, Error::new("OverlappedMemory"));
//! ```
//!
//! ## Propagation
//!
//! * **try** is the `?` operator. It evaluates its operand exactly once and
//!   returns the contained error from the enclosing function on failure.
//! * **catch** is [`ResultExt::catch`], which yields the value on success or
//!   evaluates a fallback that receives the error.
//!
//! There is no unwinding anywhere in the kernel; failure always flows through
//! return values until a top-level routine decides to report it and halt.
//!
//! ## Identity
//!
//! Errors are identified by [`Error::id`] only. Distinctness relies on the
//! low collision probability of XXH64 over short ASCII names and is never
//! verified against the name itself.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod xxh64;

use core::hash::{Hash, Hasher};

pub use xxh64::xxh64;

/// Result type used by all fallible kernel operations.
pub type KernelResult<T> = core::result::Result<T, Error>;

/// A named error with a precomputed identity hash.
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("{name}")]
pub struct Error {
    name: &'static str,
    id: u64,
}

impl Error {
    /// Catch-all for error values that have no named case.
    pub const UNSUPPORTED: Self = Self::new("Unsupported error");

    /// Builds a named error, hashing `name` at construction time.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            id: xxh64(name.as_bytes(), 0),
        }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The XXH64 identity of [`name`](Self::name).
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Error {}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&'static str> for Error {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::UNSUPPORTED
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(_: log::SetLoggerError) -> Self {
        Self::UNSUPPORTED
    }
}

/// Convenience operations on [`KernelResult`].
pub trait ResultExt<T> {
    /// Yields the value, or evaluates `fallback` with the error.
    fn catch<F>(self, fallback: F) -> T
    where
        F: FnOnce(Error) -> T;

    /// Yields the value, or `fallback` on failure.
    fn catch_with(self, fallback: T) -> T;

    /// `true` only if this is a failure carrying `error`.
    fn is_error(&self, error: Error) -> bool;
}

impl<T> ResultExt<T> for KernelResult<T> {
    #[inline]
    fn catch<F>(self, fallback: F) -> T
    where
        F: FnOnce(Error) -> T,
    {
        match self {
            Ok(value) => value,
            Err(err) => fallback(err),
        }
    }

    #[inline]
    fn catch_with(self, fallback: T) -> T {
        self.unwrap_or(fallback)
    }

    #[inline]
    fn is_error(&self, error: Error) -> bool {
        matches!(self, Err(err) if *err == error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_keeps_the_name() {
        let err = Error::new("test");
        assert_eq!(err.name(), "test");
        assert_eq!(err.id(), xxh64(b"test", 0));
    }

    #[test]
    fn equality_is_structural() {
        let a = Error::new("test1");
        let b = Error::new("test2");
        let c = Error::new("test1");
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn display_prints_the_name() {
        let err = Error::new("OutOfMemory");
        assert_eq!(format!("{err}"), "OutOfMemory");
    }

    #[test]
    fn string_and_foreign_errors_convert() {
        let named: Error = "failure".into();
        assert_eq!(named, Error::new("failure"));

        let unsupported: Error = core::fmt::Error.into();
        assert_eq!(unsupported, Error::UNSUPPORTED);
        assert_eq!(unsupported.name(), "Unsupported error");
    }

    #[test]
    fn catch_and_is_error() {
        let failed: KernelResult<i32> = Err(Error::new("err"));
        assert!(failed.is_error(Error::new("err")));
        assert!(!failed.is_error(Error::new("other")));
        assert_eq!(failed.catch(|_| 1), 1);

        let ok: KernelResult<i32> = Ok(10);
        assert!(!ok.is_error(Error::new("err")));
        assert_eq!(ok.catch(|_| 1), 10);
        assert_eq!(ok.catch_with(3), 10);
        assert_eq!(failed.catch_with(3), 3);
    }

    #[test]
    fn catch_binds_the_error() {
        let failed: KernelResult<&str> = Err(Error::new("bound"));
        assert_eq!(failed.catch(|err| err.name()), "bound");
    }
}
