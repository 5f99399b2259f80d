use core::cell::Cell;
use kernel_err::{Error, KernelResult, ResultExt};

const FAILURE: Error = Error::new("failure");

struct Producer {
    calls: Cell<usize>,
    fail: bool,
}

impl Producer {
    fn new(fail: bool) -> Self {
        Self {
            calls: Cell::new(0),
            fail,
        }
    }

    fn produce(&self) -> KernelResult<u32> {
        self.calls.set(self.calls.get() + 1);
        if self.fail { Err(FAILURE) } else { Ok(1) }
    }

    fn forward(&self) -> KernelResult<u32> {
        let value = self.produce()?;
        Ok(value + 1)
    }
}

#[test]
fn try_returns_the_value_on_success() {
    let p = Producer::new(false);
    assert_eq!(p.forward(), Ok(2));
    assert_eq!(p.calls.get(), 1);
}

#[test]
fn try_returns_the_same_error_on_failure() {
    let p = Producer::new(true);
    assert_eq!(p.forward(), Err(FAILURE));
    assert_eq!(p.calls.get(), 1, "operand must be evaluated exactly once");
}

#[test]
fn string_names_propagate_through_into() {
    fn fails() -> KernelResult<()> {
        Err("failure".into())
    }
    fn outer() -> KernelResult<()> {
        fails()?;
        Ok(())
    }
    assert!(outer().is_error(FAILURE));
}

#[test]
fn catch_falls_back_only_on_failure() {
    let p = Producer::new(true);
    let fallback_calls = Cell::new(0);
    let v = p.forward().catch(|err| {
        assert_eq!(err, FAILURE);
        fallback_calls.set(fallback_calls.get() + 1);
        7
    });
    assert_eq!(v, 7);
    assert_eq!(fallback_calls.get(), 1);
    assert_eq!(p.calls.get(), 1);
}

#[test]
fn distinct_names_have_distinct_identities() {
    let names = [
        "OutOfMemory",
        "OverlappedMemory",
        "InvalidAlignment",
        "FaultySerialPort",
        "MissingCodeSegment",
        "MissingDataSegment",
        "TablesNotBuilt",
        "Unsupported error",
        "x",
        "y",
    ];
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert_ne!(Error::new(*a), Error::new(*b), "{a} vs {b}");
        }
    }
}
