//! Fault containment at the dispatch boundary.
//!
//! Every call from the shell into application, area or command code goes
//! through `guard`/`guard_result`. Panics and errors are logged and folded into
//! a `Fault`; nothing escapes into the dispatcher.

use std::collections::TryReserveError;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("out of memory")]
    OutOfMemory,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Fault {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Fault::OutOfMemory)
    }

    /// Classify an error returned by a hook
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<TryReserveError>().is_some() {
                return Fault::OutOfMemory;
            }
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                if io.kind() == std::io::ErrorKind::OutOfMemory {
                    return Fault::OutOfMemory;
                }
            }
        }
        Fault::Unexpected(format!("{:#}", err))
    }

    /// Classify a panic payload
    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        let lower = message.to_lowercase();
        if lower.contains("capacity overflow") || lower.contains("memory allocation") {
            Fault::OutOfMemory
        } else {
            Fault::Unexpected(message)
        }
    }
}

/// Run `f`, converting a panic into a `Fault`
pub fn guard<T>(context: &str, f: impl FnOnce() -> T) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            let fault = Fault::from_panic(payload);
            tracing::error!("{} panicked: {}", context, fault);
            Err(fault)
        }
    }
}

/// Like `guard`, also folding a returned error into a `Fault`
pub fn guard_result<T>(context: &str, f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, Fault> {
    match guard(context, f)? {
        Ok(value) => Ok(value),
        Err(err) => {
            let fault = Fault::from_error(&err);
            tracing::error!("{} failed: {:#}", context, err);
            Err(fault)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_guard_passes_values_through() {
        assert_eq!(guard("value", || 42), Ok(42));
    }

    #[test]
    fn test_guard_catches_panics() {
        let res: Result<(), Fault> = guard("boom", || panic!("boom"));
        assert_eq!(res, Err(Fault::Unexpected("boom".to_string())));
    }

    #[test]
    fn test_capacity_overflow_panic_is_out_of_memory() {
        let res: Result<(), Fault> = guard("alloc", || panic!("capacity overflow"));
        assert_eq!(res, Err(Fault::OutOfMemory));
    }

    #[test]
    fn test_guard_result_classifies_errors() {
        let res: Result<(), Fault> = guard_result("plain", || Err(anyhow!("nope")));
        assert!(matches!(res, Err(Fault::Unexpected(_))));

        let res: Result<(), Fault> = guard_result("reserve", || {
            let mut v: Vec<u8> = Vec::new();
            v.try_reserve(usize::MAX)?;
            Ok(())
        });
        assert_eq!(res, Err(Fault::OutOfMemory));

        let res: Result<(), Fault> = guard_result("io", || {
            Err(std::io::Error::from(std::io::ErrorKind::OutOfMemory).into())
        });
        assert!(res.unwrap_err().is_out_of_memory());
    }
}
