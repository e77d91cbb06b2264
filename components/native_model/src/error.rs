//! Native error codes.

use std::fmt;

/// A native status code. Negative values are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    /// Unspecified failure
    pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
    /// Not implemented
    pub const E_NOTIMPL: HResult = HResult(0x8000_4001_u32 as i32);
    /// Interface not supported
    pub const E_NOINTERFACE: HResult = HResult(0x8000_4002_u32 as i32);
    /// Operation aborted (used for canceled async operations)
    pub const E_ABORT: HResult = HResult(0x8000_4004_u32 as i32);
    /// One or more arguments are invalid
    pub const E_INVALIDARG: HResult = HResult(0x8007_0057_u32 as i32);
    /// Index out of bounds
    pub const E_BOUNDS: HResult = HResult(0x8000_000B_u32 as i32);
    /// Method called at an unexpected time
    pub const E_ILLEGAL_METHOD_CALL: HResult = HResult(0x8000_000E_u32 as i32);
    /// Delegate assigned more than once
    pub const E_ILLEGAL_DELEGATE_ASSIGNMENT: HResult = HResult(0x8000_0018_u32 as i32);
    /// Object has been closed
    pub const RO_E_CLOSED: HResult = HResult(0x8000_0013_u32 as i32);

    /// True for failure codes.
    pub fn is_err(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// An error raised by a native object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct NativeError {
    /// Status code
    pub code: HResult,
    /// Description, possibly empty
    pub message: String,
}

impl NativeError {
    /// Creates an error from a code and message.
    pub fn new(code: HResult, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `E_NOINTERFACE` for a failed typed cast.
    pub fn no_interface(what: &str) -> Self {
        Self::new(HResult::E_NOINTERFACE, format!("No such interface supported: {}", what))
    }

    /// `E_ABORT` for a canceled operation.
    pub fn canceled() -> Self {
        Self::new(HResult::E_ABORT, "Operation canceled")
    }
}
