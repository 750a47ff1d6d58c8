/*!
 * Native Exceptions
 */

use super::Throwable;
use thiserror::Error;

/// Language-level exception raised from native code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what}")]
pub struct NativeException {
    what: String,
}

impl NativeException {
    pub fn new(what: impl Into<String>) -> Self {
        Self { what: what.into() }
    }

    pub fn what(&self) -> &str {
        &self.what
    }
}

impl Throwable for NativeException {
    fn message(&self) -> &str {
        &self.what
    }
}
