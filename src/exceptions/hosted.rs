/*!
 * Hosted Exceptions
 */

use super::{NativeException, Throwable};
use thiserror::Error;

/// Exception object thrown by the hosted runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostedException {
    message: String,
}

impl HostedException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Native exceptions reach hosted handlers with their message intact
impl From<NativeException> for HostedException {
    fn from(exception: NativeException) -> Self {
        Self::new(exception.what())
    }
}

impl Throwable for HostedException {
    fn message(&self) -> &str {
        &self.message
    }

    fn throw(self) -> ! {
        tracing::debug!(message = %self.message, "throwing hosted exception");
        std::panic::resume_unwind(Box::new(self))
    }
}
