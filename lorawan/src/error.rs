//! Controller error type

use core::fmt;

/// Errors reported synchronously by controller operations
///
/// `E` is the error type of the MAC engine. None of the variants leave the
/// controller in a modified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// Application traffic is blocked while a certification session runs
    Blocked,
    /// The MAC engine rejected a join, session, send or class request
    SubmissionFailed(E),
    /// The requested device class is not supported
    InvalidTransition,
}

impl<E> From<E> for DeviceError<E> {
    fn from(error: E) -> Self {
        DeviceError::SubmissionFailed(error)
    }
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Blocked => f.write_str("blocked by certification session"),
            DeviceError::SubmissionFailed(e) => write!(f, "MAC engine rejected request: {:?}", e),
            DeviceError::InvalidTransition => f.write_str("unsupported device class"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for DeviceError<E> {}
