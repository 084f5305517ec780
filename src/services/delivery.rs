//! Callback-then-result fan-out shared by every asynchronous service call.

use crate::services::{ServiceError, Status};

/// Caller-supplied completion callback: the payload on success, `None` on
/// failure, plus the status.
pub type Callback<P> = Box<dyn FnOnce(Option<P>, Status) + Send>;

/// Boxes a closure as an optional [`Callback`].
pub fn callback<P, F>(f: F) -> Option<Callback<P>>
where
    F: FnOnce(Option<P>, Status) + Send + 'static,
{
    Some(Box::new(f))
}

/// Delivers `outcome` to `callback` (if any) and then hands it back.
///
/// Failures are logged here, exactly once; callers must not log them again.
/// `ZERO_RESULTS` is an answer rather than a fault and is logged at debug.
pub fn settle<T, P>(
    operation: &str,
    outcome: Result<T, ServiceError>,
    callback: Option<Callback<P>>,
    payload: impl FnOnce(&T) -> P,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            if let Some(callback) = callback {
                callback(Some(payload(&value)), Status::Ok);
            }
            Ok(value)
        }
        Err(error) => {
            if let Some(callback) = callback {
                callback(None, error.status);
            }
            match error.status {
                Status::ZeroResults => log::debug!("{} returned no results", operation),
                _ => log::error!("{} failed: {}", operation, error),
            }
            Err(error)
        }
    }
}
