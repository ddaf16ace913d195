use thiserror::Error;

use crate::interaction_model::Status;

/// Errors raised by data providers, event logs and configuration.
///
/// [`Error::UnsupportedFeature`] is not a failure from the point of view of a
/// reader; see [`crate::data_model::access`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("the platform does not support this feature")]
    UnsupportedFeature,
    #[error("no space left to record the item")]
    NoSpace,
    #[error("value does not fit in the destination buffer")]
    BufferTooSmall,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("platform error {0:#x}")]
    Platform(u32),
    #[error("interaction model status {0:?}")]
    Status(Status),
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Self::Status(status)
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        match error {
            Error::UnsupportedFeature => Status::UnsupportedRead,
            Error::NoSpace | Error::BufferTooSmall => Status::ResourceExhausted,
            Error::InvalidArgument => Status::ConstraintError,
            Error::Platform(_) => Status::Failure,
            Error::Status(status) => status,
        }
    }
}
