use crate::common::function::FunctionCode;
use crate::exception::{ExceptionCode, ModbusException};

/// The task processing requests has terminated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shutdown;

/// Top level error type returned by every operation of the master
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// An I/O error occurred on the transport
    #[error("I/O error: {0}")]
    Io(std::io::ErrorKind),
    /// The device answered with an exception, or the correlated reply was malformed
    #[error("Modbus exception: {0}")]
    Exception(ModbusException),
    /// Request was rejected before it was queued
    #[error("bad request: {0}")]
    BadRequest(InvalidRequest),
    /// Timeout occurred before receiving a response from the device
    #[error("timeout occurred before receiving a response from the device")]
    ResponseTimeout,
    /// The reply carried a different function code than the request
    #[error("expected a reply to {expected} but received {received}")]
    UnexpectedResponse {
        /// function code of the request
        expected: FunctionCode,
        /// function code of the reply
        received: FunctionCode,
    },
    /// An internal error occurred while formatting a frame
    #[error("internal error: {0}")]
    Internal(InternalError),
    /// The task processing requests has been shut down
    #[error("the master task has been shut down")]
    Shutdown,
}

impl RequestError {
    /// Exception code describing this error, if there is one
    ///
    /// Timeouts map to [`ExceptionCode::NoResponse`] so callers can treat every
    /// protocol-level failure through a single code.
    pub fn exception_code(&self) -> Option<ExceptionCode> {
        match self {
            RequestError::Exception(ex) => Some(ex.code),
            RequestError::ResponseTimeout => Some(ExceptionCode::NoResponse),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RequestError {
    fn from(err: std::io::Error) -> Self {
        RequestError::Io(err.kind())
    }
}

impl From<ModbusException> for RequestError {
    fn from(err: ModbusException) -> Self {
        RequestError::Exception(err)
    }
}

impl From<InvalidRequest> for RequestError {
    fn from(err: InvalidRequest) -> Self {
        RequestError::BadRequest(err)
    }
}

impl From<InternalError> for RequestError {
    fn from(err: InternalError) -> Self {
        RequestError::Internal(err)
    }
}

impl From<Shutdown> for RequestError {
    fn from(_: Shutdown) -> Self {
        RequestError::Shutdown
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for RequestError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        RequestError::Shutdown
    }
}

/// Errors that result from a bad request parameter or master configuration
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    /// Device address is outside of 0..=255
    #[error("target address {0} is outside of the valid range 0..=255")]
    TargetOutOfRange(u16),
    /// Request contains a count of zero
    #[error("request contains a count of zero")]
    CountOfZero,
    /// Request count exceeds the maximum allowed for this function
    #[error("the request count of {0} exceeds maximum allowed count of {1} for this type")]
    CountTooBigForType(usize, u16),
    /// Start and count would overflow the u16 address space
    #[error("start == {0} and count == {1} would overflow the representation of u16")]
    AddressOverflow(u16, usize),
    /// Exception frames are replies and can't be sent to a device
    #[error("an exception frame can't be sent as a request")]
    ExceptionRequest,
    /// The master was created without a draft table
    #[error("no draft table was configured on this master")]
    NoDraft,
    /// The draft table has no entry with this key
    #[error("draft table has no entry named \"{0}\"")]
    UnknownDraft(String),
    /// Neither the draft entry nor the overrides provided a required field
    #[error("draft entry \"{0}\" is missing the field \"{1}\"")]
    MissingDraftField(String, &'static str),
    /// A draft field holds a value of the wrong kind for the function code
    #[error("draft entry \"{0}\" has an unusable value for the field \"{1}\"")]
    BadDraftField(String, &'static str),
}

/// Errors that indicate a bug or a frame that can't be represented
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// Attempted to write more bytes than allowed
    #[error("attempted to write {0} bytes with {1} bytes remaining")]
    InsufficientWriteSpace(usize, usize),
    /// Attempted to read more bytes than present
    #[error("attempted to read {0} bytes with {1} bytes remaining")]
    InsufficientBytesForRead(usize, usize),
    /// Byte count would exceed maximum size of u8
    #[error("byte count would exceed maximum size of u8: {0}")]
    BadByteCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_kind() {
        let err: RequestError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert_eq!(err, RequestError::Io(std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn timeouts_report_no_response() {
        assert_eq!(
            RequestError::ResponseTimeout.exception_code(),
            Some(ExceptionCode::NoResponse)
        );
        assert_eq!(RequestError::Shutdown.exception_code(), None);
    }
}
