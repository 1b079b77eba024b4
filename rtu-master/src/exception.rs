use crate::constants::exceptions;

/// Exception codes reported by a device or raised while decoding a reply
///
/// The negative codes are never transmitted on the wire. They describe failures
/// detected locally by the master: a bad checksum, a frame that could not be
/// decoded, or a device that never answered.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ExceptionCode {
    /// The CRC of a received frame did not match its contents
    InvalidCrc,
    /// A received frame was too short or its length did not match its function code
    DecodeFailure,
    /// The device did not answer before the response timeout elapsed
    NoResponse,
    /// The function code received in the query is not an allowable action for the slave
    IllegalFunction,
    /// The data address received in the query is not an allowable address for the slave
    IllegalDataAddress,
    /// A value contained in the request is not an allowable value for the slave
    IllegalDataValue,
    /// An unrecoverable error occurred while the slave was attempting to perform the
    /// requested action
    SlaveDeviceFailure,
    /// Specialized use in conjunction with programming commands
    ///
    /// The slave has accepted the request and is processing it
    Acknowledge,
    /// Specialized use in conjunction with programming commands
    ///
    /// The slave is engaged in processing a long-duration program command, try again later
    SlaveDeviceBusy,
    /// The slave cannot perform the program function received in the query
    NegativeAcknowledge,
    /// The slave attempted to read a record file, but detected a parity error in the memory
    MemoryParityError,
    /// The exception code received is not defined in the standard
    Unknown(u8),
}

impl ExceptionCode {
    /// Numeric value of the code: negative for local failures, the wire byte otherwise
    pub fn value(self) -> i16 {
        match self {
            ExceptionCode::InvalidCrc => exceptions::INVALID_CRC,
            ExceptionCode::DecodeFailure => exceptions::DECODE_FAILURE,
            ExceptionCode::NoResponse => exceptions::NO_RESPONSE,
            other => i16::from(other.to_u8()),
        }
    }

    /// True for the codes that are detected by the master rather than sent by a device
    pub fn is_local(self) -> bool {
        self.value() < 0
    }

    /// Byte written on the wire for this code
    ///
    /// Local codes have no wire representation and are written as their two's complement
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            ExceptionCode::InvalidCrc => exceptions::INVALID_CRC as u8,
            ExceptionCode::DecodeFailure => exceptions::DECODE_FAILURE as u8,
            ExceptionCode::NoResponse => exceptions::NO_RESPONSE as u8,
            ExceptionCode::IllegalFunction => exceptions::ILLEGAL_FUNCTION,
            ExceptionCode::IllegalDataAddress => exceptions::ILLEGAL_DATA_ADDRESS,
            ExceptionCode::IllegalDataValue => exceptions::ILLEGAL_DATA_VALUE,
            ExceptionCode::SlaveDeviceFailure => exceptions::SLAVE_DEVICE_FAILURE,
            ExceptionCode::Acknowledge => exceptions::ACKNOWLEDGE,
            ExceptionCode::SlaveDeviceBusy => exceptions::SLAVE_DEVICE_BUSY,
            ExceptionCode::NegativeAcknowledge => exceptions::NEGATIVE_ACKNOWLEDGE,
            ExceptionCode::MemoryParityError => exceptions::MEMORY_PARITY_ERROR,
            ExceptionCode::Unknown(value) => value,
        }
    }
}

impl From<u8> for ExceptionCode {
    fn from(value: u8) -> Self {
        match value {
            exceptions::ILLEGAL_FUNCTION => ExceptionCode::IllegalFunction,
            exceptions::ILLEGAL_DATA_ADDRESS => ExceptionCode::IllegalDataAddress,
            exceptions::ILLEGAL_DATA_VALUE => ExceptionCode::IllegalDataValue,
            exceptions::SLAVE_DEVICE_FAILURE => ExceptionCode::SlaveDeviceFailure,
            exceptions::ACKNOWLEDGE => ExceptionCode::Acknowledge,
            exceptions::SLAVE_DEVICE_BUSY => ExceptionCode::SlaveDeviceBusy,
            exceptions::NEGATIVE_ACKNOWLEDGE => ExceptionCode::NegativeAcknowledge,
            exceptions::MEMORY_PARITY_ERROR => ExceptionCode::MemoryParityError,
            _ => ExceptionCode::Unknown(value),
        }
    }
}

impl std::error::Error for ExceptionCode {}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            ExceptionCode::InvalidCrc => f.write_str("invalid CRC value"),
            ExceptionCode::DecodeFailure => f.write_str("failed to decode the received frame"),
            ExceptionCode::NoResponse => f.write_str("device did not return a response"),
            ExceptionCode::IllegalFunction => f.write_str("illegal function code"),
            ExceptionCode::IllegalDataAddress => f.write_str("illegal data address"),
            ExceptionCode::IllegalDataValue => f.write_str("illegal data value"),
            ExceptionCode::SlaveDeviceFailure => f.write_str("slave device failure"),
            ExceptionCode::Acknowledge => {
                f.write_str("request acknowledged, the device will time out while processing it")
            }
            ExceptionCode::SlaveDeviceBusy => f.write_str("slave device busy"),
            ExceptionCode::NegativeAcknowledge => {
                f.write_str("device cannot perform the requested function")
            }
            ExceptionCode::MemoryParityError => f.write_str("device detected a memory parity error"),
            ExceptionCode::Unknown(code) => write!(f, "received unknown exception code: {code}"),
        }
    }
}

/// A rejected invocation: the function code the failure relates to and its exception
///
/// `function` is the function code reported by the frame, or `-1` when it could not be
/// determined (for example a corrupted exception frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code} (function {function})")]
pub struct ModbusException {
    /// Function code the exception relates to
    pub function: i16,
    /// Exception reported by the device or detected while decoding
    pub code: ExceptionCode,
}

impl ModbusException {
    /// Construct an exception from its fields
    pub fn new(function: i16, code: ExceptionCode) -> Self {
        Self { function, code }
    }

    /// Human readable reason for the exception
    pub fn reason(&self) -> String {
        self.code.to_string()
    }
}
