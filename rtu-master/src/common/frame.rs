use crate::common::bits::num_bytes_for_bits;
use crate::common::function::FunctionCode;
use crate::constants::limits;
use crate::decode::PduDecodeLevel;
use crate::error::InvalidRequest;
use crate::types::*;

/// A request sent by the master, one variant per supported function code
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Request {
    /// Exception carried in a request direction frame
    Exception(ExceptionFrame),
    /// Read coils
    ReadCoils(ReadRange),
    /// Read discrete inputs
    ReadDiscreteInputs(ReadRange),
    /// Read holding registers
    ReadHoldingRegisters(ReadRange),
    /// Read input registers
    ReadInputRegisters(ReadRange),
    /// Write a single coil
    WriteSingleCoil(WriteSingle<bool>),
    /// Write a single register
    WriteSingleRegister(WriteSingle<u16>),
    /// Write a block of coils
    WriteMultipleCoils(WriteMultiple<bool>),
    /// Write a block of registers
    WriteMultipleRegisters(WriteMultiple<u16>),
}

/// A response received from a device, one variant per supported function code
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Response {
    /// Exception reported by the device or detected while decoding
    Exception(ExceptionFrame),
    /// Coil status, every bit of the returned bytes
    ReadCoils(Vec<bool>),
    /// Discrete input status, every bit of the returned bytes
    ReadDiscreteInputs(Vec<bool>),
    /// Holding register values
    ReadHoldingRegisters(Vec<u16>),
    /// Input register values
    ReadInputRegisters(Vec<u16>),
    /// Echo of a single coil write
    WriteSingleCoil(Echo<bool>),
    /// Echo of a single register write
    WriteSingleRegister(Echo<u16>),
    /// Acknowledgement of a multiple coil write
    WriteMultipleCoils(WriteAck),
    /// Acknowledgement of a multiple register write
    WriteMultipleRegisters(WriteAck),
}

/// A decoded frame and the address byte it was received with
///
/// `target` is `None` when the frame was too short to contain an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet<F> {
    /// Device address
    pub target: Option<UnitId>,
    /// Decoded frame
    pub frame: F,
}

impl<F> Packet<F> {
    pub(crate) fn new(target: Option<UnitId>, frame: F) -> Self {
        Self { target, frame }
    }
}

impl Request {
    /// Function code of this request
    pub fn function(&self) -> FunctionCode {
        match self {
            Request::Exception(_) => FunctionCode::Exception,
            Request::ReadCoils(_) => FunctionCode::ReadCoils,
            Request::ReadDiscreteInputs(_) => FunctionCode::ReadDiscreteInputs,
            Request::ReadHoldingRegisters(_) => FunctionCode::ReadHoldingRegisters,
            Request::ReadInputRegisters(_) => FunctionCode::ReadInputRegisters,
            Request::WriteSingleCoil(_) => FunctionCode::WriteSingleCoil,
            Request::WriteSingleRegister(_) => FunctionCode::WriteSingleRegister,
            Request::WriteMultipleCoils(_) => FunctionCode::WriteMultipleCoils,
            Request::WriteMultipleRegisters(_) => FunctionCode::WriteMultipleRegisters,
        }
    }

    /// Check the quantities against the limits of the function code
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        match self {
            Request::Exception(_) => Err(InvalidRequest::ExceptionRequest),
            Request::ReadCoils(x) | Request::ReadDiscreteInputs(x) => validate_read_bits(x),
            Request::ReadHoldingRegisters(x) | Request::ReadInputRegisters(x) => {
                validate_read_registers(x)
            }
            Request::WriteSingleCoil(_) | Request::WriteSingleRegister(_) => Ok(()),
            Request::WriteMultipleCoils(x) => x.validate(limits::MAX_WRITE_COILS_COUNT),
            Request::WriteMultipleRegisters(x) => x.validate(limits::MAX_WRITE_REGISTERS_COUNT),
        }
    }

    /// Length of the encoded PDU, function code included
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn pdu_len(&self) -> usize {
        match self {
            Request::Exception(_) => 2,
            Request::ReadCoils(_)
            | Request::ReadDiscreteInputs(_)
            | Request::ReadHoldingRegisters(_)
            | Request::ReadInputRegisters(_)
            | Request::WriteSingleCoil(_)
            | Request::WriteSingleRegister(_) => 5,
            Request::WriteMultipleCoils(x) => 6 + num_bytes_for_bits(x.values.len()),
            Request::WriteMultipleRegisters(x) => 6 + 2 * x.values.len(),
        }
    }
}

impl Response {
    /// Function code of this response
    pub fn function(&self) -> FunctionCode {
        match self {
            Response::Exception(_) => FunctionCode::Exception,
            Response::ReadCoils(_) => FunctionCode::ReadCoils,
            Response::ReadDiscreteInputs(_) => FunctionCode::ReadDiscreteInputs,
            Response::ReadHoldingRegisters(_) => FunctionCode::ReadHoldingRegisters,
            Response::ReadInputRegisters(_) => FunctionCode::ReadInputRegisters,
            Response::WriteSingleCoil(_) => FunctionCode::WriteSingleCoil,
            Response::WriteSingleRegister(_) => FunctionCode::WriteSingleRegister,
            Response::WriteMultipleCoils(_) => FunctionCode::WriteMultipleCoils,
            Response::WriteMultipleRegisters(_) => FunctionCode::WriteMultipleRegisters,
        }
    }

    /// Length of the encoded PDU, function code included
    pub(crate) fn pdu_len(&self) -> usize {
        match self {
            Response::Exception(_) => 2,
            Response::ReadCoils(x) | Response::ReadDiscreteInputs(x) => {
                2 + num_bytes_for_bits(x.len())
            }
            Response::ReadHoldingRegisters(x) | Response::ReadInputRegisters(x) => 2 + 2 * x.len(),
            Response::WriteSingleCoil(_)
            | Response::WriteSingleRegister(_)
            | Response::WriteMultipleCoils(_)
            | Response::WriteMultipleRegisters(_) => 5,
        }
    }
}

pub(crate) struct RequestDisplay<'a> {
    level: PduDecodeLevel,
    request: &'a Request,
}

impl<'a> RequestDisplay<'a> {
    pub(crate) fn new(level: PduDecodeLevel, request: &'a Request) -> Self {
        Self { level, request }
    }
}

impl std::fmt::Display for RequestDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.request.function())?;

        if !self.level.data_headers() {
            return Ok(());
        }

        match self.request {
            Request::Exception(x) => write!(f, " {x}"),
            Request::ReadCoils(x)
            | Request::ReadDiscreteInputs(x)
            | Request::ReadHoldingRegisters(x)
            | Request::ReadInputRegisters(x) => write!(f, " {x}"),
            Request::WriteSingleCoil(x) => write!(f, " {x}"),
            Request::WriteSingleRegister(x) => write!(f, " {x}"),
            Request::WriteMultipleCoils(x) => {
                write!(f, " start: {:#06X} qty: {}", x.start, x.values.len())?;
                if self.level.data_values() {
                    write_bits(f, x.start, &x.values)?;
                }
                Ok(())
            }
            Request::WriteMultipleRegisters(x) => {
                write!(f, " start: {:#06X} qty: {}", x.start, x.values.len())?;
                if self.level.data_values() {
                    write_registers(f, x.start, &x.values)?;
                }
                Ok(())
            }
        }
    }
}

pub(crate) struct ResponseDisplay<'a> {
    level: PduDecodeLevel,
    response: &'a Response,
}

impl<'a> ResponseDisplay<'a> {
    pub(crate) fn new(level: PduDecodeLevel, response: &'a Response) -> Self {
        Self { level, response }
    }
}

impl std::fmt::Display for ResponseDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.response.function())?;

        if !self.level.data_headers() {
            return Ok(());
        }

        match self.response {
            Response::Exception(x) => write!(f, " {x}"),
            Response::ReadCoils(x) | Response::ReadDiscreteInputs(x) => {
                write!(f, " qty: {}", x.len())?;
                if self.level.data_values() {
                    write_bits(f, 0, x)?;
                }
                Ok(())
            }
            Response::ReadHoldingRegisters(x) | Response::ReadInputRegisters(x) => {
                write!(f, " qty: {}", x.len())?;
                if self.level.data_values() {
                    write_registers(f, 0, x)?;
                }
                Ok(())
            }
            Response::WriteSingleCoil(x) => write!(f, " {x}"),
            Response::WriteSingleRegister(x) => write!(f, " {x}"),
            Response::WriteMultipleCoils(x) | Response::WriteMultipleRegisters(x) => {
                write!(f, " {x}")
            }
        }
    }
}

fn write_bits(f: &mut std::fmt::Formatter, start: u16, values: &[bool]) -> std::fmt::Result {
    for (index, value) in (start..).zip(values) {
        write!(f, "\nidx: {:#06X} value: {}", index, *value as i32)?;
    }
    Ok(())
}

fn write_registers(f: &mut std::fmt::Formatter, start: u16, values: &[u16]) -> std::fmt::Result {
    for (index, value) in (start..).zip(values) {
        write!(f, "\nidx: {index:#06X} value: {value:#06X}")?;
    }
    Ok(())
}
