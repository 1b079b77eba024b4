use std::fmt::{Display, Formatter};

use crate::constants::function::{ERROR_FLAG, UNKNOWN_ERROR_FUNCTION};

mod constants {
    pub(crate) const EXCEPTION: i16 = -1;
    pub(crate) const READ_COILS: u8 = 1;
    pub(crate) const READ_DISCRETE_INPUTS: u8 = 2;
    pub(crate) const READ_HOLDING_REGISTERS: u8 = 3;
    pub(crate) const READ_INPUT_REGISTERS: u8 = 4;
    pub(crate) const WRITE_SINGLE_COIL: u8 = 5;
    pub(crate) const WRITE_SINGLE_REGISTER: u8 = 6;
    pub(crate) const WRITE_MULTIPLE_COILS: u8 = 15;
    pub(crate) const WRITE_MULTIPLE_REGISTERS: u8 = 16;
}

/// Function codes supported by the master
///
/// `Exception` is a sentinel used for frames that carry an exception instead of a
/// regular payload. It never appears on the wire by itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FunctionCode {
    /// Exception sentinel (-1)
    Exception,
    /// Read coils (0x01)
    ReadCoils,
    /// Read discrete inputs (0x02)
    ReadDiscreteInputs,
    /// Read holding registers (0x03)
    ReadHoldingRegisters,
    /// Read input registers (0x04)
    ReadInputRegisters,
    /// Write single coil (0x05)
    WriteSingleCoil,
    /// Write single register (0x06)
    WriteSingleRegister,
    /// Write multiple coils (0x0F)
    WriteMultipleCoils,
    /// Write multiple registers (0x10)
    WriteMultipleRegisters,
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            FunctionCode::Exception => f.write_str("EXCEPTION"),
            FunctionCode::ReadCoils => write!(f, "READ COILS ({:#04X})", self.value()),
            FunctionCode::ReadDiscreteInputs => {
                write!(f, "READ DISCRETE INPUTS ({:#04X})", self.value())
            }
            FunctionCode::ReadHoldingRegisters => {
                write!(f, "READ HOLDING REGISTERS ({:#04X})", self.value())
            }
            FunctionCode::ReadInputRegisters => {
                write!(f, "READ INPUT REGISTERS ({:#04X})", self.value())
            }
            FunctionCode::WriteSingleCoil => {
                write!(f, "WRITE SINGLE COIL ({:#04X})", self.value())
            }
            FunctionCode::WriteSingleRegister => {
                write!(f, "WRITE SINGLE REGISTER ({:#04X})", self.value())
            }
            FunctionCode::WriteMultipleCoils => {
                write!(f, "WRITE MULTIPLE COILS ({:#04X})", self.value())
            }
            FunctionCode::WriteMultipleRegisters => {
                write!(f, "WRITE MULTIPLE REGISTERS ({:#04X})", self.value())
            }
        }
    }
}

impl FunctionCode {
    /// Numeric value of the code, `-1` for the exception sentinel
    pub const fn value(self) -> i16 {
        match self {
            FunctionCode::Exception => constants::EXCEPTION,
            FunctionCode::ReadCoils => constants::READ_COILS as i16,
            FunctionCode::ReadDiscreteInputs => constants::READ_DISCRETE_INPUTS as i16,
            FunctionCode::ReadHoldingRegisters => constants::READ_HOLDING_REGISTERS as i16,
            FunctionCode::ReadInputRegisters => constants::READ_INPUT_REGISTERS as i16,
            FunctionCode::WriteSingleCoil => constants::WRITE_SINGLE_COIL as i16,
            FunctionCode::WriteSingleRegister => constants::WRITE_SINGLE_REGISTER as i16,
            FunctionCode::WriteMultipleCoils => constants::WRITE_MULTIPLE_COILS as i16,
            FunctionCode::WriteMultipleRegisters => constants::WRITE_MULTIPLE_REGISTERS as i16,
        }
    }

    /// Byte written on the wire, the exception sentinel has none
    pub(crate) fn wire_value(self) -> Option<u8> {
        u8::try_from(self.value()).ok()
    }

    /// True for the four read functions whose replies carry a byte count
    pub(crate) fn is_read(self) -> bool {
        matches!(
            self,
            FunctionCode::ReadCoils
                | FunctionCode::ReadDiscreteInputs
                | FunctionCode::ReadHoldingRegisters
                | FunctionCode::ReadInputRegisters
        )
    }

    pub(crate) fn get(value: u8) -> Option<Self> {
        match value {
            constants::READ_COILS => Some(FunctionCode::ReadCoils),
            constants::READ_DISCRETE_INPUTS => Some(FunctionCode::ReadDiscreteInputs),
            constants::READ_HOLDING_REGISTERS => Some(FunctionCode::ReadHoldingRegisters),
            constants::READ_INPUT_REGISTERS => Some(FunctionCode::ReadInputRegisters),
            constants::WRITE_SINGLE_COIL => Some(FunctionCode::WriteSingleCoil),
            constants::WRITE_SINGLE_REGISTER => Some(FunctionCode::WriteSingleRegister),
            constants::WRITE_MULTIPLE_COILS => Some(FunctionCode::WriteMultipleCoils),
            constants::WRITE_MULTIPLE_REGISTERS => Some(FunctionCode::WriteMultipleRegisters),
            _ => None,
        }
    }
}

/// Function byte of an exception frame for the given original code
///
/// Codes that are a sentinel (<= 0) or that can't carry the error flag map to 0xFF.
pub(crate) fn error_function_byte(code: i16) -> u8 {
    match u8::try_from(code) {
        Ok(value) if value > 0 && value < ERROR_FLAG => value | ERROR_FLAG,
        _ => UNKNOWN_ERROR_FUNCTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        let all = [
            FunctionCode::ReadCoils,
            FunctionCode::ReadDiscreteInputs,
            FunctionCode::ReadHoldingRegisters,
            FunctionCode::ReadInputRegisters,
            FunctionCode::WriteSingleCoil,
            FunctionCode::WriteSingleRegister,
            FunctionCode::WriteMultipleCoils,
            FunctionCode::WriteMultipleRegisters,
        ];
        for code in all {
            let byte = u8::try_from(code.value()).unwrap();
            assert_eq!(FunctionCode::get(byte), Some(code));
        }
        assert_eq!(FunctionCode::Exception.value(), -1);
        assert_eq!(FunctionCode::Exception.wire_value(), None);
        assert_eq!(FunctionCode::get(0x07), None);
    }

    #[test]
    fn error_byte_sets_high_bit_or_saturates() {
        assert_eq!(error_function_byte(3), 0x83);
        assert_eq!(error_function_byte(0x2B), 0xAB);
        assert_eq!(error_function_byte(-1), 0xFF);
        assert_eq!(error_function_byte(0), 0xFF);
        assert_eq!(error_function_byte(0x90), 0xFF);
    }
}
