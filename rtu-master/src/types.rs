use crate::constants::limits;
use crate::error::InvalidRequest;
use crate::exception::ExceptionCode;

/// Modbus device address, just a type-safe wrapper around `u8`
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct UnitId {
    /// underlying raw value
    pub value: u8,
}

impl UnitId {
    /// Create a new UnitId
    pub fn new(value: u8) -> Self {
        Self { value }
    }
}

impl TryFrom<u16> for UnitId {
    type Error = InvalidRequest;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map(UnitId::new)
            .map_err(|_| InvalidRequest::TargetOutOfRange(value))
    }
}

impl From<u8> for UnitId {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04X}", self.value)
    }
}

/// Start and quantity used by the four read requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ReadRange {
    /// Starting address of the range
    pub start: u16,
    /// Count of elements in the range
    pub quantity: u16,
}

impl ReadRange {
    /// Create a new read range
    pub fn new(start: u16, quantity: u16) -> Self {
        Self { start, quantity }
    }

    pub(crate) fn validate(&self, max: u16) -> Result<(), InvalidRequest> {
        validate_count(self.start, usize::from(self.quantity), max)
    }
}

/// Value written to a single coil or register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WriteSingle<T> {
    /// Address of the coil or register
    pub start: u16,
    /// Value to write
    pub value: T,
}

impl<T> WriteSingle<T> {
    /// Create a new single write
    pub fn new(start: u16, value: T) -> Self {
        Self { start, value }
    }
}

/// Values written to a contiguous block of coils or registers
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WriteMultiple<T> {
    /// Address of the first value
    pub start: u16,
    /// Values to write, in address order
    pub values: Vec<T>,
}

impl<T> WriteMultiple<T> {
    /// Create a new multiple write
    pub fn new(start: u16, values: Vec<T>) -> Self {
        Self { start, values }
    }

    pub(crate) fn validate(&self, max: u16) -> Result<(), InvalidRequest> {
        validate_count(self.start, self.values.len(), max)
    }

    /// Quantity field written on the wire
    ///
    /// Only meaningful once [`Self::validate`] has passed
    pub(crate) fn quantity(&self) -> u16 {
        u16::try_from(self.values.len()).unwrap_or(u16::MAX)
    }
}

/// A device echoing back the address and value of a single write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Echo<T> {
    /// Address that was written
    pub address: u16,
    /// Value that was written
    pub value: T,
}

impl<T> Echo<T> {
    /// Create a new echo
    pub fn new(address: u16, value: T) -> Self {
        Self { address, value }
    }
}

/// A device acknowledging a multiple write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WriteAck {
    /// Address of the first value written
    pub address: u16,
    /// Number of values written
    pub quantity: u16,
}

impl WriteAck {
    /// Create a new acknowledgement
    pub fn new(address: u16, quantity: u16) -> Self {
        Self { address, quantity }
    }
}

/// Exception carried in place of a regular payload
///
/// `code` is the function code the exception relates to, or `-1` when unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ExceptionFrame {
    /// Function code the exception relates to
    pub code: i16,
    /// Exception reported or detected
    pub error: ExceptionCode,
}

impl ExceptionFrame {
    /// Create a new exception frame
    pub fn new(code: i16, error: ExceptionCode) -> Self {
        Self { code, error }
    }

    /// Human readable reason for the exception
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

pub(crate) fn coil_from_u16(value: u16) -> bool {
    value == crate::constants::coil::ON
}

pub(crate) fn coil_to_u16(value: bool) -> u16 {
    if value {
        crate::constants::coil::ON
    } else {
        crate::constants::coil::OFF
    }
}

fn validate_count(start: u16, count: usize, max: u16) -> Result<(), InvalidRequest> {
    if count == 0 {
        return Err(InvalidRequest::CountOfZero);
    }

    if count > usize::from(max) {
        return Err(InvalidRequest::CountTooBigForType(count, max));
    }

    // the last address is start + count - 1, which must fit in a u16
    if usize::from(start) + count - 1 > usize::from(u16::MAX) {
        return Err(InvalidRequest::AddressOverflow(start, count));
    }

    Ok(())
}

pub(crate) fn validate_read_bits(range: &ReadRange) -> Result<(), InvalidRequest> {
    range.validate(limits::MAX_READ_COILS_COUNT)
}

pub(crate) fn validate_read_registers(range: &ReadRange) -> Result<(), InvalidRequest> {
    range.validate(limits::MAX_READ_REGISTERS_COUNT)
}

impl std::fmt::Display for ReadRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "start: {:#06X} qty: {}", self.start, self.quantity)
    }
}

impl std::fmt::Display for WriteSingle<bool> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {}", self.start, self.value as i32)
    }
}

impl std::fmt::Display for WriteSingle<u16> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {:#06X}", self.start, self.value)
    }
}

impl std::fmt::Display for Echo<bool> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {}", self.address, self.value as i32)
    }
}

impl std::fmt::Display for Echo<u16> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {:#06X}", self.address, self.value)
    }
}

impl std::fmt::Display for WriteAck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "start: {:#06X} qty: {}", self.address, self.quantity)
    }
}

impl std::fmt::Display for ExceptionFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function: {} exception: {}", self.code, self.error)
    }
}
