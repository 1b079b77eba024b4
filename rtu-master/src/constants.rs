pub(crate) mod coil {
    /// u16 representation of COIL == ON when performing write single coil
    pub(crate) const ON: u16 = 0xFF00;
    /// u16 representation of COIL == OFF when performing write single coil
    pub(crate) const OFF: u16 = 0x0000;
}

/// Modbus quantity limits enforced before a request is queued
pub mod limits {
    /// Maximum count allowed in a read coils/discrete inputs request
    pub const MAX_READ_COILS_COUNT: u16 = 0x07D0;
    /// Maximum count allowed in a read holding/input registers request
    pub const MAX_READ_REGISTERS_COUNT: u16 = 0x007D;
    /// Maximum count allowed in a `write multiple coils` request
    pub const MAX_WRITE_COILS_COUNT: u16 = 0x07B0;
    /// Maximum count allowed in a `write multiple registers` request
    pub const MAX_WRITE_REGISTERS_COUNT: u16 = 0x007B;
}

pub(crate) mod exceptions {
    pub(crate) const INVALID_CRC: i16 = -3;
    pub(crate) const DECODE_FAILURE: i16 = -2;
    pub(crate) const NO_RESPONSE: i16 = -1;

    pub(crate) const ILLEGAL_FUNCTION: u8 = 0x01;
    pub(crate) const ILLEGAL_DATA_ADDRESS: u8 = 0x02;
    pub(crate) const ILLEGAL_DATA_VALUE: u8 = 0x03;
    pub(crate) const SLAVE_DEVICE_FAILURE: u8 = 0x04;
    pub(crate) const ACKNOWLEDGE: u8 = 0x05;
    pub(crate) const SLAVE_DEVICE_BUSY: u8 = 0x06;
    pub(crate) const NEGATIVE_ACKNOWLEDGE: u8 = 0x07;
    pub(crate) const MEMORY_PARITY_ERROR: u8 = 0x08;
}

pub(crate) mod function {
    /// set on the function code byte of an exception response
    pub(crate) const ERROR_FLAG: u8 = 0x80;
    /// highest function code defined by the protocol
    pub(crate) const MAX_FUNCTION_CODE: u8 = 0x2B;
    /// function byte written when the original code can't be represented
    pub(crate) const UNKNOWN_ERROR_FUNCTION: u8 = 0xFF;
}
