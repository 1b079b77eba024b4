/// How much of the traffic is decoded into the log, per layer
///
/// Each layer logs at INFO level independently, so a PDU summary can be combined with
/// a hex dump of the raw bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DecodeLevel {
    /// Function code and payload of requests and replies
    pub pdu: PduDecodeLevel,
    /// Address, CRC and raw bytes of complete RTU frames
    pub frame: FrameDecodeLevel,
    /// Bytes as they are read from and written to the transport
    pub physical: PhysDecodeLevel,
}

/// Decoding of requests and replies, from least to most verbose
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PduDecodeLevel {
    /// Nothing is logged
    #[default]
    Nothing,
    /// Function code
    FunctionCode,
    /// Function code and the start/quantity of the data
    DataHeaders,
    /// Function code, start/quantity and every value
    DataValues,
}

/// Decoding of RTU frames, from least to most verbose
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FrameDecodeLevel {
    /// Nothing is logged
    #[default]
    Nothing,
    /// Address, CRC and payload length
    Header,
    /// Header and the payload in hex
    Payload,
}

/// Logging of transport reads and writes, from least to most verbose
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PhysDecodeLevel {
    /// Nothing is logged
    #[default]
    Nothing,
    /// Number of bytes
    Length,
    /// Number of bytes and the bytes in hex
    Data,
}

impl DecodeLevel {
    /// Decode nothing at any layer
    pub fn nothing() -> Self {
        Self::default()
    }

    /// Build a decode level from the level of each layer
    pub fn new(pdu: PduDecodeLevel, frame: FrameDecodeLevel, physical: PhysDecodeLevel) -> Self {
        Self {
            pdu,
            frame,
            physical,
        }
    }

    /// Replace the PDU level
    pub fn pdu(self, pdu: PduDecodeLevel) -> Self {
        Self { pdu, ..self }
    }

    /// Replace the frame level
    pub fn frame(self, frame: FrameDecodeLevel) -> Self {
        Self { frame, ..self }
    }

    /// Replace the physical level
    pub fn physical(self, physical: PhysDecodeLevel) -> Self {
        Self { physical, ..self }
    }
}

impl From<PduDecodeLevel> for DecodeLevel {
    fn from(pdu: PduDecodeLevel) -> Self {
        Self::nothing().pdu(pdu)
    }
}

impl PduDecodeLevel {
    pub(crate) fn enabled(self) -> bool {
        self > Self::Nothing
    }

    pub(crate) fn data_headers(self) -> bool {
        self >= Self::DataHeaders
    }

    pub(crate) fn data_values(self) -> bool {
        self == Self::DataValues
    }
}

impl FrameDecodeLevel {
    pub(crate) fn enabled(self) -> bool {
        self > Self::Nothing
    }

    pub(crate) fn payload_enabled(self) -> bool {
        self == Self::Payload
    }
}

impl PhysDecodeLevel {
    pub(crate) fn enabled(self) -> bool {
        self > Self::Nothing
    }

    pub(crate) fn data_enabled(self) -> bool {
        self == Self::Data
    }
}
