use crate::common::cursor::{ReadCursor, WriteCursor};
use crate::common::frame::{Packet, Request, Response};
use crate::common::function::{error_function_byte, FunctionCode};
use crate::common::traits::{Parse, Serialize};
use crate::constants::function::{ERROR_FLAG, MAX_FUNCTION_CODE, UNKNOWN_ERROR_FUNCTION};
use crate::decode::FrameDecodeLevel;
use crate::error::InternalError;
use crate::exception::ExceptionCode;
use crate::types::*;

pub(crate) mod constants {
    pub(crate) const HEADER_LENGTH: usize = 1;
    pub(crate) const FUNCTION_CODE_LENGTH: usize = 1;
    pub(crate) const CRC_LENGTH: usize = 2;
    /// address, function code, byte count, 255 data bytes and the CRC
    pub(crate) const MAX_FRAME_LENGTH: usize =
        HEADER_LENGTH + FUNCTION_CODE_LENGTH + 1 + u8::MAX as usize + CRC_LENGTH;
    /// a complete exception frame
    pub(crate) const EXCEPTION_FRAME_LENGTH: usize = 5;
    /// a complete frame whose body is always 4 bytes
    pub(crate) const FIXED_FRAME_LENGTH: usize = 8;
    /// address, function code, byte count and CRC around the data of a read reply
    pub(crate) const READ_FRAME_OVERHEAD: usize = 5;
}

/// precomputes the CRC table as a constant!
const CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

/// CRC16/MODBUS (reflected polynomial 0xA001, initial value 0xFFFF) of `data`
pub fn crc16(data: &[u8]) -> u16 {
    CRC.checksum(data)
}

/// Encode a request addressed to `target` into a complete RTU frame
pub fn encode_request(target: UnitId, request: &Request) -> Result<Vec<u8>, InternalError> {
    let mut buffer = [0u8; constants::MAX_FRAME_LENGTH];
    let mut cursor = WriteCursor::new(&mut buffer);
    cursor.write_u8(target.value)?;
    match request {
        Request::Exception(x) => write_exception(&mut cursor, x)?,
        Request::ReadCoils(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::ReadDiscreteInputs(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::ReadHoldingRegisters(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::ReadInputRegisters(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::WriteSingleCoil(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::WriteSingleRegister(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::WriteMultipleCoils(x) => write_pdu(&mut cursor, request.function(), x)?,
        Request::WriteMultipleRegisters(x) => write_pdu(&mut cursor, request.function(), x)?,
    }
    finish(cursor)
}

/// Encode a response sent by `target` into a complete RTU frame
pub fn encode_response(target: UnitId, response: &Response) -> Result<Vec<u8>, InternalError> {
    let mut buffer = [0u8; constants::MAX_FRAME_LENGTH];
    let mut cursor = WriteCursor::new(&mut buffer);
    cursor.write_u8(target.value)?;
    match response {
        Response::Exception(x) => write_exception(&mut cursor, x)?,
        Response::ReadCoils(x) | Response::ReadDiscreteInputs(x) => {
            write_pdu(&mut cursor, response.function(), &x.as_slice())?
        }
        Response::ReadHoldingRegisters(x) | Response::ReadInputRegisters(x) => {
            write_pdu(&mut cursor, response.function(), &x.as_slice())?
        }
        Response::WriteSingleCoil(x) => write_pdu(&mut cursor, response.function(), x)?,
        Response::WriteSingleRegister(x) => write_pdu(&mut cursor, response.function(), x)?,
        Response::WriteMultipleCoils(x) | Response::WriteMultipleRegisters(x) => {
            write_pdu(&mut cursor, response.function(), x)?
        }
    }
    finish(cursor)
}

fn write_pdu(
    cursor: &mut WriteCursor,
    function: FunctionCode,
    body: &dyn Serialize,
) -> Result<(), InternalError> {
    cursor.write_u8(function.wire_value().unwrap_or(UNKNOWN_ERROR_FUNCTION))?;
    body.serialize(cursor)
}

fn write_exception(cursor: &mut WriteCursor, frame: &ExceptionFrame) -> Result<(), InternalError> {
    cursor.write_u8(error_function_byte(frame.code))?;
    cursor.write_u8(frame.error.to_u8())
}

fn finish(mut cursor: WriteCursor) -> Result<Vec<u8>, InternalError> {
    let crc = CRC.checksum(cursor.written());
    cursor.write_u16_le(crc)?;
    Ok(cursor.written().to_vec())
}

/// Decode a complete response frame
///
/// Never fails: frames that are too short, fail the CRC or carry an unsupported
/// function code decode into an [`ExceptionFrame`] describing the problem.
pub fn decode_response(bytes: &[u8]) -> Packet<Response> {
    let raw = match RawFrame::check(bytes, response_pdu_len) {
        Ok(raw) => raw,
        Err(failure) => return failure.map(Response::Exception),
    };

    if raw.function > ERROR_FLAG {
        return raw.packet(Response::Exception(raw.exception()));
    }

    let mut cursor = ReadCursor::new(raw.pdu);
    let result = match FunctionCode::get(raw.function) {
        Some(FunctionCode::ReadCoils) => Vec::<bool>::parse(&mut cursor).map(Response::ReadCoils),
        Some(FunctionCode::ReadDiscreteInputs) => {
            Vec::<bool>::parse(&mut cursor).map(Response::ReadDiscreteInputs)
        }
        Some(FunctionCode::ReadHoldingRegisters) => {
            Vec::<u16>::parse(&mut cursor).map(Response::ReadHoldingRegisters)
        }
        Some(FunctionCode::ReadInputRegisters) => {
            Vec::<u16>::parse(&mut cursor).map(Response::ReadInputRegisters)
        }
        Some(FunctionCode::WriteSingleCoil) => {
            Echo::<bool>::parse(&mut cursor).map(Response::WriteSingleCoil)
        }
        Some(FunctionCode::WriteSingleRegister) => {
            Echo::<u16>::parse(&mut cursor).map(Response::WriteSingleRegister)
        }
        Some(FunctionCode::WriteMultipleCoils) => {
            WriteAck::parse(&mut cursor).map(Response::WriteMultipleCoils)
        }
        Some(FunctionCode::WriteMultipleRegisters) => {
            WriteAck::parse(&mut cursor).map(Response::WriteMultipleRegisters)
        }
        Some(FunctionCode::Exception) | None => {
            return raw.packet(Response::Exception(raw.illegal_function()))
        }
    };

    match result {
        Ok(frame) => raw.packet(frame),
        Err(_) => raw.packet(Response::Exception(raw.decode_failure())),
    }
}

/// Decode a complete request frame, the way a slave would
///
/// Follows the same rules as [`decode_response`], with the request length rules:
/// write multiple requests carry `5 + byte count` bytes after the function code,
/// every other request 4.
pub fn decode_request(bytes: &[u8]) -> Packet<Request> {
    let raw = match RawFrame::check(bytes, request_pdu_len) {
        Ok(raw) => raw,
        Err(failure) => return failure.map(Request::Exception),
    };

    if raw.function > ERROR_FLAG {
        return raw.packet(Request::Exception(raw.exception()));
    }

    let mut cursor = ReadCursor::new(raw.pdu);
    let result = match FunctionCode::get(raw.function) {
        Some(FunctionCode::ReadCoils) => ReadRange::parse(&mut cursor).map(Request::ReadCoils),
        Some(FunctionCode::ReadDiscreteInputs) => {
            ReadRange::parse(&mut cursor).map(Request::ReadDiscreteInputs)
        }
        Some(FunctionCode::ReadHoldingRegisters) => {
            ReadRange::parse(&mut cursor).map(Request::ReadHoldingRegisters)
        }
        Some(FunctionCode::ReadInputRegisters) => {
            ReadRange::parse(&mut cursor).map(Request::ReadInputRegisters)
        }
        Some(FunctionCode::WriteSingleCoil) => {
            WriteSingle::<bool>::parse(&mut cursor).map(Request::WriteSingleCoil)
        }
        Some(FunctionCode::WriteSingleRegister) => {
            WriteSingle::<u16>::parse(&mut cursor).map(Request::WriteSingleRegister)
        }
        Some(FunctionCode::WriteMultipleCoils) => {
            WriteMultiple::<bool>::parse(&mut cursor).map(Request::WriteMultipleCoils)
        }
        Some(FunctionCode::WriteMultipleRegisters) => {
            WriteMultiple::<u16>::parse(&mut cursor).map(Request::WriteMultipleRegisters)
        }
        Some(FunctionCode::Exception) | None => {
            return raw.packet(Request::Exception(raw.illegal_function()))
        }
    };

    match result {
        Ok(frame) => raw.packet(frame),
        Err(_) => raw.packet(Request::Exception(raw.decode_failure())),
    }
}

/// Length of the complete response frame that starts at the head of `buffer`
///
/// `None` until enough of the header is present to tell.
pub(crate) fn response_frame_length(buffer: &[u8]) -> Option<usize> {
    let function = *buffer.get(1)?;
    if function > ERROR_FLAG {
        return Some(constants::EXCEPTION_FRAME_LENGTH);
    }
    match FunctionCode::get(function) {
        Some(x) if x.is_read() => buffer
            .get(2)
            .map(|count| constants::READ_FRAME_OVERHEAD + usize::from(*count)),
        _ => Some(constants::FIXED_FRAME_LENGTH),
    }
}

fn response_pdu_len(function: u8, pdu: &[u8]) -> Option<usize> {
    if function > ERROR_FLAG {
        return Some(1);
    }
    match FunctionCode::get(function) {
        Some(x) if x.is_read() => pdu.first().map(|count| 1 + usize::from(*count)),
        _ => Some(4),
    }
}

fn request_pdu_len(function: u8, pdu: &[u8]) -> Option<usize> {
    if function > ERROR_FLAG {
        return Some(1);
    }
    match FunctionCode::get(function) {
        Some(FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters) => {
            pdu.get(4).map(|count| 5 + usize::from(*count))
        }
        _ => Some(4),
    }
}

/// a frame whose length and CRC have been validated
struct RawFrame<'a> {
    target: UnitId,
    function: u8,
    pdu: &'a [u8],
}

impl<'a> RawFrame<'a> {
    fn check(
        bytes: &'a [u8],
        pdu_len: fn(u8, &[u8]) -> Option<usize>,
    ) -> Result<Self, Packet<ExceptionFrame>> {
        let (target, function) = match bytes {
            [target, function, ..] => (UnitId::new(*target), *function),
            _ => {
                return Err(Packet::new(
                    None,
                    ExceptionFrame::new(
                        FunctionCode::Exception.value(),
                        ExceptionCode::DecodeFailure,
                    ),
                ))
            }
        };

        let body_end = bytes.len().saturating_sub(constants::CRC_LENGTH);
        let pdu = bytes.get(2..body_end).unwrap_or(&[]);
        let reported = reported_function(function);

        if pdu_len(function, pdu) != Some(pdu.len()) {
            return Err(Packet::new(
                Some(target),
                ExceptionFrame::new(reported, ExceptionCode::DecodeFailure),
            ));
        }

        // the length rules guarantee at least one PDU byte, so the CRC is present
        let (body, crc) = bytes.split_at(body_end);
        if crc16(body).to_le_bytes() != crc {
            return Err(Packet::new(
                Some(target),
                ExceptionFrame::new(reported, ExceptionCode::InvalidCrc),
            ));
        }

        Ok(Self {
            target,
            function,
            pdu,
        })
    }

    fn packet<F>(&self, frame: F) -> Packet<F> {
        Packet::new(Some(self.target), frame)
    }

    fn exception(&self) -> ExceptionFrame {
        let code = self.function - ERROR_FLAG;
        if code > MAX_FUNCTION_CODE {
            return ExceptionFrame::new(
                FunctionCode::Exception.value(),
                ExceptionCode::IllegalFunction,
            );
        }
        match self.pdu {
            [error] => ExceptionFrame::new(i16::from(code), ExceptionCode::from(*error)),
            _ => ExceptionFrame::new(i16::from(code), ExceptionCode::DecodeFailure),
        }
    }

    fn illegal_function(&self) -> ExceptionFrame {
        ExceptionFrame::new(i16::from(self.function), ExceptionCode::IllegalFunction)
    }

    fn decode_failure(&self) -> ExceptionFrame {
        ExceptionFrame::new(i16::from(self.function), ExceptionCode::DecodeFailure)
    }
}

impl Packet<ExceptionFrame> {
    fn map<F>(self, wrap: impl FnOnce(ExceptionFrame) -> F) -> Packet<F> {
        Packet::new(self.target, wrap(self.frame))
    }
}

// exception-coded frames report -1 since the original code can't be trusted
fn reported_function(function: u8) -> i16 {
    if function > ERROR_FLAG {
        FunctionCode::Exception.value()
    } else {
        i16::from(function)
    }
}

pub(crate) struct RtuDisplay<'a> {
    level: FrameDecodeLevel,
    frame: &'a [u8],
}

impl<'a> RtuDisplay<'a> {
    pub(crate) fn new(level: FrameDecodeLevel, frame: &'a [u8]) -> Self {
        RtuDisplay { level, frame }
    }
}

impl std::fmt::Display for RtuDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (destination, payload, crc) = match self.frame {
            [destination, payload @ .., crc_lo, crc_hi] => (
                UnitId::new(*destination),
                payload,
                u16::from_le_bytes([*crc_lo, *crc_hi]),
            ),
            _ => return write!(f, "truncated frame (len = {})", self.frame.len()),
        };

        write!(
            f,
            "dest: {} crc: {:#06X} (payload len = {})",
            destination,
            crc,
            payload.len(),
        )?;
        if self.level.payload_enabled() {
            crate::common::phys::write_hex_lines(f, payload)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_ID: u8 = 0x2A;

    const READ_COILS_REQUEST: &[u8] = &[
        UNIT_ID, // unit id
        0x01,    // function code
        0x00, 0x10, // starting address
        0x00, 0x13, // qty of outputs
        0x7A, 0x19, // crc
    ];

    const READ_COILS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x01,    // function code
        0x03,    // byte count
        0xCD, 0x6B, 0x05, // output status
        0x44, 0x99, // crc
    ];

    const READ_DISCRETE_INPUTS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x02,    // function code
        0x03,    // byte count
        0xCD, 0x6B, 0x05, // input status
        0x00, 0x99, // crc
    ];

    const READ_HOLDING_REGISTERS_REQUEST: &[u8] = &[
        UNIT_ID, // unit id
        0x03,    // function code
        0x00, 0x10, // starting address
        0x00, 0x03, // qty of registers
        0x02, 0x15, // crc
    ];

    const READ_HOLDING_REGISTERS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x03,    // function code
        0x06,    // byte count
        0x12, 0x34, 0x56, 0x78, 0x23, 0x45, // register values
        0x30, 0x60, // crc
    ];

    const READ_INPUT_REGISTERS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x04,    // function code
        0x06,    // byte count
        0x12, 0x34, 0x56, 0x78, 0x23, 0x45, // register values
        0x71, 0x86, // crc
    ];

    const WRITE_SINGLE_COIL_REQUEST: &[u8] = &[
        UNIT_ID, // unit id
        0x05,    // function code
        0x00, 0x10, // output address
        0xFF, 0x00, // output value
        0x8B, 0xE4, // crc
    ];

    const WRITE_SINGLE_REGISTER_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x06,    // function code
        0x00, 0x10, // output address
        0x12, 0x34, // output value
        0x83, 0x63, // crc
    ];

    const WRITE_MULTIPLE_COILS_REQUEST: &[u8] = &[
        UNIT_ID, // unit id
        0x0F,    // function code
        0x00, 0x10, // starting address
        0x00, 0x0A, // qty of outputs
        0x02, // byte count
        0x12, 0x34, // output values
        0x00, 0x2E, // crc
    ];

    const WRITE_MULTIPLE_COILS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x0F,    // function code
        0x00, 0x10, // starting address
        0x00, 0x0A, // qty of outputs
        0xD2, 0x12, // crc
    ];

    const WRITE_MULTIPLE_REGISTERS_REQUEST: &[u8] = &[
        UNIT_ID, // unit id
        0x10,    // function code
        0x00, 0x10, // starting address
        0x00, 0x02, // qty of outputs
        0x04, // byte count
        0x12, 0x34, 0x56, 0x78, // output values
        0x07, 0x73, // crc
    ];

    const WRITE_MULTIPLE_REGISTERS_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x10,    // function code
        0x00, 0x10, // starting address
        0x00, 0x02, // qty of outputs
        0x46, 0x16, // crc
    ];

    const EXCEPTION_RESPONSE: &[u8] = &[
        UNIT_ID, // unit id
        0x83,    // function code | 0x80
        0x02,    // exception code
        0xB0, 0xF9, // crc
    ];

    fn unit() -> Option<UnitId> {
        Some(UnitId::new(UNIT_ID))
    }

    fn coils_0x12_0x34() -> Vec<bool> {
        vec![
            false, true, false, false, true, false, false, false, // 0x12
            false, false, // first two bits of 0x34
        ]
    }

    #[test]
    fn crc_matches_the_standard_check_value() {
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn encodes_read_holding_registers_request() {
        let bytes = encode_request(
            UnitId::new(1),
            &Request::ReadHoldingRegisters(ReadRange::new(5000, 1)),
        )
        .unwrap();
        assert_eq!(bytes, [0x01, 0x03, 0x13, 0x88, 0x00, 0x01, 0x00, 0xA4]);
    }

    #[test]
    fn encodes_requests() {
        let target = UnitId::new(UNIT_ID);
        assert_eq!(
            encode_request(target, &Request::ReadCoils(ReadRange::new(0x10, 0x13))).unwrap(),
            READ_COILS_REQUEST
        );
        assert_eq!(
            encode_request(
                target,
                &Request::ReadHoldingRegisters(ReadRange::new(0x10, 3))
            )
            .unwrap(),
            READ_HOLDING_REGISTERS_REQUEST
        );
        assert_eq!(
            encode_request(
                target,
                &Request::WriteSingleCoil(WriteSingle::new(0x10, true))
            )
            .unwrap(),
            WRITE_SINGLE_COIL_REQUEST
        );
        assert_eq!(
            encode_request(
                target,
                &Request::WriteMultipleCoils(WriteMultiple::new(0x10, coils_0x12_0x34()))
            )
            .unwrap(),
            // the two bits taken from 0x34 are both zero
            &[0x2A, 0x0F, 0x00, 0x10, 0x00, 0x0A, 0x02, 0x12, 0x00, 0x01, 0xF9][..]
        );
        assert_eq!(
            encode_request(
                target,
                &Request::WriteMultipleRegisters(WriteMultiple::new(0x10, vec![0x1234, 0x5678]))
            )
            .unwrap(),
            WRITE_MULTIPLE_REGISTERS_REQUEST
        );
    }

    #[test]
    fn encodes_write_single_coil_off() {
        assert_eq!(
            encode_request(
                UnitId::new(1),
                &Request::WriteSingleCoil(WriteSingle::new(0x10, false))
            )
            .unwrap(),
            [0x01, 0x05, 0x00, 0x10, 0x00, 0x00, 0xCC, 0x0F]
        );
    }

    #[test]
    fn encodes_exception_function_byte() {
        let frame = ExceptionFrame::new(3, ExceptionCode::IllegalDataAddress);
        assert_eq!(
            encode_response(UnitId::new(UNIT_ID), &Response::Exception(frame)).unwrap(),
            EXCEPTION_RESPONSE
        );
        let unknown = ExceptionFrame::new(-1, ExceptionCode::IllegalFunction);
        let bytes = encode_response(UnitId::new(1), &Response::Exception(unknown)).unwrap();
        assert_eq!(&bytes[..3], &[0x01, 0xFF, 0x01]);
    }

    #[test]
    fn decodes_responses() {
        let status = decode_response(READ_COILS_RESPONSE);
        assert_eq!(status.target, unit());
        match status.frame {
            Response::ReadCoils(bits) => {
                assert_eq!(bits.len(), 24);
                assert_eq!(&bits[..4], &[true, false, true, true]);
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        assert!(matches!(
            decode_response(READ_DISCRETE_INPUTS_RESPONSE).frame,
            Response::ReadDiscreteInputs(x) if x.len() == 24
        ));

        assert_eq!(
            decode_response(READ_HOLDING_REGISTERS_RESPONSE),
            Packet::new(
                unit(),
                Response::ReadHoldingRegisters(vec![0x1234, 0x5678, 0x2345])
            )
        );
        assert_eq!(
            decode_response(READ_INPUT_REGISTERS_RESPONSE).frame,
            Response::ReadInputRegisters(vec![0x1234, 0x5678, 0x2345])
        );
        assert_eq!(
            decode_response(WRITE_SINGLE_COIL_REQUEST).frame,
            Response::WriteSingleCoil(Echo::new(0x10, true))
        );
        assert_eq!(
            decode_response(WRITE_SINGLE_REGISTER_RESPONSE).frame,
            Response::WriteSingleRegister(Echo::new(0x10, 0x1234))
        );
        assert_eq!(
            decode_response(WRITE_MULTIPLE_COILS_RESPONSE).frame,
            Response::WriteMultipleCoils(WriteAck::new(0x10, 10))
        );
        assert_eq!(
            decode_response(WRITE_MULTIPLE_REGISTERS_RESPONSE).frame,
            Response::WriteMultipleRegisters(WriteAck::new(0x10, 2))
        );
    }

    #[test]
    fn decodes_exception_response() {
        assert_eq!(
            decode_response(EXCEPTION_RESPONSE),
            Packet::new(
                unit(),
                Response::Exception(ExceptionFrame::new(3, ExceptionCode::IllegalDataAddress))
            )
        );
    }

    #[test]
    fn encoded_responses_decode_to_the_same_frame() {
        let responses = [
            Response::ReadCoils(vec![true, false, false, true, false, false, false, true]),
            Response::ReadDiscreteInputs(
                [coils_0x12_0x34(), vec![true, false, true, true, false, false]].concat(),
            ),
            Response::ReadHoldingRegisters(vec![0x0003]),
            Response::ReadInputRegisters(vec![0xFFFF, 0x0000, 0xCAFE]),
            Response::WriteSingleCoil(Echo::new(0x10, false)),
            Response::WriteSingleRegister(Echo::new(0xFFFF, 0x1234)),
            Response::WriteMultipleCoils(WriteAck::new(0x13, 10)),
            Response::WriteMultipleRegisters(WriteAck::new(0x10, 2)),
            Response::Exception(ExceptionFrame::new(6, ExceptionCode::SlaveDeviceBusy)),
        ];
        for response in responses {
            let bytes = encode_response(UnitId::new(7), &response).unwrap();
            assert_eq!(bytes.len(), response.pdu_len() + 3);
            assert_eq!(
                decode_response(&bytes),
                Packet::new(Some(UnitId::new(7)), response)
            );
        }
    }

    #[test]
    fn encoded_requests_decode_to_the_same_frame() {
        let requests = [
            Request::ReadCoils(ReadRange::new(0x0013, 0x0025)),
            Request::ReadDiscreteInputs(ReadRange::new(0x00C4, 0x0016)),
            Request::ReadHoldingRegisters(ReadRange::new(0x1388, 0x0001)),
            Request::ReadInputRegisters(ReadRange::new(0x0008, 0x0001)),
            Request::WriteSingleCoil(WriteSingle::new(0x00AC, true)),
            Request::WriteSingleRegister(WriteSingle::new(0x0001, 0x0003)),
            Request::WriteMultipleCoils(WriteMultiple::new(0x0013, coils_0x12_0x34())),
            Request::WriteMultipleRegisters(WriteMultiple::new(0x0001, vec![0x000A, 0x0102])),
            Request::Exception(ExceptionFrame::new(4, ExceptionCode::IllegalDataValue)),
        ];
        for request in requests {
            let bytes = encode_request(UnitId::new(0x11), &request).unwrap();
            assert_eq!(bytes.len(), request.pdu_len() + 3);
            assert_eq!(
                decode_request(&bytes),
                Packet::new(Some(UnitId::new(0x11)), request)
            );
        }
    }

    #[test]
    fn short_buffers_decode_as_failures_without_target() {
        for bytes in [&[][..], &[0x01][..]] {
            assert_eq!(
                decode_response(bytes),
                Packet::new(
                    None,
                    Response::Exception(ExceptionFrame::new(-1, ExceptionCode::DecodeFailure))
                )
            );
        }
    }

    #[test]
    fn length_mismatch_keeps_the_target() {
        let packet = decode_response(&READ_HOLDING_REGISTERS_RESPONSE[..7]);
        assert_eq!(
            packet,
            Packet::new(
                unit(),
                Response::Exception(ExceptionFrame::new(3, ExceptionCode::DecodeFailure))
            )
        );
    }

    #[test]
    fn bad_crc_is_reported() {
        let mut frame = WRITE_MULTIPLE_COILS_RESPONSE.to_vec();
        frame[7] ^= 0xFF;
        assert_eq!(
            decode_response(&frame).frame,
            Response::Exception(ExceptionFrame::new(0x0F, ExceptionCode::InvalidCrc))
        );

        let mut exception = EXCEPTION_RESPONSE.to_vec();
        exception[4] ^= 0xFF;
        assert_eq!(
            decode_response(&exception).frame,
            Response::Exception(ExceptionFrame::new(-1, ExceptionCode::InvalidCrc))
        );
    }

    #[test]
    fn exception_codes_past_the_last_function_are_illegal() {
        let mut frame = vec![0x01, 0x80 + 0x2C, 0x01];
        frame.extend_from_slice(&crc16(&frame).to_le_bytes());
        assert_eq!(
            decode_response(&frame).frame,
            Response::Exception(ExceptionFrame::new(-1, ExceptionCode::IllegalFunction))
        );
    }

    #[test]
    fn unsupported_functions_are_illegal() {
        let mut frame = vec![0x01, 0x07, 0x00, 0x00, 0x00, 0x00];
        frame.extend_from_slice(&crc16(&frame).to_le_bytes());
        assert_eq!(
            decode_response(&frame),
            Packet::new(
                Some(UnitId::new(1)),
                Response::Exception(ExceptionFrame::new(7, ExceptionCode::IllegalFunction))
            )
        );
    }

    #[test]
    fn decodes_requests() {
        assert_eq!(
            decode_request(READ_COILS_REQUEST),
            Packet::new(unit(), Request::ReadCoils(ReadRange::new(0x10, 0x13)))
        );
        assert_eq!(
            decode_request(WRITE_MULTIPLE_COILS_REQUEST).frame,
            Request::WriteMultipleCoils(WriteMultiple::new(0x10, coils_0x12_0x34()))
        );
        assert_eq!(
            decode_request(WRITE_MULTIPLE_REGISTERS_REQUEST).frame,
            Request::WriteMultipleRegisters(WriteMultiple::new(0x10, vec![0x1234, 0x5678]))
        );
        assert_eq!(
            decode_request(&WRITE_MULTIPLE_REGISTERS_REQUEST[..10]).frame,
            Request::Exception(ExceptionFrame::new(0x10, ExceptionCode::DecodeFailure))
        );
    }

    #[test]
    fn frame_length_comes_from_the_header() {
        assert_eq!(response_frame_length(&[0x01]), None);
        assert_eq!(response_frame_length(&[0x01, 0x03]), None);
        assert_eq!(response_frame_length(&[0x01, 0x03, 0x02]), Some(7));
        assert_eq!(response_frame_length(&[0x01, 0x83]), Some(5));
        assert_eq!(response_frame_length(&[0x01, 0x06]), Some(8));
    }

    #[test]
    fn displays_frame_header() {
        let display = RtuDisplay::new(FrameDecodeLevel::Header, EXCEPTION_RESPONSE);
        assert_eq!(
            display.to_string(),
            "dest: 0x2A crc: 0xF9B0 (payload len = 2)"
        );
    }
}
