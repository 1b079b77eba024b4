use crate::common::bits::{num_bytes_for_bits, unpack_bits};
use crate::common::cursor::ReadCursor;
use crate::common::traits::Parse;
use crate::error::InternalError;
use crate::types::*;

impl Parse for ReadRange {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(ReadRange::new(cursor.read_u16_be()?, cursor.read_u16_be()?))
    }
}

impl Parse for WriteSingle<bool> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(WriteSingle::new(
            cursor.read_u16_be()?,
            coil_from_u16(cursor.read_u16_be()?),
        ))
    }
}

impl Parse for WriteSingle<u16> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(WriteSingle::new(cursor.read_u16_be()?, cursor.read_u16_be()?))
    }
}

impl Parse for Echo<bool> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(Echo::new(
            cursor.read_u16_be()?,
            coil_from_u16(cursor.read_u16_be()?),
        ))
    }
}

impl Parse for Echo<u16> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(Echo::new(cursor.read_u16_be()?, cursor.read_u16_be()?))
    }
}

impl Parse for WriteAck {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        Ok(WriteAck::new(cursor.read_u16_be()?, cursor.read_u16_be()?))
    }
}

/// every bit of every byte that follows the byte count
impl Parse for Vec<bool> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        let count = usize::from(cursor.read_u8()?);
        let bytes = cursor.read_bytes(count)?;
        Ok(unpack_bits(bytes, 8 * count))
    }
}

impl Parse for Vec<u16> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        let count = usize::from(cursor.read_u8()?);
        if count % 2 != 0 {
            return Err(InternalError::BadByteCount(count));
        }
        let mut cursor = ReadCursor::new(cursor.read_bytes(count)?);
        let mut values = Vec::with_capacity(count / 2);
        while !cursor.is_empty() {
            values.push(cursor.read_u16_be()?);
        }
        Ok(values)
    }
}

impl Parse for WriteMultiple<bool> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        let start = cursor.read_u16_be()?;
        let quantity = usize::from(cursor.read_u16_be()?);
        let count = usize::from(cursor.read_u8()?);
        if count != num_bytes_for_bits(quantity) {
            return Err(InternalError::BadByteCount(count));
        }
        let bytes = cursor.read_bytes(count)?;
        Ok(WriteMultiple::new(start, unpack_bits(bytes, quantity)))
    }
}

impl Parse for WriteMultiple<u16> {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        let start = cursor.read_u16_be()?;
        let quantity = usize::from(cursor.read_u16_be()?);
        let count = usize::from(cursor.read_u8()?);
        if count != 2 * quantity {
            return Err(InternalError::BadByteCount(count));
        }
        let mut values = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            values.push(cursor.read_u16_be()?);
        }
        Ok(WriteMultiple::new(start, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_bit_of_a_status_reply() {
        let mut cursor = ReadCursor::new(&[0x01, 0x05]);
        let status = Vec::<bool>::parse(&mut cursor).unwrap();
        assert_eq!(
            status,
            vec![true, false, true, false, false, false, false, false]
        );
    }

    #[test]
    fn rejects_odd_register_byte_counts() {
        let mut cursor = ReadCursor::new(&[0x03, 0x00, 0x01, 0x02]);
        assert_eq!(
            Vec::<u16>::parse(&mut cursor),
            Err(InternalError::BadByteCount(3))
        );
    }

    #[test]
    fn unknown_coil_state_reads_as_off() {
        let mut cursor = ReadCursor::new(&[0x00, 0x10, 0x12, 0x34]);
        assert_eq!(
            Echo::<bool>::parse(&mut cursor),
            Ok(Echo::new(0x10, false))
        );
    }

    #[test]
    fn byte_count_must_match_the_coil_quantity() {
        let mut cursor = ReadCursor::new(&[0x00, 0x10, 0x00, 0x0A, 0x01, 0x12]);
        assert_eq!(
            WriteMultiple::<bool>::parse(&mut cursor),
            Err(InternalError::BadByteCount(1))
        );
    }
}
