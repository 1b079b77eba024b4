use crate::common::cursor::{ReadCursor, WriteCursor};
use crate::error::InternalError;

pub(crate) trait Serialize {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), InternalError>;
}

/// Parse the payload of a PDU that has already passed the length check
pub(crate) trait Parse: Sized {
    fn parse(cursor: &mut ReadCursor) -> Result<Self, InternalError>;
}
