use crate::constants::mbap;
use crate::error::{AduParseError, RequestError};
use crate::exception::ExceptionCode;
use crate::parameters::CommandHeader;

use scursor::{ReadCursor, WriteCursor};

/// Write the MBAP header, the function code, and two 16-bit fields
pub(crate) fn pack_two_fields(
    header: &CommandHeader,
    field_a: u16,
    field_b: u16,
) -> Result<Vec<u8>, RequestError> {
    let mut buffer = [0u8; mbap::REQUEST_SIZE];
    let mut cursor = WriteCursor::new(&mut buffer);
    cursor.write_u16_be(header.transaction_id())?;
    cursor.write_u16_be(header.protocol_id())?;
    cursor.write_u16_be(header.length())?;
    cursor.write_u8(header.unit_id())?;
    cursor.write_u8(header.function_code())?;
    cursor.write_u16_be(field_a)?;
    cursor.write_u16_be(field_b)?;
    Ok(buffer.to_vec())
}

/// Skip the MBAP header and check the echoed function code
///
/// Returns a cursor positioned on the function specific payload. An echoed
/// function code with the high bit set is turned into the exception it carries.
pub(crate) fn open_response<'a>(
    header: &CommandHeader,
    response: &'a [u8],
) -> Result<ReadCursor<'a>, RequestError> {
    let mut cursor = ReadCursor::new(response);
    // the transaction and unit ids are matched by the transport
    cursor.read_bytes(mbap::HEADER_LENGTH)?;

    let expected = header.function_code();
    let error = expected | 0x80;
    let actual = cursor.read_u8()?;

    if actual == error {
        let code = cursor.read_u8()?;
        return Err(ExceptionCode::from(code).into());
    }

    if actual != expected {
        return Err(AduParseError::UnknownResponseFunction(actual, expected, error).into());
    }

    Ok(cursor)
}

/// Check that exactly `byte_count` bytes remain before reading a counted payload
pub(crate) fn check_byte_count(cursor: &ReadCursor, byte_count: usize) -> Result<(), RequestError> {
    let remaining = cursor.remaining();
    if remaining < byte_count {
        return Err(AduParseError::InsufficientBytes.into());
    }
    if remaining > byte_count {
        return Err(AduParseError::TrailingBytes(remaining - byte_count).into());
    }
    Ok(())
}

pub(crate) fn expect_empty(cursor: &ReadCursor) -> Result<(), RequestError> {
    match cursor.remaining() {
        0 => Ok(()),
        count => Err(AduParseError::TrailingBytes(count).into()),
    }
}
