use crate::exception::ExceptionCode;
use crate::parameters::ParameterKind;

/// Top level error type for building, packing, and parsing a Modbus transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestError {
    /// The remote device rejected the request with an exception response
    Exception(ExceptionCode),
    /// The response could not be decoded
    BadResponse(AduParseError),
    /// Logic error inside the library
    Internal(InternalError),
    /// The function code has no codec in this library
    UnsupportedFunction(u8),
    /// A function was constructed with the wrong kind of parameters
    Shape(ArgumentShapeError),
}

/// A function variant was given a parameter specialization it does not accept
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArgumentShapeError {
    /// The kind of parameters the function requires
    pub expected: ParameterKind,
    /// The kind of parameters that were supplied
    pub actual: ParameterKind,
}

/// Errors that occur while decoding a response
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AduParseError {
    /// Response is too short to be valid
    InsufficientBytes,
    /// Response contains extra trailing bytes
    TrailingBytes(usize),
    /// The echoed function code is neither the request's nor its exception form
    UnknownResponseFunction(u8, u8, u8), // actual, expected, expected error
    /// Byte count in the response disagrees with the quantity in the request
    RequestByteCountMismatch(usize, usize), // expected, actual
    /// Register payloads are made of whole 2-byte words
    OddRegisterByteCount(usize),
    /// Echoed coil value other than ON (0xFF00) or OFF (0x0000)
    UnknownCoilState(u16),
}

/// Errors that indicate a bug in the library itself
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InternalError {
    /// Attempted to write past the end of the request buffer
    InsufficientWriteSpace,
}

impl std::error::Error for RequestError {}
impl std::error::Error for ArgumentShapeError {}
impl std::error::Error for AduParseError {}
impl std::error::Error for InternalError {}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RequestError::Exception(ex) => write!(f, "Modbus exception: {ex}"),
            RequestError::BadResponse(err) => write!(f, "bad response: {err}"),
            RequestError::Internal(err) => write!(f, "internal error: {err}"),
            RequestError::UnsupportedFunction(fc) => {
                write!(f, "unsupported function code: {fc:#04X}")
            }
            RequestError::Shape(err) => err.fmt(f),
        }
    }
}

impl std::fmt::Display for ArgumentShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "argument shape mismatch: expected {} parameters but got {} parameters",
            self.expected, self.actual
        )
    }
}

impl std::fmt::Display for AduParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AduParseError::InsufficientBytes => f.write_str("response is too short to be valid"),
            AduParseError::TrailingBytes(count) => {
                write!(f, "response contains {count} extra trailing bytes")
            }
            AduParseError::UnknownResponseFunction(actual, expected, error) => write!(
                f,
                "received unknown response function code: {actual:#04X}. Expected {expected:#04X} or {error:#04X}"
            ),
            AduParseError::RequestByteCountMismatch(expected, actual) => write!(
                f,
                "byte count ({actual}) doesn't match the request, expected {expected}"
            ),
            AduParseError::OddRegisterByteCount(count) => {
                write!(f, "register byte count ({count}) is not a multiple of two")
            }
            AduParseError::UnknownCoilState(value) => {
                write!(f, "received coil state with unspecified value: {value:#06X}")
            }
        }
    }
}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InternalError::InsufficientWriteSpace => {
                f.write_str("insufficient space in the request buffer")
            }
        }
    }
}

impl From<ExceptionCode> for RequestError {
    fn from(ex: ExceptionCode) -> Self {
        RequestError::Exception(ex)
    }
}

impl From<AduParseError> for RequestError {
    fn from(err: AduParseError) -> Self {
        RequestError::BadResponse(err)
    }
}

impl From<InternalError> for RequestError {
    fn from(err: InternalError) -> Self {
        RequestError::Internal(err)
    }
}

impl From<ArgumentShapeError> for RequestError {
    fn from(err: ArgumentShapeError) -> Self {
        RequestError::Shape(err)
    }
}

impl From<scursor::ReadError> for RequestError {
    fn from(_: scursor::ReadError) -> Self {
        RequestError::BadResponse(AduParseError::InsufficientBytes)
    }
}

impl From<scursor::WriteError> for RequestError {
    fn from(_: scursor::WriteError) -> Self {
        RequestError::Internal(InternalError::InsufficientWriteSpace)
    }
}
