use crate::common::function::FunctionCode;
use crate::common::header::{check_byte_count, open_response};
use crate::error::{AduParseError, ArgumentShapeError, RequestError};
use crate::function::read_bits::pack_read;
use crate::function::{expect_read, ModbusFunction};
use crate::parameters::{CommandHeader, CommandParameters, ReadCommandParameters};
use crate::types::{PointIdentifier, PointType, Readings};

/// Read Holding Registers
///
/// Readings are tagged [`PointType::AnalogOutput`]: holding registers are the
/// analog points the master writes, and the point store keys them that way.
#[derive(Clone, Copy, Debug)]
pub struct ReadHoldingRegistersFunction {
    parameters: ReadCommandParameters,
}

/// Read Input Registers, readings are tagged [`PointType::AnalogInput`]
#[derive(Clone, Copy, Debug)]
pub struct ReadInputRegistersFunction {
    parameters: ReadCommandParameters,
}

impl ReadHoldingRegistersFunction {
    /// Create the function from read parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: ReadCommandParameters) -> Self {
        Self { parameters }
    }
}

impl ReadInputRegistersFunction {
    /// Create the function from read parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: ReadCommandParameters) -> Self {
        Self { parameters }
    }
}

impl TryFrom<CommandParameters> for ReadHoldingRegistersFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_read(parameters)?))
    }
}

impl TryFrom<CommandParameters> for ReadInputRegistersFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_read(parameters)?))
    }
}

impl ModbusFunction for ReadHoldingRegistersFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::ReadHoldingRegisters
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_read(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        parse_registers(&self.parameters, response, PointType::AnalogOutput)
    }
}

impl ModbusFunction for ReadInputRegistersFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::ReadInputRegisters
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_read(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        parse_registers(&self.parameters, response, PointType::AnalogInput)
    }
}

/// One reading per big-endian word, addresses step by one per register
fn parse_registers(
    parameters: &ReadCommandParameters,
    response: &[u8],
    point_type: PointType,
) -> Result<Readings, RequestError> {
    let mut cursor = open_response(parameters.header(), response)?;
    let byte_count = cursor.read_u8()? as usize;
    if byte_count % 2 != 0 {
        return Err(AduParseError::OddRegisterByteCount(byte_count).into());
    }
    let expected = 2 * parameters.quantity as usize;
    if byte_count != expected {
        return Err(AduParseError::RequestByteCountMismatch(expected, byte_count).into());
    }
    check_byte_count(&cursor, byte_count)?;
    let payload = cursor.read_bytes(byte_count)?;

    let mut readings = Readings::with_capacity(byte_count / 2);
    let mut address = parameters.start_address;
    for word in payload.chunks_exact(2) {
        let value = u16::from_be_bytes([word[0], word[1]]);
        readings.push(PointIdentifier::new(point_type, address), value);
        address = address.wrapping_add(1);
    }

    Ok(readings)
}
