use crate::common::function::FunctionCode;
use crate::common::header::{expect_empty, open_response, pack_two_fields};
use crate::constants::coil;
use crate::error::{AduParseError, ArgumentShapeError, RequestError};
use crate::function::{expect_write, ModbusFunction};
use crate::parameters::{CommandHeader, CommandParameters, WriteCommandParameters};
use crate::types::{PointIdentifier, PointType, Readings};

use scursor::ReadCursor;

/// Write Single Register, the echoed pair is tagged [`PointType::AnalogOutput`]
#[derive(Clone, Copy, Debug)]
pub struct WriteSingleRegisterFunction {
    parameters: WriteCommandParameters,
}

/// Write Single Coil, the echoed pair is tagged [`PointType::DigitalOutput`]
///
/// The request value is sent as given: 0xFF00 turns the coil on, 0x0000 turns it off.
#[derive(Clone, Copy, Debug)]
pub struct WriteSingleCoilFunction {
    parameters: WriteCommandParameters,
}

impl WriteSingleRegisterFunction {
    /// Create the function from write parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: WriteCommandParameters) -> Self {
        Self { parameters }
    }
}

impl WriteSingleCoilFunction {
    /// Create the function from write parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: WriteCommandParameters) -> Self {
        Self { parameters }
    }
}

impl TryFrom<CommandParameters> for WriteSingleRegisterFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_write(parameters)?))
    }
}

impl TryFrom<CommandParameters> for WriteSingleCoilFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_write(parameters)?))
    }
}

impl ModbusFunction for WriteSingleRegisterFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::WriteSingleRegister
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_write(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        let mut cursor = open_response(self.parameters.header(), response)?;
        let (address, value) = parse_echo(&mut cursor)?;
        let mut readings = Readings::with_capacity(1);
        readings.push(PointIdentifier::new(PointType::AnalogOutput, address), value);
        Ok(readings)
    }
}

impl ModbusFunction for WriteSingleCoilFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::WriteSingleCoil
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_write(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        let mut cursor = open_response(self.parameters.header(), response)?;
        let (address, value) = parse_echo(&mut cursor)?;
        let state = match value {
            coil::ON => 1,
            coil::OFF => 0,
            _ => return Err(AduParseError::UnknownCoilState(value).into()),
        };
        let mut readings = Readings::with_capacity(1);
        readings.push(PointIdentifier::new(PointType::DigitalOutput, address), state);
        Ok(readings)
    }
}

fn pack_write(parameters: &WriteCommandParameters) -> Result<Vec<u8>, RequestError> {
    pack_two_fields(
        parameters.header(),
        parameters.output_address,
        parameters.value,
    )
}

fn parse_echo(cursor: &mut ReadCursor) -> Result<(u16, u16), RequestError> {
    let address = cursor.read_u16_be()?;
    let value = cursor.read_u16_be()?;
    expect_empty(cursor)?;
    Ok((address, value))
}
