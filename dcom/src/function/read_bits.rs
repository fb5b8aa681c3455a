use crate::common::bits::num_bytes_for_bits;
use crate::common::function::FunctionCode;
use crate::common::header::{check_byte_count, open_response, pack_two_fields};
use crate::error::{AduParseError, ArgumentShapeError, RequestError};
use crate::function::{expect_read, ModbusFunction};
use crate::parameters::{CommandHeader, CommandParameters, ReadCommandParameters};
use crate::types::{PointIdentifier, PointType, Readings};

/// Read Discrete Inputs, readings are tagged [`PointType::DigitalInput`]
#[derive(Clone, Copy, Debug)]
pub struct ReadDiscreteInputsFunction {
    parameters: ReadCommandParameters,
}

/// Read Coils, readings are tagged [`PointType::DigitalOutput`]
#[derive(Clone, Copy, Debug)]
pub struct ReadCoilsFunction {
    parameters: ReadCommandParameters,
}

impl ReadDiscreteInputsFunction {
    /// Create the function from read parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: ReadCommandParameters) -> Self {
        Self { parameters }
    }
}

impl ReadCoilsFunction {
    /// Create the function from read parameters
    ///
    /// The header's function code is packed as given. Only [`crate::create_function`]
    /// checks that it selects this variant.
    pub fn new(parameters: ReadCommandParameters) -> Self {
        Self { parameters }
    }
}

impl TryFrom<CommandParameters> for ReadDiscreteInputsFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_read(parameters)?))
    }
}

impl TryFrom<CommandParameters> for ReadCoilsFunction {
    type Error = ArgumentShapeError;

    fn try_from(parameters: CommandParameters) -> Result<Self, Self::Error> {
        Ok(Self::new(expect_read(parameters)?))
    }
}

impl ModbusFunction for ReadDiscreteInputsFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::ReadDiscreteInputs
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_read(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        parse_bits(&self.parameters, response, PointType::DigitalInput)
    }
}

impl ModbusFunction for ReadCoilsFunction {
    fn function_code(&self) -> FunctionCode {
        FunctionCode::ReadCoils
    }

    fn header(&self) -> &CommandHeader {
        self.parameters.header()
    }

    fn pack_request(&self) -> Result<Vec<u8>, RequestError> {
        pack_read(&self.parameters)
    }

    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError> {
        parse_bits(&self.parameters, response, PointType::DigitalOutput)
    }
}

pub(crate) fn pack_read(parameters: &ReadCommandParameters) -> Result<Vec<u8>, RequestError> {
    pack_two_fields(
        parameters.header(),
        parameters.start_address,
        parameters.quantity,
    )
}

/// Bits are packed LSB first, bit `j` of payload byte `i` is point `start + i * 8 + j`.
///
/// Padding bits past the requested quantity are dropped.
fn parse_bits(
    parameters: &ReadCommandParameters,
    response: &[u8],
    point_type: PointType,
) -> Result<Readings, RequestError> {
    let mut cursor = open_response(parameters.header(), response)?;
    let byte_count = cursor.read_u8()? as usize;
    let expected = num_bytes_for_bits(parameters.quantity);
    if byte_count != expected {
        return Err(AduParseError::RequestByteCountMismatch(expected, byte_count).into());
    }
    check_byte_count(&cursor, byte_count)?;
    let payload = cursor.read_bytes(byte_count)?;

    let quantity = parameters.quantity as usize;
    let mut readings = Readings::with_capacity(quantity);

    for (i, byte) in payload.iter().enumerate() {
        for j in 0..8 {
            let index = i * 8 + j;
            if index >= quantity {
                break;
            }
            let address = parameters.start_address.wrapping_add(index as u16);
            readings.push(
                PointIdentifier::new(point_type, address),
                ((byte >> j) & 0x01) as u16,
            );
        }
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{ParameterKind, WriteCommandParameters};

    fn parameters(start: u16, quantity: u16) -> ReadCommandParameters {
        ReadCommandParameters::new(0x0007, 0x01, FunctionCode::ReadDiscreteInputs, start, quantity)
    }

    fn response(payload: &[u8]) -> Vec<u8> {
        let length = 3 + payload.len() as u16;
        let mut frame = vec![0x00, 0x07, 0x00, 0x00, 0x00, length as u8, 0x01, 0x02];
        frame.push(payload.len() as u8);
        frame.extend_from_slice(payload);
        frame
    }

    fn id(address: u16) -> PointIdentifier {
        PointIdentifier::new(PointType::DigitalInput, address)
    }

    #[test]
    fn packs_start_and_quantity() {
        let function = ReadDiscreteInputsFunction::new(parameters(100, 10));
        assert_eq!(
            function.pack_request().unwrap(),
            vec![0x00, 0x07, 0x00, 0x00, 0x00, 0x06, 0x01, 0x02, 0x00, 0x64, 0x00, 0x0A]
        );
    }

    #[test]
    fn drops_padding_bits_past_quantity() {
        let function = ReadDiscreteInputsFunction::new(parameters(100, 10));
        let readings = function.parse_response(&response(&[0x01, 0x00])).unwrap();

        assert_eq!(readings.len(), 10);
        assert_eq!(readings.get(id(100)), Some(1));
        for address in 101..110 {
            assert_eq!(readings.get(id(address)), Some(0));
        }
        assert_eq!(readings.get(id(110)), None);
    }

    #[test]
    fn ignores_padding_bits_that_are_set() {
        let function = ReadDiscreteInputsFunction::new(parameters(0, 3));
        let readings = function.parse_response(&response(&[0xFD])).unwrap();

        let values: Vec<(u16, u16)> = readings.iter().map(|x| (x.id.address, x.value)).collect();
        assert_eq!(values, vec![(0, 1), (1, 0), (2, 1)]);
    }

    #[test]
    fn decodes_bits_across_bytes() {
        let bits: Vec<u16> = (0..13).map(|x| (x % 3 == 0) as u16).collect();
        let mut payload = [0u8; 2];
        for (index, bit) in bits.iter().enumerate() {
            payload[index / 8] |= (*bit as u8) << (index % 8);
        }
        // padding
        payload[1] |= 0xE0;

        let function = ReadDiscreteInputsFunction::new(parameters(500, 13));
        let readings = function.parse_response(&response(&payload)).unwrap();

        let decoded: Vec<u16> = readings.iter().map(|x| x.value).collect();
        let addresses: Vec<u16> = readings.iter().map(|x| x.id.address).collect();
        assert_eq!(decoded, bits);
        assert_eq!(addresses, (500..513).collect::<Vec<u16>>());
    }

    #[test]
    fn coils_are_tagged_as_digital_outputs() {
        let parameters =
            ReadCommandParameters::new(0x0007, 0x01, FunctionCode::ReadCoils, 3000, 2);
        let function = ReadCoilsFunction::new(parameters);
        let frame = [0x00, 0x07, 0x00, 0x00, 0x00, 0x04, 0x01, 0x01, 0x01, 0x02];
        let readings = function.parse_response(&frame).unwrap();

        assert_eq!(
            readings.get(PointIdentifier::new(PointType::DigitalOutput, 3000)),
            Some(0)
        );
        assert_eq!(
            readings.get(PointIdentifier::new(PointType::DigitalOutput, 3001)),
            Some(1)
        );
    }

    #[test]
    fn fails_when_payload_is_shorter_than_byte_count() {
        let function = ReadDiscreteInputsFunction::new(parameters(0, 16));
        let mut frame = response(&[0xFF, 0xFF]);
        frame.pop();
        assert_eq!(
            function.parse_response(&frame),
            Err(AduParseError::InsufficientBytes.into())
        );
    }

    #[test]
    fn fails_when_byte_count_disagrees_with_quantity() {
        let function = ReadDiscreteInputsFunction::new(parameters(100, 10));
        assert_eq!(
            function.parse_response(&response(&[0xFF])),
            Err(AduParseError::RequestByteCountMismatch(2, 1).into())
        );
        assert_eq!(
            function.parse_response(&response(&[0xFF, 0x03, 0x00])),
            Err(AduParseError::RequestByteCountMismatch(2, 3).into())
        );
    }

    #[test]
    fn fails_on_trailing_bytes() {
        let function = ReadDiscreteInputsFunction::new(parameters(0, 8));
        let mut frame = response(&[0xFF]);
        frame.push(0x00);
        assert_eq!(
            function.parse_response(&frame),
            Err(AduParseError::TrailingBytes(1).into())
        );
    }

    #[test]
    fn refuses_write_parameters() {
        let parameters: CommandParameters =
            WriteCommandParameters::new(1, 1, FunctionCode::WriteSingleRegister, 0, 0).into();
        let expected = ArgumentShapeError {
            expected: ParameterKind::Read,
            actual: ParameterKind::Write,
        };
        assert_eq!(
            ReadDiscreteInputsFunction::try_from(parameters).err(),
            Some(expected)
        );
        assert_eq!(ReadCoilsFunction::try_from(parameters).err(), Some(expected));
    }
}
