use crate::common::function::FunctionCode;
use crate::error::{ArgumentShapeError, RequestError};
use crate::parameters::{
    CommandHeader, CommandParameters, ParameterKind, ReadCommandParameters,
    WriteCommandParameters,
};
use crate::types::Readings;

pub use read_bits::{ReadCoilsFunction, ReadDiscreteInputsFunction};
pub use read_registers::{ReadHoldingRegistersFunction, ReadInputRegistersFunction};
pub use write_single::{WriteSingleCoilFunction, WriteSingleRegisterFunction};

mod read_bits;
mod read_registers;
mod write_single;

/// A single Modbus transaction: packs its request and parses the matching response
///
/// Implementations hold no mutable state, so one value may pack and parse from
/// several tasks at once.
pub trait ModbusFunction: Send + Sync {
    /// the function this variant decodes
    fn function_code(&self) -> FunctionCode;

    /// Header of the request
    ///
    /// Functions built by [`create_function`] always carry a header whose function
    /// code equals [`ModbusFunction::function_code`].
    fn header(&self) -> &CommandHeader;

    /// serialize the complete request frame, MBAP header included
    fn pack_request(&self) -> Result<Vec<u8>, RequestError>;

    /// Decode a complete response frame, MBAP header included
    ///
    /// An exception response yields [`RequestError::Exception`] and no readings.
    fn parse_response(&self, response: &[u8]) -> Result<Readings, RequestError>;
}

/// Build the function variant selected by the function code in `parameters`
pub fn create_function(
    parameters: CommandParameters,
) -> Result<Box<dyn ModbusFunction>, RequestError> {
    let raw = parameters.header().function_code();
    let function = FunctionCode::get(raw).ok_or(RequestError::UnsupportedFunction(raw))?;

    let function: Box<dyn ModbusFunction> = match function {
        FunctionCode::ReadCoils => Box::new(ReadCoilsFunction::try_from(parameters)?),
        FunctionCode::ReadDiscreteInputs => {
            Box::new(ReadDiscreteInputsFunction::try_from(parameters)?)
        }
        FunctionCode::ReadHoldingRegisters => {
            Box::new(ReadHoldingRegistersFunction::try_from(parameters)?)
        }
        FunctionCode::ReadInputRegisters => {
            Box::new(ReadInputRegistersFunction::try_from(parameters)?)
        }
        FunctionCode::WriteSingleCoil => Box::new(WriteSingleCoilFunction::try_from(parameters)?),
        FunctionCode::WriteSingleRegister => {
            Box::new(WriteSingleRegisterFunction::try_from(parameters)?)
        }
    };

    Ok(function)
}

pub(crate) fn expect_read(
    parameters: CommandParameters,
) -> Result<ReadCommandParameters, ArgumentShapeError> {
    match parameters {
        CommandParameters::Read(x) => Ok(x),
        CommandParameters::Write(_) => Err(ArgumentShapeError {
            expected: ParameterKind::Read,
            actual: ParameterKind::Write,
        }),
    }
}

pub(crate) fn expect_write(
    parameters: CommandParameters,
) -> Result<WriteCommandParameters, ArgumentShapeError> {
    match parameters {
        CommandParameters::Write(x) => Ok(x),
        CommandParameters::Read(_) => Err(ArgumentShapeError {
            expected: ParameterKind::Write,
            actual: ParameterKind::Read,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionCode;

    fn read(function: FunctionCode) -> CommandParameters {
        ReadCommandParameters::new(1, 1, function, 0, 1).into()
    }

    fn write(function: FunctionCode) -> CommandParameters {
        WriteCommandParameters::new(1, 1, function, 0, 1).into()
    }

    #[test]
    fn factory_selects_variant_from_function_code() {
        for function in [
            FunctionCode::ReadCoils,
            FunctionCode::ReadDiscreteInputs,
            FunctionCode::ReadHoldingRegisters,
            FunctionCode::ReadInputRegisters,
        ] {
            assert_eq!(create_function(read(function)).unwrap().function_code(), function);
        }

        for function in [FunctionCode::WriteSingleCoil, FunctionCode::WriteSingleRegister] {
            assert_eq!(create_function(write(function)).unwrap().function_code(), function);
        }
    }

    #[test]
    fn factory_output_packs_its_own_function_code() {
        for parameters in [
            read(FunctionCode::ReadCoils),
            read(FunctionCode::ReadDiscreteInputs),
            read(FunctionCode::ReadHoldingRegisters),
            read(FunctionCode::ReadInputRegisters),
            write(FunctionCode::WriteSingleCoil),
            write(FunctionCode::WriteSingleRegister),
        ] {
            let function = create_function(parameters).unwrap();
            let code = function.function_code().value();
            assert_eq!(function.header().function_code(), code);
            assert_eq!(function.pack_request().unwrap()[7], code);
        }
    }

    #[test]
    fn factory_rejects_unknown_function_code() {
        let parameters = ReadCommandParameters::with_raw_function(1, 1, 0x2B, 0, 1);
        let err = create_function(parameters.into()).err().unwrap();
        assert_eq!(err, RequestError::UnsupportedFunction(0x2B));
    }

    #[test]
    fn factory_reports_shape_mismatch() {
        let err = create_function(write(FunctionCode::ReadHoldingRegisters))
            .err()
            .unwrap();
        assert_eq!(
            err,
            RequestError::Shape(ArgumentShapeError {
                expected: ParameterKind::Read,
                actual: ParameterKind::Write,
            })
        );
    }

    #[test]
    fn every_variant_reports_exceptions_the_same_way() {
        let cases = [
            (read(FunctionCode::ReadCoils), 0x81),
            (read(FunctionCode::ReadDiscreteInputs), 0x82),
            (read(FunctionCode::ReadHoldingRegisters), 0x83),
            (read(FunctionCode::ReadInputRegisters), 0x84),
            (write(FunctionCode::WriteSingleCoil), 0x85),
            (write(FunctionCode::WriteSingleRegister), 0x86),
        ];

        for (parameters, error) in cases {
            let function = create_function(parameters).unwrap();
            let response = [0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01, error, 0x04];
            assert_eq!(
                function.parse_response(&response),
                Err(RequestError::Exception(ExceptionCode::ServerDeviceFailure))
            );
        }
    }

    #[test]
    fn every_variant_packs_twelve_bytes() {
        for parameters in [
            read(FunctionCode::ReadCoils),
            read(FunctionCode::ReadDiscreteInputs),
            read(FunctionCode::ReadHoldingRegisters),
            read(FunctionCode::ReadInputRegisters),
            write(FunctionCode::WriteSingleCoil),
            write(FunctionCode::WriteSingleRegister),
        ] {
            let function = create_function(parameters).unwrap();
            assert_eq!(function.pack_request().unwrap().len(), 12);
        }
    }
}
