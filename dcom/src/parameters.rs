use crate::common::function::FunctionCode;
use crate::constants::mbap;

/// Header fields shared by every Modbus TCP request
///
/// The protocol identifier is always 0 and the length field is fixed when the
/// parameters are built, so a header always describes the payload its
/// specialization serializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandHeader {
    transaction_id: u16,
    protocol_id: u16,
    length: u16,
    unit_id: u8,
    function_code: u8,
}

impl CommandHeader {
    fn new(transaction_id: u16, unit_id: u8, function_code: u8) -> Self {
        Self {
            transaction_id,
            protocol_id: mbap::PROTOCOL_ID,
            length: mbap::REQUEST_LENGTH_FIELD,
            unit_id,
            function_code,
        }
    }

    /// transaction identifier echoed by the device
    pub fn transaction_id(&self) -> u16 {
        self.transaction_id
    }

    /// protocol identifier, always 0 for Modbus
    pub fn protocol_id(&self) -> u16 {
        self.protocol_id
    }

    /// number of bytes that follow the length field
    pub fn length(&self) -> u16 {
        self.length
    }

    /// addressed unit
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// raw function code of the request
    pub fn function_code(&self) -> u8 {
        self.function_code
    }
}

/// Parameters of a request that reads a contiguous block of points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadCommandParameters {
    header: CommandHeader,
    /// first address to read
    pub start_address: u16,
    /// number of discrete inputs, coils, or registers to read
    pub quantity: u16,
}

impl ReadCommandParameters {
    /// Build read parameters
    ///
    /// No range checking is done here, keeping `start_address + quantity` inside
    /// the address space and `quantity` inside the frame limit is up to the caller.
    pub fn new(
        transaction_id: u16,
        unit_id: u8,
        function_code: FunctionCode,
        start_address: u16,
        quantity: u16,
    ) -> Self {
        Self::with_raw_function(
            transaction_id,
            unit_id,
            function_code.value(),
            start_address,
            quantity,
        )
    }

    /// Build read parameters from a raw function code
    pub fn with_raw_function(
        transaction_id: u16,
        unit_id: u8,
        function_code: u8,
        start_address: u16,
        quantity: u16,
    ) -> Self {
        Self {
            header: CommandHeader::new(transaction_id, unit_id, function_code),
            start_address,
            quantity,
        }
    }

    /// header fields
    pub fn header(&self) -> &CommandHeader {
        &self.header
    }
}

/// Parameters of a request that writes a single point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteCommandParameters {
    header: CommandHeader,
    /// address being written
    pub output_address: u16,
    /// raw value being written
    pub value: u16,
}

impl WriteCommandParameters {
    /// Build write parameters
    pub fn new(
        transaction_id: u16,
        unit_id: u8,
        function_code: FunctionCode,
        output_address: u16,
        value: u16,
    ) -> Self {
        Self::with_raw_function(
            transaction_id,
            unit_id,
            function_code.value(),
            output_address,
            value,
        )
    }

    /// Build write parameters from a raw function code
    pub fn with_raw_function(
        transaction_id: u16,
        unit_id: u8,
        function_code: u8,
        output_address: u16,
        value: u16,
    ) -> Self {
        Self {
            header: CommandHeader::new(transaction_id, unit_id, function_code),
            output_address,
            value,
        }
    }

    /// header fields
    pub fn header(&self) -> &CommandHeader {
        &self.header
    }
}

/// Parameters of one Modbus transaction, either a read or a write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandParameters {
    /// block read
    Read(ReadCommandParameters),
    /// single write
    Write(WriteCommandParameters),
}

/// Shape of a [`CommandParameters`] value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    /// [`ReadCommandParameters`]
    Read,
    /// [`WriteCommandParameters`]
    Write,
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParameterKind::Read => f.write_str("read"),
            ParameterKind::Write => f.write_str("write"),
        }
    }
}

impl CommandParameters {
    /// header fields of either specialization
    pub fn header(&self) -> &CommandHeader {
        match self {
            CommandParameters::Read(x) => x.header(),
            CommandParameters::Write(x) => x.header(),
        }
    }

    /// which specialization this is
    pub fn kind(&self) -> ParameterKind {
        match self {
            CommandParameters::Read(_) => ParameterKind::Read,
            CommandParameters::Write(_) => ParameterKind::Write,
        }
    }
}

impl From<ReadCommandParameters> for CommandParameters {
    fn from(value: ReadCommandParameters) -> Self {
        CommandParameters::Read(value)
    }
}

impl From<WriteCommandParameters> for CommandParameters {
    fn from(value: WriteCommandParameters) -> Self {
        CommandParameters::Write(value)
    }
}
