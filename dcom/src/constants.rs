/// values of a coil in a write single coil request
pub mod coil {
    /// u16 representation of COIL == ON when performing write single coil
    pub const ON: u16 = 0xFF00;
    /// u16 representation of COIL == OFF when performing write single coil
    pub const OFF: u16 = 0x0000;
}

pub(crate) mod mbap {
    /// Size of the MBAP header including the unit identifier
    pub(crate) const HEADER_LENGTH: usize = 7;
    /// Protocol identifier carried by every Modbus TCP frame
    pub(crate) const PROTOCOL_ID: u16 = 0;
    /// Value of the length field for requests carrying two 16-bit fields
    ///
    /// unit id (1) + function code (1) + field A (2) + field B (2)
    pub(crate) const REQUEST_LENGTH_FIELD: u16 = 6;
    /// Total size of a request carrying two 16-bit fields
    pub(crate) const REQUEST_SIZE: usize = HEADER_LENGTH + 5;
}

pub(crate) mod exceptions {
    pub(crate) const ILLEGAL_FUNCTION: u8 = 0x01;
    pub(crate) const ILLEGAL_DATA_ADDRESS: u8 = 0x02;
    pub(crate) const ILLEGAL_DATA_VALUE: u8 = 0x03;
    pub(crate) const SERVER_DEVICE_FAILURE: u8 = 0x04;
    pub(crate) const ACKNOWLEDGE: u8 = 0x05;
    pub(crate) const SERVER_DEVICE_BUSY: u8 = 0x06;
    pub(crate) const MEMORY_PARITY_ERROR: u8 = 0x08;
    pub(crate) const GATEWAY_PATH_UNAVAILABLE: u8 = 0x0A;
    pub(crate) const GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND: u8 = 0x0B;
}
