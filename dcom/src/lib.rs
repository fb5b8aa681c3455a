//! Modbus TCP master codec and the fuel tank automation loop built on top of it
//!
//! # Features
//! * Panic-free parsing of responses with [scursor](https://docs.rs/scursor)
//! * Protocol exceptions returned as typed errors, never panics
//! * Parameter shape checked when a function is built
//! * Cancellable automation loop on a Tokio task
//!
//! # Supported Functions
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil
//! * Write Single Register
//!
//! # Example
//! Build a read, pack it, and parse the response
//! ```
//! use dcom::*;
//!
//! let params = ReadCommandParameters::new(1, 0x01, FunctionCode::ReadDiscreteInputs, 100, 10);
//! let function = create_function(params.into()).unwrap();
//! let request = function.pack_request().unwrap();
//! assert_eq!(request.len(), 12);
//!
//! let response = [0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x01, 0x02, 0x02, 0x01, 0x00];
//! let readings = function.parse_response(&response).unwrap();
//! assert_eq!(readings.len(), 10);
//! assert_eq!(readings.get(PointIdentifier::new(PointType::DigitalInput, 100)), Some(1));
//! ```

/// automation loop, its policy and the collaborators it drives
pub mod automation;
pub mod egu;

mod common;
mod constants;
mod error;
mod exception;
mod function;
mod parameters;
mod shutdown;
mod types;

pub use crate::common::function::FunctionCode;
pub use crate::constants::coil;
pub use crate::error::*;
pub use crate::exception::ExceptionCode;
pub use crate::function::*;
pub use crate::parameters::*;
pub use crate::types::*;
