use crate::types::{PointIdentifier, PointType};

/// Per-point configuration owned by the point store
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigItem {
    /// category of the point, selects the write function
    pub point_type: PointType,
    /// multiplier of the raw value in the EGU conversion
    pub scale_factor: f64,
    /// offset added in the EGU conversion
    pub deviation: f64,
    /// lowest allowed value in engineering units
    pub low_limit: f64,
    /// highest allowed value in engineering units
    pub high_limit: f64,
}

impl ConfigItem {
    /// create a config item from its fields
    pub fn new(
        point_type: PointType,
        scale_factor: f64,
        deviation: f64,
        low_limit: f64,
        high_limit: f64,
    ) -> Self {
        Self {
            point_type,
            scale_factor,
            deviation,
            low_limit,
            high_limit,
        }
    }

    /// identity conversion over the whole raw range
    pub fn unscaled(point_type: PointType) -> Self {
        Self::new(point_type, 1.0, 0.0, 0.0, f64::from(u16::MAX))
    }
}

/// Current value of a point as held by the point store
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// key of the point
    pub id: PointIdentifier,
    /// last raw value
    pub raw_value: u16,
    /// configuration of the point
    pub config: ConfigItem,
}

/// Errors raised by the automation loop and its collaborators
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutomationError {
    /// start was called on a loop that is already running
    AlreadyStarted,
    /// start was called on a loop that was stopped, stopping is terminal
    Terminated,
    /// the point store returned a different number of points than requested
    PointCountMismatch {
        /// number of points requested
        expected: usize,
        /// number of points returned
        actual: usize,
    },
    /// the point store failed
    Storage(String),
    /// a write command could not be issued
    Processing(String),
}

impl std::error::Error for AutomationError {}

impl std::fmt::Display for AutomationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AutomationError::AlreadyStarted => f.write_str("automation is already running"),
            AutomationError::Terminated => f.write_str("automation was stopped and cannot restart"),
            AutomationError::PointCountMismatch { expected, actual } => write!(
                f,
                "requested {expected} points but the point store returned {actual}"
            ),
            AutomationError::Storage(details) => write!(f, "point store error: {details}"),
            AutomationError::Processing(details) => write!(f, "write command error: {details}"),
        }
    }
}

/// Point store read by the automation loop
pub trait Storage: Send + Sync {
    /// Current points for `ids`, in the same order as `ids`
    fn get_points(&self, ids: &[PointIdentifier]) -> Result<Vec<Point>, AutomationError>;
}

/// Issues write transactions on behalf of the automation loop
pub trait ProcessingManager: Send + Sync {
    /// Write `value`, in engineering units, to the point at `address`
    ///
    /// Converting the value to raw form, picking the function, and tracking the
    /// transaction are the implementation's concern.
    fn execute_write_command(
        &self,
        config: &ConfigItem,
        transaction_id: u16,
        unit_id: u8,
        address: u16,
        value: i32,
    ) -> Result<(), AutomationError>;
}

/// Settings the automation loop reads from the application configuration
pub trait Configuration: Send + Sync {
    /// default delay between automation cycles, in seconds
    fn delay_between_commands(&self) -> u64;

    /// unit address of the controlled device
    fn unit_address(&self) -> u8;

    /// a transaction id distinct from the previous ones
    fn next_transaction_id(&self) -> u16;
}
