use crate::automation::collaborators::{AutomationError, ConfigItem, Point};
use crate::egu::convert_to_egu;
use crate::types::{PointIdentifier, PointType};

/// Identifiers of the points the automation loop supervises
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitoredPoints {
    /// tank fuel level, analog output
    pub fuel_level: PointIdentifier,
    /// inlet valve, digital output (0 = closed)
    pub valve: PointIdentifier,
    /// drain pumps, digital outputs (1 = on)
    pub pumps: [PointIdentifier; 3],
}

impl Default for MonitoredPoints {
    fn default() -> Self {
        Self {
            fuel_level: PointIdentifier::new(PointType::AnalogOutput, 1000),
            valve: PointIdentifier::new(PointType::DigitalOutput, 2000),
            pumps: [
                PointIdentifier::new(PointType::DigitalOutput, 3000),
                PointIdentifier::new(PointType::DigitalOutput, 3001),
                PointIdentifier::new(PointType::DigitalOutput, 3002),
            ],
        }
    }
}

impl MonitoredPoints {
    /// identifiers in the order the snapshot expects them
    pub fn identifiers(&self) -> [PointIdentifier; 5] {
        [
            self.fuel_level,
            self.valve,
            self.pumps[0],
            self.pumps[1],
            self.pumps[2],
        ]
    }
}

/// Steps, in engineering units, applied to the fuel level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutomationPolicy {
    /// raise per cycle while the valve is closed
    pub fill_step: i32,
    /// drop per cycle for each running pump
    pub drain_steps: [i32; 3],
}

impl Default for AutomationPolicy {
    fn default() -> Self {
        Self {
            fill_step: 10,
            drain_steps: [1, 2, 3],
        }
    }
}

/// Points read at the start of one cycle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleSnapshot {
    /// fuel level point
    pub fuel_level: Point,
    /// valve point
    pub valve: Point,
    /// pump points
    pub pumps: [Point; 3],
}

impl CycleSnapshot {
    /// Build a snapshot from points returned in [`MonitoredPoints::identifiers`] order
    pub fn from_points(points: &[Point]) -> Result<Self, AutomationError> {
        match points {
            [fuel_level, valve, pump1, pump2, pump3] => Ok(Self {
                fuel_level: *fuel_level,
                valve: *valve,
                pumps: [*pump1, *pump2, *pump3],
            }),
            _ => Err(AutomationError::PointCountMismatch {
                expected: 5,
                actual: points.len(),
            }),
        }
    }
}

/// A write the policy wants issued
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteCommand {
    /// target point
    pub id: PointIdentifier,
    /// configuration of the target point
    pub config: ConfigItem,
    /// value in engineering units
    pub value: i32,
}

impl WriteCommand {
    fn new(target: &Point, value: i32) -> Self {
        Self {
            id: target.id,
            config: target.config,
            value,
        }
    }
}

/// Decide the writes for one cycle
///
/// The valve and each pump are checked independently against the fuel level
/// read at the start of the cycle, each check yields at most one write.
pub fn evaluate(snapshot: &CycleSnapshot, policy: &AutomationPolicy) -> Vec<WriteCommand> {
    let fuel = &snapshot.fuel_level;
    let level = convert_to_egu(fuel.config.scale_factor, fuel.config.deviation, fuel.raw_value)
        as i32;

    let mut commands = Vec::new();

    if snapshot.valve.raw_value == 0 {
        let raised = level.saturating_add(policy.fill_step);
        if f64::from(raised) < fuel.config.high_limit {
            commands.push(WriteCommand::new(fuel, raised));
        } else {
            commands.push(WriteCommand::new(&snapshot.valve, 1));
        }
    }

    for (pump, step) in snapshot.pumps.iter().zip(policy.drain_steps) {
        if pump.raw_value == 1 {
            let lowered = level.saturating_sub(step);
            if f64::from(lowered) > fuel.config.low_limit {
                commands.push(WriteCommand::new(fuel, lowered));
            } else {
                commands.push(WriteCommand::new(pump, 0));
            }
        }
    }

    commands
}
