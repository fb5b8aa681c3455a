/// Category of a process point
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum PointType {
    /// Boolean point written by the master (coil)
    DigitalOutput,
    /// Boolean point read from the field (discrete input)
    DigitalInput,
    /// 16-bit point read from the field (input register)
    AnalogInput,
    /// 16-bit point written by the master (holding register)
    AnalogOutput,
}

impl PointType {
    /// true for the single-bit categories
    pub fn is_digital(self) -> bool {
        matches!(self, PointType::DigitalInput | PointType::DigitalOutput)
    }
}

impl std::fmt::Display for PointType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PointType::DigitalOutput => f.write_str("DIGITAL_OUTPUT"),
            PointType::DigitalInput => f.write_str("DIGITAL_INPUT"),
            PointType::AnalogInput => f.write_str("ANALOG_INPUT"),
            PointType::AnalogOutput => f.write_str("ANALOG_OUTPUT"),
        }
    }
}

/// Stable key of a process point: its category and address
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PointIdentifier {
    /// category of the point
    pub point_type: PointType,
    /// address of the point
    pub address: u16,
}

impl PointIdentifier {
    /// create a new identifier
    pub const fn new(point_type: PointType, address: u16) -> Self {
        Self {
            point_type,
            address,
        }
    }
}

impl std::fmt::Display for PointIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}[{}]", self.point_type, self.address)
    }
}

/// A raw value decoded for a single point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    /// the point this value belongs to
    pub id: PointIdentifier,
    /// raw value as transmitted (0/1 for digital points)
    pub value: u16,
}

impl Reading {
    /// create a new reading
    pub const fn new(id: PointIdentifier, value: u16) -> Self {
        Self { id, value }
    }
}

/// Readings decoded from one response
///
/// Entries keep the order in which they were decoded, which is ascending address
/// order within a response. Keys are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Readings {
    values: Vec<Reading>,
}

impl Readings {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, id: PointIdentifier, value: u16) {
        debug_assert!(self.get(id).is_none());
        self.values.push(Reading::new(id, value));
    }

    /// look up the value decoded for a point
    pub fn get(&self, id: PointIdentifier) -> Option<u16> {
        self.values.iter().find(|x| x.id == id).map(|x| x.value)
    }

    /// number of decoded readings
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// true if nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// iterate over the readings in decode order
    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.values.iter()
    }
}

impl IntoIterator for Readings {
    type Item = Reading;
    type IntoIter = std::vec::IntoIter<Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Readings {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
