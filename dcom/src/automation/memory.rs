use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::automation::collaborators::{AutomationError, ConfigItem, Point, Storage};
use crate::types::{PointIdentifier, Readings};

/// Thread-safe in-memory point store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    points: Mutex<HashMap<PointIdentifier, Point>>,
}

impl MemoryStorage {
    /// create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// add or replace a point
    pub fn insert(&self, id: PointIdentifier, raw_value: u16, config: ConfigItem) {
        self.lock().insert(
            id,
            Point {
                id,
                raw_value,
                config,
            },
        );
    }

    /// Update the raw value of a known point, returns false if the point is unknown
    pub fn set_raw(&self, id: PointIdentifier, raw_value: u16) -> bool {
        match self.lock().get_mut(&id) {
            Some(point) => {
                point.raw_value = raw_value;
                true
            }
            None => false,
        }
    }

    /// raw value of a point
    pub fn raw_value(&self, id: PointIdentifier) -> Option<u16> {
        self.lock().get(&id).map(|x| x.raw_value)
    }

    /// Store decoded readings, returns how many matched a known point
    pub fn apply(&self, readings: &Readings) -> usize {
        let mut points = self.lock();
        let mut updated = 0;
        for reading in readings {
            if let Some(point) = points.get_mut(&reading.id) {
                point.raw_value = reading.value;
                updated += 1;
            }
        }
        updated
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PointIdentifier, Point>> {
        // a panic while holding the lock cannot leave a point half written
        self.points.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_points(&self, ids: &[PointIdentifier]) -> Result<Vec<Point>, AutomationError> {
        let points = self.lock();
        ids.iter()
            .map(|id| {
                points
                    .get(id)
                    .copied()
                    .ok_or_else(|| AutomationError::Storage(format!("unknown point {id}")))
            })
            .collect()
    }
}
