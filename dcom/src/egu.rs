//! Linear conversion between raw register values and engineering units (EGU)

/// `scale_factor * raw + deviation`
pub fn convert_to_egu(scale_factor: f64, deviation: f64, raw: u16) -> f64 {
    scale_factor * f64::from(raw) + deviation
}

/// Inverse of [`convert_to_egu`], rounded and saturated into the raw range
///
/// A zero scale factor has no inverse and maps everything to 0.
pub fn convert_to_raw(scale_factor: f64, deviation: f64, egu: f64) -> u16 {
    if scale_factor == 0.0 {
        return 0;
    }
    let raw = ((egu - deviation) / scale_factor).round();
    // `as` saturates at the bounds of u16 and maps NaN to 0
    raw as u16
}
