/// Size of one dot-matrix cell relative to the viewport height
pub const UNIT_PER_HEIGHT: f64 = 0.02222;

/// Width kept free for the icon and margins, in cell units
pub const RESERVED_UNITS: f64 = 16.5;

/// Quiet period before a resize request is applied
pub const RESIZE_DEBOUNCE_MS: i64 = 1000;

/// Number of grid columns that fit a `width × height` viewport.
pub fn columns_for(width: f64, height: f64) -> usize {
    let unit = height * UNIT_PER_HEIGHT;
    if unit <= 0.0 || !unit.is_finite() {
        return 0;
    }
    let columns = ((width - RESERVED_UNITS * unit) / unit).floor();
    if columns.is_finite() && columns > 0.0 {
        columns as usize
    } else {
        0
    }
}
