use serde::Serialize;

/// Vertical origins are kept on a shared datum (z = 0) unless the data sits
/// further from zero than this, at which point float32 positions would start
/// dropping precision.
pub const Z_ORIGIN_THRESHOLD: f64 = 10_000.0;

/// Offset subtracted from every stored coordinate before narrowing to f32.
/// Returned to the caller so full-precision coordinates can be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialOrigin {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpatialOrigin {
    pub fn from_bounds_min(min_x: f64, min_y: f64, min_z: f64) -> Self {
        let z = if min_z.abs() > Z_ORIGIN_THRESHOLD {
            min_z
        } else {
            0.0
        };
        Self { x: min_x, y: min_y, z }
    }
}
