use pcv_core::pointcloud::point::RecordLayout;

/// Per-axis scale and offset combining raw integer coordinates into world
/// space.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    pub scale: [f64; 3],
    pub offset: [f64; 3],
}

impl CoordinateTransform {
    pub fn apply(&self, axis: usize, raw: i32) -> f64 {
        raw as f64 * self.scale[axis] + self.offset[axis]
    }
}

/// Facts the container header supplies once, before decoding starts.
#[derive(Debug, Clone)]
pub struct HeaderFacts {
    /// Carried into every diagnostic about this stream.
    pub source_name: String,
    pub declared_count: u64,
    pub bounds_min: [f64; 3],
    pub transform: CoordinateTransform,
    pub layout: RecordLayout,
}
