use crate::pointcloud::origin::SpatialOrigin;
use crate::pointcloud::point::PointRecord;

/// Column-oriented output buffers. Every column holds one value (or one
/// triple) per stored point; all columns always share the same logical
/// length. The color column exists iff the record format declares RGB,
/// decided up front from the header rather than per point.
#[derive(Debug, Clone)]
pub struct ColumnarAttributeSet {
    /// Origin-relative positions, xyz interleaved.
    pub position: Vec<f32>,
    pub intensity: Vec<u16>,
    pub return_number: Vec<u8>,
    pub number_of_returns: Vec<u8>,
    pub point_source_id: Vec<u16>,
    /// Packed classification bytes (legacy flags folded into the high bits).
    pub classification: Vec<u8>,
    /// RGB channels interleaved, present iff the format carries color.
    pub color: Option<Vec<u16>>,
}

impl ColumnarAttributeSet {
    pub fn with_capacity(points: usize, has_rgb: bool) -> Self {
        Self {
            position: Vec::with_capacity(points * 3),
            intensity: Vec::with_capacity(points),
            return_number: Vec::with_capacity(points),
            number_of_returns: Vec::with_capacity(points),
            point_source_id: Vec::with_capacity(points),
            classification: Vec::with_capacity(points),
            color: has_rgb.then(|| Vec::with_capacity(points * 3)),
        }
    }

    /// Appends one decoded record, narrowing origin-relative coordinates to
    /// f32 and packing the classification byte at this boundary.
    pub fn push(&mut self, record: &PointRecord, origin: &SpatialOrigin) {
        self.position.push((record.x - origin.x) as f32);
        self.position.push((record.y - origin.y) as f32);
        self.position.push((record.z - origin.z) as f32);
        self.intensity.push(record.attributes.intensity);
        self.return_number.push(record.attributes.return_number);
        self.number_of_returns.push(record.attributes.number_of_returns);
        self.point_source_id.push(record.attributes.point_source_id);
        self.classification
            .push(record.attributes.classification.to_packed_byte());
        if let Some(color) = &mut self.color {
            let c = record.color.unwrap_or_default();
            color.push(c.r);
            color.push(c.g);
            color.push(c.b);
        }
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    /// Shrinks every column to `len` points. Capacity is left alone.
    pub fn truncate(&mut self, len: usize) {
        self.position.truncate(len * 3);
        self.intensity.truncate(len);
        self.return_number.truncate(len);
        self.number_of_returns.truncate(len);
        self.point_source_id.truncate(len);
        self.classification.truncate(len);
        if let Some(color) = &mut self.color {
            color.truncate(len * 3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcloud::point::{Classification, Color, PointAttributes};

    fn make_record(x: f64, color: Option<Color>) -> PointRecord {
        PointRecord {
            x,
            y: 2.0,
            z: 3.0,
            color,
            attributes: PointAttributes {
                intensity: 100,
                return_number: 1,
                number_of_returns: 2,
                point_source_id: 7,
                classification: Classification::Legacy {
                    code: 2,
                    synthetic: false,
                    key_point: false,
                    withheld: false,
                },
            },
        }
    }

    #[test]
    fn columns_share_length() {
        let origin = SpatialOrigin::from_bounds_min(0.0, 0.0, 0.0);
        let mut columns = ColumnarAttributeSet::with_capacity(4, true);
        for i in 0..3 {
            columns.push(&make_record(i as f64, Some(Color::default())), &origin);
        }
        assert_eq!(columns.len(), 3);
        assert_eq!(columns.position.len(), 9);
        assert_eq!(columns.intensity.len(), 3);
        assert_eq!(columns.classification.len(), 3);
        assert_eq!(columns.color.as_ref().unwrap().len(), 9);
    }

    #[test]
    fn no_color_column_without_rgb() {
        let origin = SpatialOrigin::from_bounds_min(0.0, 0.0, 0.0);
        let mut columns = ColumnarAttributeSet::with_capacity(2, false);
        columns.push(&make_record(0.0, None), &origin);
        assert!(columns.color.is_none());
    }

    #[test]
    fn positions_are_origin_relative() {
        let origin = SpatialOrigin::from_bounds_min(100.0, 200.0, 0.0);
        let mut columns = ColumnarAttributeSet::with_capacity(1, false);
        columns.push(&make_record(101.5, None), &origin);
        assert_eq!(columns.position[0], 1.5);
        assert_eq!(columns.position[1], -198.0);
        assert_eq!(columns.position[2], 3.0);
    }

    #[test]
    fn truncate_shrinks_all_columns() {
        let origin = SpatialOrigin::from_bounds_min(0.0, 0.0, 0.0);
        let mut columns = ColumnarAttributeSet::with_capacity(8, true);
        for i in 0..5 {
            columns.push(&make_record(i as f64, Some(Color::default())), &origin);
        }
        columns.truncate(2);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.position.len(), 6);
        assert_eq!(columns.color.as_ref().unwrap().len(), 6);
    }
}
