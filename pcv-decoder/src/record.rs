use byteorder::{ByteOrder, LittleEndian};

use pcv_core::pointcloud::point::{
    Classification, Color, PointAttributes, PointRecord, RecordLayout,
};

use crate::header::CoordinateTransform;

/// Decodes one fixed-stride record. `buf` must be exactly one record long;
/// the layout has already been validated against the stride, so every field
/// offset read here is in range.
pub fn decode_record(
    buf: &[u8],
    layout: &RecordLayout,
    transform: &CoordinateTransform,
) -> PointRecord {
    let x = transform.apply(0, LittleEndian::read_i32(&buf[0..4]));
    let y = transform.apply(1, LittleEndian::read_i32(&buf[4..8]));
    let z = transform.apply(2, LittleEndian::read_i32(&buf[8..12]));
    let intensity = LittleEndian::read_u16(&buf[12..14]);

    let attributes = if layout.is_extended() {
        let returns = buf[14];
        PointAttributes {
            intensity,
            return_number: returns & 0x0f,
            number_of_returns: returns >> 4,
            point_source_id: LittleEndian::read_u16(&buf[20..22]),
            classification: Classification::Extended { code: buf[16] },
        }
    } else {
        let returns = buf[14];
        PointAttributes {
            intensity,
            return_number: returns & 0x07,
            number_of_returns: (returns >> 3) & 0x07,
            point_source_id: LittleEndian::read_u16(&buf[18..20]),
            classification: Classification::from_packed_legacy(buf[15]),
        }
    };

    let color = layout.rgb_offset().map(|offset| Color {
        r: LittleEndian::read_u16(&buf[offset..offset + 2]),
        g: LittleEndian::read_u16(&buf[offset + 2..offset + 4]),
        b: LittleEndian::read_u16(&buf[offset + 4..offset + 6]),
    });

    PointRecord {
        x,
        y,
        z,
        color,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_transform() -> CoordinateTransform {
        CoordinateTransform {
            scale: [1.0, 1.0, 1.0],
            offset: [0.0, 0.0, 0.0],
        }
    }

    fn write_coords(buf: &mut [u8], x: i32, y: i32, z: i32) {
        LittleEndian::write_i32(&mut buf[0..4], x);
        LittleEndian::write_i32(&mut buf[4..8], y);
        LittleEndian::write_i32(&mut buf[8..12], z);
    }

    #[test]
    fn decodes_legacy_format_zero() {
        let layout = RecordLayout::new(0, 20).unwrap();
        let mut buf = [0u8; 20];
        write_coords(&mut buf, 100, -200, 300);
        LittleEndian::write_u16(&mut buf[12..14], 1234);
        buf[14] = 2 | (3 << 3); // return 2 of 3
        buf[15] = 5 | 0x20; // class 5, synthetic
        LittleEndian::write_u16(&mut buf[18..20], 42);

        let transform = CoordinateTransform {
            scale: [0.5, 0.25, 0.125],
            offset: [1000.0, 2000.0, 0.0],
        };
        let record = decode_record(&buf, &layout, &transform);

        assert_eq!(record.x, 1050.0);
        assert_eq!(record.y, 1950.0);
        assert_eq!(record.z, 37.5);
        assert_eq!(record.attributes.intensity, 1234);
        assert_eq!(record.attributes.return_number, 2);
        assert_eq!(record.attributes.number_of_returns, 3);
        assert_eq!(record.attributes.point_source_id, 42);
        assert_eq!(
            record.attributes.classification,
            Classification::Legacy {
                code: 5,
                synthetic: true,
                key_point: false,
                withheld: false
            }
        );
        assert_eq!(record.color, None);
    }

    #[test]
    fn decodes_legacy_rgb_at_format_two_offset() {
        let layout = RecordLayout::new(2, 26).unwrap();
        let mut buf = [0u8; 26];
        write_coords(&mut buf, 1, 2, 3);
        LittleEndian::write_u16(&mut buf[20..22], 11);
        LittleEndian::write_u16(&mut buf[22..24], 22);
        LittleEndian::write_u16(&mut buf[24..26], 33);

        let record = decode_record(&buf, &layout, &identity_transform());
        assert_eq!(record.color, Some(Color { r: 11, g: 22, b: 33 }));
    }

    #[test]
    fn decodes_legacy_rgb_after_gps_time() {
        let layout = RecordLayout::new(3, 34).unwrap();
        let mut buf = [0u8; 34];
        LittleEndian::write_u16(&mut buf[28..30], 1);
        LittleEndian::write_u16(&mut buf[30..32], 2);
        LittleEndian::write_u16(&mut buf[32..34], 3);

        let record = decode_record(&buf, &layout, &identity_transform());
        assert_eq!(record.color, Some(Color { r: 1, g: 2, b: 3 }));
    }

    #[test]
    fn decodes_extended_format() {
        let layout = RecordLayout::new(6, 30).unwrap();
        let mut buf = [0u8; 30];
        write_coords(&mut buf, -1000, 0, 1000);
        LittleEndian::write_u16(&mut buf[12..14], 9);
        buf[14] = 5 | (12 << 4); // return 5 of 12
        buf[16] = 200; // full-range classification
        LittleEndian::write_u16(&mut buf[20..22], 77);

        let record = decode_record(&buf, &layout, &identity_transform());
        assert_eq!(record.x, -1000.0);
        assert_eq!(record.attributes.intensity, 9);
        assert_eq!(record.attributes.return_number, 5);
        assert_eq!(record.attributes.number_of_returns, 12);
        assert_eq!(record.attributes.point_source_id, 77);
        assert_eq!(
            record.attributes.classification,
            Classification::Extended { code: 200 }
        );
        assert_eq!(record.color, None);
    }

    #[test]
    fn decodes_extended_rgb() {
        let layout = RecordLayout::new(7, 36).unwrap();
        let mut buf = [0u8; 36];
        LittleEndian::write_u16(&mut buf[30..32], 65535);
        LittleEndian::write_u16(&mut buf[32..34], 128);
        LittleEndian::write_u16(&mut buf[34..36], 0);

        let record = decode_record(&buf, &layout, &identity_transform());
        assert_eq!(
            record.color,
            Some(Color {
                r: 65535,
                g: 128,
                b: 0
            })
        );
    }
}
