use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use las::raw;
use laz::laszip::LazVlr;
use laz::{LasZipDecompressor, LazDecompressor};

use pcv_core::pointcloud::point::RecordLayout;

use crate::decode::DecodeError;
use crate::header::{CoordinateTransform, HeaderFacts};
use crate::reader::RecordSource;

const LASZIP_USER_ID: &[u8] = b"laszip encoded";
const LASZIP_RECORD_ID: u16 = 22204;

/// A LAS or LAZ file opened for record streaming: the header facts plus a
/// source yielding raw fixed-stride records, decompressed on the fly when
/// the point data is laszip-compressed.
pub struct LasRecordStream {
    pub facts: HeaderFacts,
    pub source: Box<dyn RecordSource>,
}

impl LasRecordStream {
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let read = BufReader::new(File::open(path)?);
        Self::from_read(read, &path.display().to_string())
    }

    pub fn from_read<R: Read + Seek + Send + 'static>(
        mut read: R,
        source_name: &str,
    ) -> Result<Self, DecodeError> {
        let header = raw::Header::read_from(&mut read)?;
        let mut vlrs = Vec::with_capacity(header.number_of_variable_length_records as usize);
        for _ in 0..header.number_of_variable_length_records {
            vlrs.push(raw::Vlr::read_from(&mut read, false)?);
        }

        // Bit 7 of the format byte marks laszip-compressed point data.
        let compressed = header.point_data_record_format & 0x80 != 0;
        let layout = RecordLayout::new(
            header.point_data_record_format & 0x3f,
            header.point_data_record_length,
        )?;

        let declared_count = header
            .large_file
            .as_ref()
            .map(|large| large.number_of_point_records)
            .unwrap_or(0)
            .max(header.number_of_point_records as u64);

        let facts = HeaderFacts {
            source_name: source_name.to_string(),
            declared_count,
            bounds_min: [header.min_x, header.min_y, header.min_z],
            transform: CoordinateTransform {
                scale: [
                    header.x_scale_factor,
                    header.y_scale_factor,
                    header.z_scale_factor,
                ],
                offset: [header.x_offset, header.y_offset, header.z_offset],
            },
            layout,
        };

        read.seek(SeekFrom::Start(header.offset_to_point_data as u64))?;

        let source: Box<dyn RecordSource> = if compressed {
            let vlr = find_laszip_vlr(&vlrs)
                .ok_or_else(|| DecodeError::MissingLaszipVlr(source_name.to_string()))?;
            let laz_vlr = LazVlr::from_buffer(&vlr.data)?;
            Box::new(LazRecords {
                decompressor: LasZipDecompressor::new(read, laz_vlr)?,
            })
        } else {
            Box::new(RawRecords { read })
        };

        Ok(Self { facts, source })
    }
}

fn is_laszip_vlr(user_id: &[u8; 16], record_id: u16) -> bool {
    user_id.starts_with(LASZIP_USER_ID) && record_id == LASZIP_RECORD_ID
}

fn find_laszip_vlr(vlrs: &[raw::Vlr]) -> Option<&raw::Vlr> {
    vlrs.iter()
        .find(|vlr| is_laszip_vlr(&vlr.user_id, vlr.record_id))
}

/// Uncompressed point data, streamed straight from the container.
struct RawRecords<R: Read> {
    read: R,
}

impl<R: Read> RecordSource for RawRecords<R> {
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        match self.read.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Laszip-compressed point data, one record decompressed per call.
struct LazRecords<R: Read + Seek + Send + 'static> {
    decompressor: LasZipDecompressor<'static, R>,
}

impl<R: Read + Seek + Send + 'static> RecordSource for LazRecords<R> {
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        match LazDecompressor::decompress_one(&mut self.decompressor, buf) {
            Ok(()) => Ok(true),
            Err(laz::LasZipError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Ok(false)
            }
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }
}
