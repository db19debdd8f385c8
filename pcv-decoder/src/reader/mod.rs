pub mod las;

use std::io;

/// Yields fixed-stride raw point records, in stream order. The buffer length
/// is the record stride; `Ok(false)` means the stream is exhausted, which
/// includes ending on a partial record.
pub trait RecordSource {
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<bool>;
}

/// Record source over an in-memory byte buffer.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl RecordSource for SliceSource<'_> {
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let stride = buf.len();
        if self.pos + stride > self.data.len() {
            return Ok(false);
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + stride]);
        self.pos += stride;
        Ok(true)
    }
}
