pub mod decode;
pub mod header;
pub mod progress;
pub mod reader;
pub mod record;

pub use decode::{DecodeError, DecodedPointCloud, RecordDecoder};
pub use header::{CoordinateTransform, HeaderFacts};
pub use progress::{NullProgress, ProgressSink};
pub use reader::{RecordSource, SliceSource};
