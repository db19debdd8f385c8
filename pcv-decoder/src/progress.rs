/// Receives load progress as an integer percentage. Reports are
/// fire-and-forget; implementations must not fail the decode.
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

/// Discards all reports.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _percent: u8) {}
}
