use rand::Rng;

/// Picks one representative point out of every decimation block of
/// `factor` consecutive logical indices. The pick is randomized within the
/// block so regularly scanned input does not alias into banding patterns.
///
/// The random source is owned and injected, so callers can seed it for
/// reproducible sampling.
#[derive(Debug)]
pub struct BlockSampler<R: Rng> {
    factor: u64,
    total: u64,
    next_block: u64,
    next_store: u64,
    stored: u64,
    rng: R,
}

impl<R: Rng> BlockSampler<R> {
    pub fn new(factor: u64, total: u64, rng: R) -> Self {
        Self {
            factor,
            total,
            next_block: 1,
            next_store: 1,
            stored: 0,
            rng,
        }
    }

    /// Visits logical index `index` (1-based, strictly ascending) and
    /// reports whether this point is the one to materialize.
    pub fn accept(&mut self, index: u64) -> bool {
        if index != self.next_store {
            return false;
        }
        self.stored += 1;
        self.advance();
        true
    }

    pub fn stored(&self) -> u64 {
        self.stored
    }

    fn advance(&mut self) {
        self.next_block += self.factor;
        self.next_store = self.next_block;
        if self.factor > 1 {
            self.next_store += self.rng.random_range(0..self.factor);
            // The final block may be shorter than the factor; keep its pick
            // in range so it still yields exactly one point.
            if self.next_block <= self.total && self.next_store > self.total {
                self.next_store = self.total;
            }
        }
    }
}
