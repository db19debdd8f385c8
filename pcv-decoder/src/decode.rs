use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use pcv_core::pointcloud::columns::ColumnarAttributeSet;
use pcv_core::pointcloud::decimation::planner::DecimationPlan;
use pcv_core::pointcloud::decimation::sampler::BlockSampler;
use pcv_core::pointcloud::origin::SpatialOrigin;
use pcv_core::pointcloud::point::LayoutError;

use crate::header::HeaderFacts;
use crate::progress::ProgressSink;
use crate::reader::RecordSource;
use crate::record::decode_record;

/// One progress report per this many visited records.
pub const PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid header: {0}")]
    Header(#[from] las::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("no laszip vlr found in \"{0}\"")]
    MissingLaszipVlr(String),
    #[error("laz decompression: {0}")]
    Laz(#[from] laz::LasZipError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of one decode: columnar buffers plus the facts the caller needs to
/// interpret them. Owned entirely by the caller; the decoder keeps nothing.
#[derive(Debug)]
pub struct DecodedPointCloud {
    pub columns: ColumnarAttributeSet,
    pub origin: SpatialOrigin,
    pub plan: DecimationPlan,
    /// Declared point count, or the visited whole-record count when the
    /// stream ended early.
    pub total_points: u64,
}

impl DecodedPointCloud {
    pub fn stored(&self) -> usize {
        self.columns.len()
    }
}

/// Walks a raw record stream once, keeping at most `budget` points chosen
/// one per decimation block.
pub struct RecordDecoder {
    facts: HeaderFacts,
    budget: u64,
    rng: StdRng,
}

impl RecordDecoder {
    /// `budget` is the caller's upper bound on stored points and must be
    /// non-zero.
    pub fn new(facts: HeaderFacts, budget: u64) -> Self {
        Self {
            facts,
            budget,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Like `new`, with a fixed sampling seed for reproducible runs.
    pub fn with_seed(facts: HeaderFacts, budget: u64, seed: u64) -> Self {
        Self {
            facts,
            budget,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn decode(
        self,
        source: &mut dyn RecordSource,
        progress: &mut dyn ProgressSink,
    ) -> Result<DecodedPointCloud, DecodeError> {
        let RecordDecoder { facts, budget, rng } = self;

        let plan = DecimationPlan::new(facts.declared_count, budget);
        let origin = SpatialOrigin::from_bounds_min(
            facts.bounds_min[0],
            facts.bounds_min[1],
            facts.bounds_min[2],
        );
        let has_rgb = facts.layout.has_rgb();

        if facts.declared_count == 0 {
            info!("\"{}\" declares zero points", facts.source_name);
            return Ok(DecodedPointCloud {
                columns: ColumnarAttributeSet::with_capacity(0, has_rgb),
                origin,
                plan,
                total_points: 0,
            });
        }
        if plan.factor > 1 {
            info!(
                "decimating \"{}\" by factor of {}",
                facts.source_name, plan.factor
            );
        }

        let mut columns =
            ColumnarAttributeSet::with_capacity(plan.planned_output as usize, has_rgb);
        let mut sampler = BlockSampler::new(plan.factor, facts.declared_count, rng);
        let mut buf = vec![0u8; facts.layout.stride()];
        let mut visited: u64 = 0;

        while visited < facts.declared_count {
            if !source.read_record(&mut buf)? {
                break;
            }
            visited += 1;
            if visited % PROGRESS_INTERVAL == 0 {
                progress.report((100 * visited / facts.declared_count) as u8);
            }
            if !sampler.accept(visited) {
                continue;
            }
            let record = decode_record(&buf, &facts.layout, &facts.transform);
            columns.push(&record, &origin);
        }

        let total_points = if visited < facts.declared_count {
            warn!(
                "expected {} points in \"{}\", got {}",
                facts.declared_count, facts.source_name, visited
            );
            columns.truncate(sampler.stored() as usize);
            visited
        } else {
            facts.declared_count
        };

        Ok(DecodedPointCloud {
            columns,
            origin,
            plan,
            total_points,
        })
    }
}
