use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::LevelFilter;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use serde::Serialize;

use pcv_core::pointcloud::origin::SpatialOrigin;
use pcv_decoder::decode::{DecodeError, RecordDecoder};
use pcv_decoder::progress::ProgressSink;
use pcv_decoder::reader::las::LasRecordStream;

#[derive(Parser, Debug)]
#[command(
    name = "Point View",
    about = "A tool for loading LAS/LAZ point clouds into bounded columnar buffers",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    /// Upper bound on stored points per file.
    #[arg(short, long, default_value_t = 5_000_000)]
    budget: u64,

    /// Fixed sampling seed for reproducible decimation.
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON summary of the loaded files.
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,
}

fn expand_globs(input_patterns: Vec<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob(&pattern).expect("Failed to read glob pattern") {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => eprintln!("Error: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    paths
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressSink for BarProgress {
    fn report(&mut self, percent: u8) {
        self.bar.set_position(percent as u64);
    }
}

#[derive(Serialize)]
struct FileSummary {
    file: String,
    total_points: u64,
    stored_points: usize,
    decimation_factor: u64,
    planned_points: u64,
    origin: SpatialOrigin,
    has_color: bool,
}

fn load_file(
    path: &Path,
    budget: u64,
    seed: Option<u64>,
    bars: &MultiProgress,
) -> Result<FileSummary, DecodeError> {
    let mut stream = LasRecordStream::open(path)?;
    let facts = stream.facts.clone();
    log::info!(
        "\"{}\": format {}, stride {}, {} declared points",
        facts.source_name,
        facts.layout.format_id(),
        facts.layout.stride(),
        facts.declared_count
    );

    let decoder = match seed {
        Some(seed) => RecordDecoder::with_seed(facts, budget, seed),
        None => RecordDecoder::new(facts, budget),
    };

    let bar = bars.add(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    bar.set_message(path.display().to_string());
    let mut progress = BarProgress { bar };

    let cloud = decoder.decode(stream.source.as_mut(), &mut progress)?;
    progress.bar.finish_and_clear();

    Ok(FileSummary {
        file: path.display().to_string(),
        total_points: cloud.total_points,
        stored_points: cloud.stored(),
        decimation_factor: cloud.plan.factor,
        planned_points: cloud.plan.planned_output,
        origin: cloud.origin,
        has_color: cloud.columns.color.is_some(),
    })
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    let input_files = expand_globs(args.input);
    if input_files.is_empty() {
        log::error!("No input files found");
        return;
    }
    log::info!("input files: {:?}", input_files);
    log::info!("point budget: {}", args.budget);

    let start = std::time::Instant::now();
    let bars = MultiProgress::new();

    let results: Vec<(PathBuf, Result<FileSummary, DecodeError>)> = input_files
        .par_iter()
        .map(|path| {
            (
                path.clone(),
                load_file(path, args.budget, args.seed, &bars),
            )
        })
        .collect();

    let mut summaries = Vec::new();
    for (path, result) in results {
        match result {
            Ok(summary) => {
                log::info!(
                    "\"{}\": stored {} of {} points (factor {})",
                    summary.file,
                    summary.stored_points,
                    summary.total_points,
                    summary.decimation_factor
                );
                summaries.push(summary);
            }
            Err(e) => log::error!("Failed to load \"{}\": {}", path.display(), e),
        }
    }

    if let Some(summary_path) = args.summary {
        log::info!("write summary: {}", summary_path);
        fs::write(
            &summary_path,
            serde_json::to_string_pretty(&summaries).unwrap(),
        )
        .unwrap();
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!(
        "Loaded {} of {} files",
        summaries.len(),
        input_files.len()
    );
}
