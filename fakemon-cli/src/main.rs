mod edits;
mod reports;
mod seeds;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fakemon_stats::{GeneratorConfig, Generator, StageRangeTable};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use edits::EditSpec;
use reports::{
    EditRecord, GenerationReport, write_console_report, write_json_report, write_markdown_report,
};
use seeds::{SeedInfo, fresh_seed, resolve_seed_input};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for the terminal
    Console,
    /// Machine-readable report
    Json,
    /// Markdown table
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "fakemon-cli", version)]
#[command(about = "Roll stage-chained stat lines for fakemon evolution families")]
struct Args {
    /// JSON file with configured ranges per stage (defaults to the built-in table)
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// JSON generator config (num_stages, stat_increment, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of stages in the evolution line (1-5)
    #[arg(long)]
    stages: Option<u8>,

    /// Stat granularity; every value is a multiple of this (1-20)
    #[arg(long)]
    increment: Option<u32>,

    /// Numeric seed or share code such as S3-CAVERN-1A
    #[arg(long)]
    seed: Option<String>,

    /// Manual range edit, applied in order after the first roll
    #[arg(long = "edit", value_name = "STAGE:STAT=MIN..MAX")]
    edits: Vec<EditSpec>,

    /// Re-roll a stage and every stage after it
    #[arg(long = "regenerate", value_name = "STAGE")]
    regenerate: Vec<u8>,

    /// Also roll habitat, climate, diet, size and typing
    #[arg(long)]
    profile: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let (config, seed_info) = build_config(&args)?;
    let ranges = load_ranges(args.ranges.as_deref())?;
    info!(
        "rolling {} stages at increment {} with seed {}",
        config.num_stages, config.stat_increment, seed_info.seed
    );

    let mut generator = Generator::new(&config, ranges)?;
    generator.load()?;

    let mut edits = Vec::with_capacity(args.edits.len());
    for request in &args.edits {
        let outcome = generator.edit_range(request.stage, request.stat, request.min, request.max)?;
        debug!("edit {request:?}: {outcome:?}");
        edits.push(EditRecord::new(request, &outcome));
    }
    for &stage in &args.regenerate {
        generator.regenerate_stage(stage)?;
    }
    let profile = args.profile.then(|| generator.roll_profile());

    let report = GenerationReport {
        seed: seed_info.seed,
        share_code: seed_info.code,
        num_stages: generator.engine().num_stages(),
        stat_increment: generator.engine().increment(),
        stages: GenerationReport::stages_from(generator.stats(), generator.owner()),
        edits,
        profile,
    };

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Console => write_console_report(output_target.writer(), &report)?,
        ReportFormat::Json => write_json_report(output_target.writer(), &report)?,
        ReportFormat::Markdown => write_markdown_report(output_target.writer(), &report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Layer the config file, seed selection and CLI overrides, then validate.
fn build_config(args: &Args) -> Result<(GeneratorConfig, SeedInfo)> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GeneratorConfig::from_json(&text)
                .with_context(|| format!("invalid config in {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(stages) = args.stages {
        config.num_stages = stages;
    }
    if let Some(increment) = args.increment {
        config.stat_increment = increment;
    }

    let seed_info = match (&args.seed, config.seed) {
        (Some(token), _) => resolve_seed_input(token)?,
        (None, Some(seed)) => SeedInfo::from_numeric(seed),
        (None, None) => fresh_seed(config.num_stages, clock_entropy())?,
    };
    if args.stages.is_none()
        && let Some(stages) = seed_info.source_stages
    {
        config.num_stages = stages;
    }
    config.seed = Some(seed_info.seed);
    config.validate().context("invalid generator settings")?;
    Ok((config, seed_info))
}

fn load_ranges(path: Option<&Path>) -> Result<StageRangeTable> {
    let Some(path) = path else {
        return Ok(StageRangeTable::default_table());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    StageRangeTable::from_json(&text)
        .with_context(|| format!("invalid ranges in {}", path.display()))
}

fn clock_entropy() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    #[allow(clippy::cast_possible_truncation)]
    let low = nanos as u64;
    low ^ u64::from(std::process::id()).rotate_left(32)
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
