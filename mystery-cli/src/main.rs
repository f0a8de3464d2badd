use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mystery_core::{
    parse_overrides, run, Axis, GeneratorConfig, Limits, Preset, RunSettings,
    DEFAULT_BASE_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_WEIGHTS_PATH,
};

#[derive(Debug, Parser)]
#[command(
    name = "mystery",
    version,
    about = "Roll randomizer settings that land within a difficulty window"
)]
struct Args {
    /// Points weights file to roll settings from
    #[arg(short = 'i', long = "weights", default_value = DEFAULT_WEIGHTS_PATH)]
    weights: PathBuf,

    /// Where to write the rolled settings
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Default settings every roll starts from
    #[arg(short = 'd', long = "defaults", default_value = DEFAULT_BASE_PATH)]
    defaults: PathBuf,

    /// setting1:option,setting2:option
    #[arg(long)]
    force: Option<String>,

    /// setting1:option,setting2:option
    #[arg(long)]
    veto: Option<String>,

    /// friendly, notslow, complex, ordeal or chaos
    #[arg(long, default_value_t = Preset::Friendly)]
    preset: Preset,

    #[arg(long, alias = "min_length", allow_negative_numbers = true)]
    min_length: Option<f64>,
    #[arg(long, alias = "max_length", allow_negative_numbers = true)]
    max_length: Option<f64>,
    #[arg(long, alias = "min_execution", allow_negative_numbers = true)]
    min_execution: Option<f64>,
    #[arg(long, alias = "max_execution", allow_negative_numbers = true)]
    max_execution: Option<f64>,
    #[arg(long, alias = "min_familiarity", allow_negative_numbers = true)]
    min_familiarity: Option<f64>,
    #[arg(long, alias = "max_familiarity", allow_negative_numbers = true)]
    max_familiarity: Option<f64>,
    #[arg(long, alias = "min_variance", allow_negative_numbers = true)]
    min_variance: Option<f64>,
    #[arg(long, alias = "max_variance", allow_negative_numbers = true)]
    max_variance: Option<f64>,

    #[arg(long, alias = "min_items")]
    min_items: Option<usize>,
    #[arg(long, alias = "max_items")]
    max_items: Option<usize>,

    /// Leave out options that break multiworld seeds
    #[arg(long, default_value_t = false)]
    multi: bool,

    /// Fixed RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the web generator's YAML to this path
    #[arg(long, value_name = "PATH")]
    yaml: Option<PathBuf>,

    /// Give up after this many attempts
    #[arg(long, default_value_t = GeneratorConfig::default().max_attempts)]
    max_attempts: u32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Preset limits with any explicitly given values on top.
    fn limits(&self) -> Limits {
        let mut limits = self.preset.limits();
        let overrides = [
            (Axis::Length, self.min_length, self.max_length),
            (Axis::Execution, self.min_execution, self.max_execution),
            (Axis::Familiarity, self.min_familiarity, self.max_familiarity),
            (Axis::Variance, self.min_variance, self.max_variance),
        ];
        for (axis, min, max) in overrides {
            let range = limits.bounds.range_mut(axis);
            if let Some(min) = min {
                range.min = min;
            }
            if let Some(max) = max {
                range.max = max;
            }
        }
        if let Some(min_items) = self.min_items {
            limits.min_items = min_items;
        }
        if let Some(max_items) = self.max_items {
            limits.max_items = max_items;
        }
        limits
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let settings = RunSettings {
        weights_path: args.weights.clone(),
        defaults_path: args.defaults.clone(),
        output_path: args.output.clone(),
        yaml_path: args.yaml.clone(),
        limits: args.limits(),
        forces: args.force.as_deref().map(parse_overrides).unwrap_or_default(),
        vetoes: args.veto.as_deref().map(parse_overrides).unwrap_or_default(),
        multiworld: args.multi,
        seed: args.seed,
        config: GeneratorConfig {
            max_attempts: args.max_attempts,
            ..GeneratorConfig::default()
        },
    };

    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    println!(
        "Successfully generated mystery settings: {}",
        args.output.display()
    );
}
