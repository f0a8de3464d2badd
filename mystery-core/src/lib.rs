use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod convert;
pub mod engine;
pub mod generator;
pub mod hunt;
pub mod inventory;
pub mod rules;
pub mod score;
pub mod settings;
pub mod weights;

pub use config::{GeneratorConfig, Limits, Preset};
pub use generator::{Generated, Generator};
pub use score::{Axis, AxisRange, Bounds, Score};
pub use settings::{SettingValue, SettingsDocument};
pub use weights::{parse_overrides, WeightTable};

pub const DEFAULT_WEIGHTS_PATH: &str = "MMMM_weights.json";
pub const DEFAULT_BASE_PATH: &str = "MMMM_base.json";
pub const DEFAULT_OUTPUT_PATH: &str = "MMMM_mystery.json";

#[derive(Debug, Error)]
pub enum MysteryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid value '{value}' for {setting}")]
    InvalidValue { setting: String, value: String },
    #[error("No combination found in time ({attempts} attempts)")]
    Exhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, MysteryError>;

/// Everything a single generation run needs.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub weights_path: PathBuf,
    pub defaults_path: PathBuf,
    pub output_path: PathBuf,
    /// Also write the web generator's YAML here.
    pub yaml_path: Option<PathBuf>,
    pub limits: Limits,
    pub forces: Vec<(String, String)>,
    pub vetoes: Vec<(String, String)>,
    pub multiworld: bool,
    /// Fixed seed for reproducible output; entropy when absent.
    pub seed: Option<u64>,
    pub config: GeneratorConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            defaults_path: PathBuf::from(DEFAULT_BASE_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            yaml_path: None,
            limits: Limits::default(),
            forces: Vec::new(),
            vetoes: Vec::new(),
            multiworld: false,
            seed: None,
            config: GeneratorConfig::default(),
        }
    }
}

pub fn run(settings: RunSettings) -> Result<Generated> {
    if settings.limits.min_items > settings.limits.max_items {
        return Err(MysteryError::Config(format!(
            "min_items ({}) is larger than max_items ({})",
            settings.limits.min_items, settings.limits.max_items
        )));
    }

    let mut weights = WeightTable::load(&settings.weights_path)?;
    let defaults = SettingsDocument::load(&settings.defaults_path)?;
    tracing::debug!(
        weights = %settings.weights_path.display(),
        defaults = %settings.defaults_path.display(),
        "loaded inputs"
    );

    weights.apply_forces(&settings.forces);
    weights.apply_vetoes(&settings.vetoes);
    if settings.multiworld {
        tracing::info!("Removing options unsuitable for multiworld");
        weights.apply_multiworld();
    }

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut generator = Generator::new(weights, defaults, settings.limits, settings.config);
    let generated = generator.generate(&mut rng)?;

    generated.settings.write_json(&settings.output_path)?;
    if let Some(yaml_path) = &settings.yaml_path {
        convert::write_web_yaml(&generated.settings, yaml_path)?;
        tracing::info!("Wrote web settings to {}", yaml_path.display());
    }

    Ok(generated)
}
