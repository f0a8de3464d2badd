use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::hunt::DEFAULT_TRIALS;
use crate::score::{AxisRange, Bounds};
use crate::MysteryError;

/// Knobs of the attempt loop that are not part of the acceptance limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub max_attempts: u32,
    /// Failed attempts after which hunt goals are vetoed for the rest of the
    /// run. `None` never relaxes.
    pub relax_after: Option<u32>,
    pub hunt_trials: usize,
    pub corrective_skip_chance: f64,
    pub fill_stop_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 75,
            relax_after: Some(50),
            hunt_trials: DEFAULT_TRIALS,
            corrective_skip_chance: 0.2,
            fill_stop_chance: 0.5,
        }
    }
}

/// Acceptance limits: the four score bounds plus start inventory size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub bounds: Bounds,
    pub min_items: usize,
    pub max_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Preset::default().limits()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Friendly,
    NotSlow,
    Complex,
    Ordeal,
    Chaos,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Friendly,
        Preset::NotSlow,
        Preset::Complex,
        Preset::Ordeal,
        Preset::Chaos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Friendly => "friendly",
            Preset::NotSlow => "notslow",
            Preset::Complex => "complex",
            Preset::Ordeal => "ordeal",
            Preset::Chaos => "chaos",
        }
    }

    pub fn limits(self) -> Limits {
        // (length, execution, familiarity, variance, items)
        let (length, execution, familiarity, variance, (min_items, max_items)) = match self {
            Preset::Friendly => ((-5.0, 4.0), (-5.0, 3.0), (-5.0, 5.0), (-4.0, 10.0), (1, 4)),
            Preset::NotSlow => ((-5.0, 0.0), (-5.0, 10.0), (-3.0, 20.0), (-10.0, 10.0), (1, 4)),
            Preset::Complex => ((3.0, 12.0), (0.0, 6.0), (8.0, 20.0), (-6.0, 8.0), (1, 4)),
            Preset::Ordeal => ((10.0, 30.0), (4.0, 10.0), (15.0, 30.0), (-6.0, 5.0), (0, 4)),
            Preset::Chaos => (
                (-100.0, 100.0),
                (-100.0, 100.0),
                (-100.0, 100.0),
                (-100.0, 100.0),
                (1, 4),
            ),
        };
        let range = |(min, max): (f64, f64)| AxisRange::new(min, max);
        Limits {
            bounds: Bounds {
                length: range(length),
                execution: range(execution),
                familiarity: range(familiarity),
                variance: range(variance),
            },
            min_items,
            max_items,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = MysteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MysteryError::Config(format!("unknown preset '{s}'")))
    }
}
