use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::score::{Axis, Score};
use crate::Result;

/// One candidate option of a setting: its relative weight plus the score it
/// contributes when drawn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    #[serde(default)]
    pub weight: f64,
    #[serde(flatten)]
    pub points: Score,
}

impl OptionEntry {
    pub fn new(weight: f64, points: Score) -> Self {
        Self { weight, points }
    }

    pub fn is_drawable(&self) -> bool {
        self.weight > 0.0
    }
}

pub type Setting = BTreeMap<String, OptionEntry>;

/// Setting name -> option name -> entry.
///
/// Options are kept in sorted order so that a seeded draw sequence is
/// reproducible regardless of how the source document was laid out.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    settings: BTreeMap<String, Setting>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Builder used by callers that assemble a table in code.
    pub fn with_option(
        mut self,
        setting: &str,
        option: &str,
        weight: f64,
        points: Score,
    ) -> Self {
        self.insert(setting, option, OptionEntry::new(weight, points));
        self
    }

    pub fn insert(&mut self, setting: &str, option: &str, entry: OptionEntry) {
        self.settings
            .entry(setting.to_string())
            .or_default()
            .insert(option.to_string(), entry);
    }

    pub fn option(&self, setting: &str, option: &str) -> Option<&OptionEntry> {
        self.settings.get(setting)?.get(option)
    }

    fn option_mut(&mut self, setting: &str, option: &str) -> Option<&mut OptionEntry> {
        self.settings.get_mut(setting)?.get_mut(option)
    }

    pub fn weight(&self, setting: &str, option: &str) -> Option<f64> {
        self.option(setting, option).map(|entry| entry.weight)
    }

    /// Point-mass `setting` on `option`. Returns false (and leaves the table
    /// alone) when the option does not exist.
    pub fn force(&mut self, setting: &str, option: &str) -> bool {
        let Some(options) = self.settings.get_mut(setting) else {
            return false;
        };
        if !options.contains_key(option) {
            return false;
        }
        for (name, entry) in options.iter_mut() {
            entry.weight = if name == option { 1.0 } else { 0.0 };
        }
        true
    }

    pub fn veto(&mut self, setting: &str, option: &str) -> bool {
        self.set_weight(setting, option, 0.0)
    }

    pub fn set_weight(&mut self, setting: &str, option: &str, weight: f64) -> bool {
        match self.option_mut(setting, option) {
            Some(entry) => {
                entry.weight = weight;
                true
            }
            None => false,
        }
    }

    pub fn zero_axis(&mut self, setting: &str, option: &str, axis: Axis) -> bool {
        match self.option_mut(setting, option) {
            Some(entry) => {
                entry.points.set(axis, 0.0);
                true
            }
            None => false,
        }
    }

    /// Move an option entry to a new key, keeping its weight and points.
    pub fn rename_option(&mut self, setting: &str, from: &str, to: &str) -> bool {
        let Some(options) = self.settings.get_mut(setting) else {
            return false;
        };
        match options.remove(from) {
            Some(entry) => {
                options.insert(to.to_string(), entry);
                true
            }
            None => false,
        }
    }

    /// Options of `setting` that can currently be drawn.
    pub fn drawable(&self, setting: &str) -> Vec<(&str, &OptionEntry)> {
        self.settings
            .get(setting)
            .map(|options| {
                options
                    .iter()
                    .filter(|(_, entry)| entry.is_drawable())
                    .map(|(name, entry)| (name.as_str(), entry))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Weighted draw among the options with positive weight. `None` when the
    /// setting is absent or nothing is drawable.
    pub fn draw<R: Rng + ?Sized>(&self, setting: &str, rng: &mut R) -> Option<(String, Score)> {
        let candidates = self.drawable(setting);
        let (name, entry) = candidates
            .choose_weighted(rng, |(_, entry)| entry.weight)
            .ok()?;
        Some((name.to_string(), entry.points))
    }

    /// Entries of a probability table whose keys are integers, such as
    /// `tfh_goal` and `tfh_extra_pool`. Non-numeric keys are ignored.
    pub fn numeric_options(&self, setting: &str) -> Vec<(i64, &OptionEntry)> {
        let Some(options) = self.settings.get(setting) else {
            return Vec::new();
        };
        options
            .iter()
            .filter_map(|(name, entry)| match name.trim().parse::<i64>() {
                Ok(value) => Some((value, entry)),
                Err(_) => {
                    tracing::debug!(setting, option = %name, "ignoring non-numeric key");
                    None
                }
            })
            .collect()
    }

    /// Apply `setting:option` forces from the command line. Pairs naming an
    /// unknown setting or option are skipped.
    pub fn apply_forces(&mut self, pairs: &[(String, String)]) {
        for (setting, option) in pairs {
            if self.force(setting, option) {
                tracing::info!("Forcing {setting}: {option}");
            } else {
                tracing::warn!("Cannot force {setting}: {option}, no such option");
            }
        }
    }

    pub fn apply_vetoes(&mut self, pairs: &[(String, String)]) {
        for (setting, option) in pairs {
            if self.veto(setting, option) {
                tracing::info!("Vetoing {setting}: {option}");
            } else {
                tracing::warn!("Cannot veto {setting}: {option}, no such option");
            }
        }
    }

    /// Remove options that do not work when several players share a seed.
    pub fn apply_multiworld(&mut self) {
        const MULTIWORLD_VETOES: &[(&str, &str)] = &[
            ("goal", "triforcehunt"),
            ("goal", "ganonhunt"),
            ("goal", "completionist"),
            ("accessibility", "none"),
            ("mode", "standard"),
        ];
        for (setting, option) in MULTIWORLD_VETOES {
            self.veto(setting, option);
        }
    }
}

/// Parse `setting1:option,setting2:option`. Entries without a colon are
/// dropped.
pub fn parse_overrides(text: &str) -> Vec<(String, String)> {
    text.split(',')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(setting, option)| (setting.trim().to_string(), option.trim().to_string()))
        .filter(|(setting, option)| !setting.is_empty() && !option.is_empty())
        .collect()
}
