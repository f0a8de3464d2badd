use rand::Rng;

use crate::score::{Axis, Score};
use crate::settings::{Coerce, SettingValue, SettingsDocument};
use crate::weights::WeightTable;
use crate::Result;

/// A single consequence of a draw, applied to the working state of an attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    Force { setting: String, option: String },
    Veto { setting: String, option: String },
    Reweight { setting: String, option: String, weight: f64 },
    ZeroAxis { setting: String, option: String, axis: Axis },
    RenameOption { setting: String, from: String, to: String },
    Assign { setting: String, value: SettingValue },
    Remove { setting: String },
    Grant { item: String },
    Draw { setting: String, coerce: Coerce },
    /// Unweighted integer draw over `low..=high`, stored as a numeric string.
    DrawUniform { setting: String, low: i64, high: i64 },
}

impl Patch {
    pub fn force(setting: &str, option: &str) -> Self {
        Patch::Force {
            setting: setting.to_string(),
            option: option.to_string(),
        }
    }

    pub fn veto(setting: &str, option: &str) -> Self {
        Patch::Veto {
            setting: setting.to_string(),
            option: option.to_string(),
        }
    }

    pub fn reweight(setting: &str, option: &str, weight: f64) -> Self {
        Patch::Reweight {
            setting: setting.to_string(),
            option: option.to_string(),
            weight,
        }
    }

    pub fn zero_axis(setting: &str, option: &str, axis: Axis) -> Self {
        Patch::ZeroAxis {
            setting: setting.to_string(),
            option: option.to_string(),
            axis,
        }
    }

    pub fn rename_option(setting: &str, from: &str, to: &str) -> Self {
        Patch::RenameOption {
            setting: setting.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn assign(setting: &str, value: SettingValue) -> Self {
        Patch::Assign {
            setting: setting.to_string(),
            value,
        }
    }

    pub fn toggle_on(setting: &str) -> Self {
        Patch::assign(setting, SettingValue::Toggle(true))
    }

    pub fn remove(setting: &str) -> Self {
        Patch::Remove {
            setting: setting.to_string(),
        }
    }

    pub fn grant(item: &str) -> Self {
        Patch::Grant {
            item: item.to_string(),
        }
    }

    pub fn draw(setting: &str, coerce: Coerce) -> Self {
        Patch::Draw {
            setting: setting.to_string(),
            coerce,
        }
    }

    pub fn draw_uniform(setting: &str, low: i64, high: i64) -> Self {
        Patch::DrawUniform {
            setting: setting.to_string(),
            low,
            high,
        }
    }
}

/// Pure function of the state left by earlier rules.
pub type Consequence = fn(&SettingsDocument, &WeightTable) -> Result<Vec<Patch>>;
pub type Guard = fn(&SettingsDocument) -> bool;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Draw {
    /// Weighted draw from the setting's own options.
    Weighted(Coerce),
    /// No draw of its own; the consequence decides the value.
    Derived,
}

/// One step of the rule graph.
#[derive(Copy, Clone)]
pub struct Rule {
    pub setting: &'static str,
    pub draw: Draw,
    /// Skip the rule entirely unless this holds.
    pub when: Option<Guard>,
    /// Settings the guard and consequence look at.
    pub reads: &'static [&'static str],
    pub then: Option<Consequence>,
}

impl Rule {
    pub const fn roll(setting: &'static str) -> Self {
        Self {
            setting,
            draw: Draw::Weighted(Coerce::OnOff),
            when: None,
            reads: &[],
            then: None,
        }
    }

    pub const fn verbatim(setting: &'static str) -> Self {
        Self {
            draw: Draw::Weighted(Coerce::Verbatim),
            ..Self::roll(setting)
        }
    }

    pub const fn derived(setting: &'static str) -> Self {
        Self {
            draw: Draw::Derived,
            ..Self::roll(setting)
        }
    }

    pub const fn reads(self, reads: &'static [&'static str]) -> Self {
        Self { reads, ..self }
    }

    pub const fn when(self, guard: Guard) -> Self {
        Self {
            when: Some(guard),
            ..self
        }
    }

    pub const fn then(self, consequence: Consequence) -> Self {
        Self {
            then: Some(consequence),
            ..self
        }
    }
}

/// Working state of a single attempt. Owns its copy of the weight table, so
/// nothing done here reaches the cached table.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub weights: WeightTable,
    pub settings: SettingsDocument,
    pub score: Score,
    pub start_inventory: Vec<String>,
}

impl Draft {
    pub fn new(weights: WeightTable, defaults: SettingsDocument) -> Self {
        Self {
            weights,
            settings: defaults,
            score: Score::ZERO,
            start_inventory: Vec::new(),
        }
    }

    /// Draw `setting`, add its points, record it. Settings with nothing
    /// drawable keep whatever value they already had.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        setting: &str,
        coerce: Coerce,
        rng: &mut R,
    ) -> Option<SettingValue> {
        let Some((option, points)) = self.weights.draw(setting, rng) else {
            tracing::trace!(setting, "nothing drawable, keeping default");
            return None;
        };
        self.score += points;
        let value = SettingValue::from_drawn(&option, coerce);
        self.settings.set(setting, value.clone());
        Some(value)
    }

    pub fn apply<R: Rng + ?Sized>(&mut self, patch: Patch, rng: &mut R) {
        let applied = match &patch {
            Patch::Force { setting, option } => self.weights.force(setting, option),
            Patch::Veto { setting, option } => self.weights.veto(setting, option),
            Patch::Reweight {
                setting,
                option,
                weight,
            } => self.weights.set_weight(setting, option, *weight),
            Patch::ZeroAxis {
                setting,
                option,
                axis,
            } => self.weights.zero_axis(setting, option, *axis),
            Patch::RenameOption { setting, from, to } => {
                self.weights.rename_option(setting, from, to)
            }
            Patch::Assign { setting, value } => {
                self.settings.set(setting, value.clone());
                true
            }
            Patch::Remove { setting } => self.settings.remove(setting).is_some(),
            Patch::Grant { item } => {
                self.start_inventory.push(item.clone());
                true
            }
            Patch::Draw { setting, coerce } => self.draw(setting, *coerce, rng).is_some(),
            Patch::DrawUniform { setting, low, high } => {
                let value = rng.gen_range(*low..=*high);
                self.settings
                    .set(setting, SettingValue::Choice(value.to_string()));
                true
            }
        };
        if !applied {
            tracing::trace!(?patch, "patch had nothing to act on");
        }
    }

    /// Run `rules` in order against this draft.
    pub fn run_rules<R: Rng + ?Sized>(&mut self, rules: &[Rule], rng: &mut R) -> Result<()> {
        for rule in rules {
            if let Some(guard) = rule.when {
                if !guard(&self.settings) {
                    continue;
                }
            }

            if let Draw::Weighted(coerce) = rule.draw {
                self.draw(rule.setting, coerce, rng);
            }

            if let Some(consequence) = rule.then {
                for patch in consequence(&self.settings, &self.weights)? {
                    self.apply(patch, rng);
                }
            }
        }
        Ok(())
    }
}
