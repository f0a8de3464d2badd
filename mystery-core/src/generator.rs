use rand::Rng;

use crate::config::{GeneratorConfig, Limits};
use crate::engine::Draft;
use crate::hunt::{hunt_candidates, select_hunt, HuntCandidate};
use crate::inventory::augment;
use crate::rules::{attempt_preamble, is_hunt, HUNT_GOALS, RULES};
use crate::score::Score;
use crate::settings::{SettingValue, SettingsDocument};
use crate::weights::WeightTable;
use crate::{MysteryError, Result};

/// An accepted settings document.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub settings: SettingsDocument,
    pub score: Score,
    pub start_inventory: Vec<String>,
    pub hunt: Option<HuntCandidate>,
    /// 1-based number of the attempt that succeeded.
    pub attempts: u32,
}

enum Phase {
    Attempting(u32),
    Done(Generated),
}

enum Outcome {
    Accepted(Draft, Option<HuntCandidate>),
    Rejected(String),
}

/// Runs attempts against a cached weight table until one lands within limits.
#[derive(Debug, Clone)]
pub struct Generator {
    cache: WeightTable,
    defaults: SettingsDocument,
    limits: Limits,
    config: GeneratorConfig,
    relaxed: bool,
}

impl Generator {
    pub fn new(
        cache: WeightTable,
        defaults: SettingsDocument,
        limits: Limits,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            cache,
            defaults,
            limits,
            config,
            relaxed: false,
        }
    }

    pub fn cache(&self) -> &WeightTable {
        &self.cache
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Generated> {
        let mut phase = Phase::Attempting(1);
        loop {
            phase = match phase {
                Phase::Done(generated) => {
                    log_summary(&generated);
                    return Ok(generated);
                }
                Phase::Attempting(attempt) if attempt > self.config.max_attempts => {
                    return Err(MysteryError::Exhausted {
                        attempts: self.config.max_attempts,
                    });
                }
                Phase::Attempting(attempt) => {
                    self.relax_if_due(attempt - 1);
                    match self.attempt(rng)? {
                        Outcome::Accepted(draft, hunt) => Phase::Done(Generated {
                            settings: draft.settings,
                            score: draft.score,
                            start_inventory: draft.start_inventory,
                            hunt,
                            attempts: attempt,
                        }),
                        Outcome::Rejected(reason) => {
                            tracing::debug!(attempt, %reason, "attempt rejected");
                            Phase::Attempting(attempt + 1)
                        }
                    }
                }
            };
        }
    }

    /// Hunts are the usual reason for running out of attempts, so after
    /// enough failures they are taken off the table for the rest of the run.
    fn relax_if_due(&mut self, failed: u32) {
        if self.relaxed {
            return;
        }
        let Some(after) = self.config.relax_after else {
            return;
        };
        if failed < after {
            return;
        }
        tracing::warn!(failed, "no luck so far, dropping hunt goals");
        for goal in HUNT_GOALS {
            self.cache.veto("goal", goal);
        }
        self.relaxed = true;
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Outcome> {
        let mut draft = Draft::new(self.cache.clone(), self.defaults.clone());
        for patch in attempt_preamble() {
            draft.apply(patch, rng);
        }
        draft.run_rules(RULES, rng)?;

        let mut hunt = None;
        if is_hunt(&draft.settings) {
            let candidates =
                hunt_candidates(&draft.settings, &draft.weights, self.config.hunt_trials, rng);
            let Some((candidate, score)) =
                select_hunt(candidates, draft.score, &self.limits.bounds, rng)
            else {
                return Ok(Outcome::Rejected("no feasible hunt".to_string()));
            };
            draft.score = score;
            draft
                .settings
                .set("triforce_goal", SettingValue::Count(i64::from(candidate.goal)));
            draft
                .settings
                .set("triforce_pool", SettingValue::Count(i64::from(candidate.pool)));
            hunt = Some(candidate);
        }

        augment(&mut draft, &self.limits, &self.config, rng);

        if !self.limits.bounds.within_limits(&draft.score) {
            return Ok(Outcome::Rejected(format!("score {} out of bounds", draft.score)));
        }
        Ok(Outcome::Accepted(draft, hunt))
    }
}

fn describe(settings: &SettingsDocument, setting: &str) -> String {
    settings
        .get(setting)
        .map_or_else(|| "-".to_string(), ToString::to_string)
}

fn yes_no(settings: &SettingsDocument, setting: &str) -> &'static str {
    if settings.is_on(setting) {
        "Yes"
    } else {
        "No"
    }
}

fn log_summary(generated: &Generated) {
    let settings = &generated.settings;
    tracing::info!("{} (attempt {})", generated.score, generated.attempts);
    tracing::info!("Filler Algorithm: {}", describe(settings, "algorithm"));
    tracing::info!(
        "Boss item restriction: {}",
        describe(settings, "restrict_boss_items")
    );
    tracing::info!("Take Any: {}", describe(settings, "take_any"));
    tracing::info!("Pseudoboots: {}", yes_no(settings, "pseudoboots"));
    tracing::info!("Boots Hint: {}", yes_no(settings, "boots_hint"));
    if let Some(hunt) = &generated.hunt {
        tracing::info!("Extra TF Pool: {}%", hunt.extra_pool_percent());
    }
}
