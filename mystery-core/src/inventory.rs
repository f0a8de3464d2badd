use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{GeneratorConfig, Limits};
use crate::engine::Draft;
use crate::rules::START_INVENTORY;
use crate::score::Score;
use crate::settings::SettingValue;

/// Use start-inventory items to nudge the score into range, then top the list
/// up towards the item limits.
pub fn augment<R: Rng + ?Sized>(
    draft: &mut Draft,
    limits: &Limits,
    config: &GeneratorConfig,
    rng: &mut R,
) {
    let bounds = &limits.bounds;
    let mut candidates: Vec<(String, Score)> = draft
        .weights
        .drawable(START_INVENTORY)
        .into_iter()
        .filter(|(item, _)| !draft.start_inventory.iter().any(|held| held == item))
        .map(|(item, entry)| (item.to_string(), entry.points))
        .collect();
    candidates.shuffle(rng);

    let mut leftover = Vec::with_capacity(candidates.len());
    let mut candidates = candidates.into_iter();
    for (item, points) in candidates.by_ref() {
        if draft.start_inventory.len() >= limits.max_items || bounds.within_limits(&draft.score) {
            leftover.push((item, points));
            break;
        }
        if bounds.better_than_current(&draft.score, &points)
            && rng.gen::<f64>() >= config.corrective_skip_chance
        {
            tracing::trace!(%item, "corrective start item");
            draft.score += points;
            draft.start_inventory.push(item);
        } else {
            leftover.push((item, points));
        }
    }
    leftover.extend(candidates);
    leftover.shuffle(rng);

    for (item, points) in leftover {
        let held = draft.start_inventory.len();
        if held >= limits.max_items {
            break;
        }
        if !bounds.item_within_limits(&draft.score, &points) {
            continue;
        }
        if held >= limits.min_items && rng.gen::<f64>() < config.fill_stop_chance {
            break;
        }
        tracing::trace!(%item, "filler start item");
        draft.score += points;
        draft.start_inventory.push(item);
    }

    finalize(draft);
}

/// Record the start inventory in the settings document.
pub fn finalize(draft: &mut Draft) {
    if draft.start_inventory.is_empty() {
        return;
    }
    draft
        .settings
        .set("usestartinventory", SettingValue::Toggle(true));
    draft.settings.set(
        START_INVENTORY,
        SettingValue::Choice(draft.start_inventory.join(",")),
    );
}
