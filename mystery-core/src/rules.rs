//! The ordered rule graph for one attempt.
//!
//! Each rule draws one setting (or derives it) and then returns the patches
//! that its value implies for settings further down the list. A rule may only
//! read settings produced by rules above it, so the order here is the
//! dependency order and changing it changes the generated seeds.

use crate::engine::{Patch, Rule};
use crate::score::Axis;
use crate::settings::{Coerce, SettingValue, SettingsDocument};
use crate::weights::WeightTable;
use crate::{MysteryError, Result};

pub const HUNT_GOALS: &[&str] = &["triforcehunt", "ganonhunt"];

pub const START_INVENTORY: &str = "startinventory";
const UNIVERSAL_KEYS_ITEM: &str = "Small Key (Universal),Small Key (Universal),Small Key (Universal)";

/// Applied to every fresh working table before the first rule.
pub fn attempt_preamble() -> Vec<Patch> {
    vec![Patch::veto("algorithm", "vanilla_fill")]
}

pub static RULES: &[Rule] = &[
    Rule::roll("logic").then(after_logic),
    Rule::roll("goal").then(after_goal),
    Rule::roll("crystals_ganon")
        .reads(&["goal"])
        .when(goal_needs_crystals),
    Rule::roll("mode").then(after_mode),
    Rule::roll("timer").then(after_timer),
    Rule::roll("shuffleenemies")
        .reads(&["mode"])
        .then(after_shuffleenemies),
    Rule::roll("shuffle")
        .reads(&["goal", "mode"])
        .then(after_shuffle),
    Rule::derived("crystals_gt")
        .reads(&["shuffle", "goal", "crystals_ganon"])
        .then(derive_crystals_gt),
    Rule::roll("door_shuffle").then(after_door_shuffle),
    Rule::roll("intensity")
        .reads(&["door_shuffle"])
        .when(doors_shuffled),
    Rule::roll("door_type_mode")
        .reads(&["door_shuffle"])
        .when(doors_shuffled),
    Rule::roll("decoupledoors")
        .reads(&["door_shuffle"])
        .when(doors_shuffled),
    Rule::roll("pottery").reads(&["goal"]).then(after_pottery),
    Rule::roll("wild_dungeon_items").then(after_wild_dungeon_items),
    Rule::roll("universal_small_keys")
        .reads(&["wild_dungeon_items"])
        .when(small_keys_wild)
        .then(after_universal_small_keys),
    Rule::derived("keyshuffle")
        .reads(&["wild_dungeon_items", "universal_small_keys"])
        .then(derive_keyshuffle),
    Rule::roll("bow_mode").then(after_bow_mode),
    Rule::roll("difficulty").then(after_difficulty),
    Rule::roll("bombbag").then(after_bombbag),
    Rule::roll("shopsanity"),
    Rule::roll("mystery")
        .reads(&["shopsanity", "pottery"])
        .then(after_mystery),
    Rule::roll("collection_rate"),
    Rule::roll("flute_mode"),
    Rule::roll("swords"),
    Rule::roll("shufflebosses"),
    Rule::roll("enemy_damage"),
    Rule::roll("enemy_health"),
    Rule::roll("boots_hint"),
    Rule::roll("restrict_boss_items"),
    Rule::roll("overworld_map"),
    Rule::roll("shufflelinks"),
    Rule::roll("shuffletavern"),
    Rule::roll("shuffleganon"),
    Rule::roll("openpyramid"),
    Rule::roll("experimental"),
    Rule::roll("algorithm"),
    Rule::verbatim("dungeon_counters"),
    Rule::roll("hints"),
    Rule::roll("pseudoboots").then(after_pseudoboots),
    Rule::roll("item_functionality"),
    Rule::verbatim("progressive"),
    Rule::roll("accessibility"),
    Rule::roll("beemizer"),
    Rule::roll("take_any"),
    Rule::roll("dropshuffle"),
];

pub fn is_hunt(settings: &SettingsDocument) -> bool {
    settings.is_any("goal", HUNT_GOALS)
}

fn goal_needs_crystals(settings: &SettingsDocument) -> bool {
    settings.is_any("goal", &["ganon", "crystals"])
}

fn doors_shuffled(settings: &SettingsDocument) -> bool {
    !settings.is("door_shuffle", "vanilla")
}

fn small_keys_wild(settings: &SettingsDocument) -> bool {
    settings.has_flag("wild_dungeon_items", 's')
}

fn after_logic(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if settings.is("logic", "noglitches") {
        return Ok(Vec::new());
    }
    Ok(vec![
        Patch::veto("algorithm", "dungeon_only"),
        Patch::force("pseudoboots", "off"),
        Patch::grant("Pegasus Boots"),
        Patch::veto(START_INVENTORY, "Pegasus Boots"),
    ])
}

fn after_goal(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let mut patches = Vec::new();
    if settings.is_any("goal", &["triforcehunt", "ganonhunt", "trinity"]) {
        patches.push(Patch::veto("algorithm", "major_only"));
    }
    if settings.is("goal", "ganonhunt") {
        patches.push(Patch::reweight("openpyramid", "on", 1.0));
        patches.push(Patch::reweight("openpyramid", "off", 1.0));
    }
    if settings.is("goal", "completionist") {
        patches.push(Patch::force("accessibility", "locations"));
        patches.push(Patch::force("mystery", "off"));
        patches.push(Patch::force("collection_rate", "on"));
    }
    if settings.is("goal", "crystals") {
        patches.push(Patch::force("openpyramid", "on"));
    }
    Ok(patches)
}

fn after_mode(settings: &SettingsDocument, weights: &WeightTable) -> Result<Vec<Patch>> {
    if !settings.is("mode", "standard") {
        return Ok(Vec::new());
    }
    let mut patches = Vec::new();
    if let Some(off) = weights.weight("boots_hint", "off") {
        patches.push(Patch::reweight("boots_hint", "on", off));
    }
    patches.push(Patch::force("flute_mode", "normal"));
    Ok(patches)
}

fn after_timer(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if settings.is("timer", "none") {
        return Ok(Vec::new());
    }
    Ok(vec![
        Patch::force("shuffleenemies", "none"),
        Patch::force("shufflebosses", "none"),
    ])
}

fn after_shuffleenemies(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if settings.is("shuffleenemies", "none") {
        return Ok(Vec::new());
    }
    let mut patches = Vec::new();
    if settings.is("mode", "standard") {
        patches.push(Patch::force("swords", "assured"));
    }
    patches.push(Patch::veto("enemy_health", "hard"));
    patches.push(Patch::veto("enemy_health", "expert"));
    Ok(patches)
}

fn after_shuffle(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let mut patches = Vec::new();

    if settings.is("shuffle", "vanilla") {
        patches.push(Patch::force("shuffleganon", "off"));
        patches.push(Patch::force("shufflelinks", "off"));
        patches.push(Patch::force("shuffletavern", "off"));
        patches.push(Patch::force("overworld_map", "default"));
        return Ok(patches);
    }

    if settings.is("shuffle", "lean") {
        for pottery in ["lottery", "cave", "cavekeys"] {
            patches.push(Patch::veto("pottery", pottery));
        }
        patches.push(Patch::force("shopsanity", "off"));
    }
    if settings.is("shuffle", "insanity") {
        patches.push(Patch::force("bombbag", "off"));
        patches.push(Patch::grant("Ocarina"));
        patches.push(Patch::veto(START_INVENTORY, "Ocarina"));
    }

    if settings.is("goal", "ganonhunt") {
        patches.push(Patch::force("shuffleganon", "off"));
        patches.push(Patch::force("openpyramid", "on"));
    } else {
        patches.push(Patch::force("shuffleganon", "on"));
        patches.push(Patch::force("openpyramid", "off"));
    }
    if settings.is("mode", "inverted") {
        patches.push(Patch::force("shufflelinks", "on"));
    }
    patches.push(Patch::force("accessibility", "locations"));
    patches.push(Patch::zero_axis("take_any", "random", Axis::Familiarity));
    patches.push(Patch::zero_axis("take_any", "fixed", Axis::Familiarity));
    Ok(patches)
}

/// Tower crystals either follow the ganon requirement, are pinned to zero for
/// an open-pyramid ganon hunt, or are picked uniformly.
fn derive_crystals_gt(settings: &SettingsDocument, weights: &WeightTable) -> Result<Vec<Patch>> {
    let vanilla = settings.is("shuffle", "vanilla");

    if vanilla && settings.is("goal", "ganon") {
        let max_gt = settings
            .get("crystals_ganon")
            .and_then(SettingValue::as_int)
            .ok_or_else(|| MysteryError::InvalidValue {
                setting: "crystals_ganon".to_string(),
                value: settings
                    .get("crystals_ganon")
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            })?;

        let mut patches = Vec::new();
        for (crystals, _) in weights.numeric_options("crystals_gt") {
            let key = crystals.to_string();
            if crystals > max_gt {
                patches.push(Patch::veto("crystals_gt", &key));
            } else {
                patches.push(Patch::zero_axis("crystals_gt", &key, Axis::Length));
                patches.push(Patch::zero_axis("crystals_gt", &key, Axis::Execution));
            }
        }
        patches.push(Patch::draw("crystals_gt", Coerce::OnOff));
        return Ok(patches);
    }

    // openpyramid is only drawn much later, so this sees the seeded default.
    if !vanilla && settings.is("goal", "ganonhunt") && settings.is_off("openpyramid") {
        return Ok(vec![Patch::assign("crystals_gt", SettingValue::choice("0"))]);
    }

    Ok(vec![Patch::draw_uniform("crystals_gt", 0, 7)])
}

fn after_door_shuffle(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if settings.is("door_shuffle", "vanilla") {
        return Ok(Vec::new());
    }
    Ok(vec![
        Patch::force("dungeon_counters", "on"),
        Patch::veto("wild_dungeon_items", "none"),
    ])
}

fn after_pottery(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let mut patches = Vec::new();
    if !settings.is_any("pottery", &["none", "cave"]) {
        patches.push(Patch::force("dungeon_counters", "on"));
        patches.push(Patch::force("dropshuffle", "on"));
    }
    if !settings.is_any("pottery", &["none", "cave", "keys", "cavekeys"]) && !is_hunt(settings) {
        patches.push(Patch::force("wild_dungeon_items", "mcsb"));
    }
    if !settings.is("pottery", "none") {
        patches.push(Patch::toggle_on("colorizepots"));
    }
    Ok(patches)
}

/// Split the compound `wild_dungeon_items` string into its independent
/// shuffles. Small keys are handled by the next two rules.
fn after_wild_dungeon_items(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let has = |flag| settings.has_flag("wild_dungeon_items", flag);
    let mut patches = Vec::new();

    if has('m') && has('c') && has('s') && has('b') {
        patches.push(Patch::force("restrict_boss_items", "none"));
    } else if has('m') && has('c') {
        patches.push(Patch::veto("restrict_boss_items", "mapcompass"));
    }

    if has('m') {
        patches.push(Patch::toggle_on("mapshuffle"));
    }
    if has('c') {
        patches.push(Patch::toggle_on("compassshuffle"));
    }
    if has('b') {
        patches.push(Patch::toggle_on("bigkeyshuffle"));
    }
    Ok(patches)
}

fn after_universal_small_keys(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let keyshuffle = if settings.is_off("universal_small_keys") {
        "wild"
    } else {
        "universal"
    };
    Ok(vec![
        Patch::assign("keyshuffle", SettingValue::choice(keyshuffle)),
        Patch::remove("universal_small_keys"),
    ])
}

fn derive_keyshuffle(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    let mut patches = vec![Patch::remove("wild_dungeon_items")];
    if !settings.is("keyshuffle", "universal") {
        patches.push(Patch::veto(START_INVENTORY, UNIVERSAL_KEYS_ITEM));
    }
    Ok(patches)
}

fn after_bow_mode(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if !settings.is_any("bow_mode", &["retro", "retro_silvers"]) {
        return Ok(Vec::new());
    }
    Ok(vec![
        Patch::rename_option(START_INVENTORY, "Progressive Bow", "Bow"),
        Patch::veto(START_INVENTORY, "Arrow Upgrade (+10)"),
    ])
}

fn after_difficulty(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if !settings.is_any("difficulty", &["hard", "expert"]) {
        return Ok(Vec::new());
    }
    Ok(vec![Patch::veto(
        START_INVENTORY,
        "Progressive Armor,Progressive Armor",
    )])
}

fn after_bombbag(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if !settings.is_on("bombbag") {
        return Ok(Vec::new());
    }
    Ok(vec![Patch::veto(START_INVENTORY, "Bomb Upgrade (+10)")])
}

fn after_mystery(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if settings.is_off("shopsanity") && settings.is("pottery", "none") {
        return Ok(vec![Patch::force("collection_rate", "off")]);
    }
    Ok(Vec::new())
}

fn after_pseudoboots(settings: &SettingsDocument, _: &WeightTable) -> Result<Vec<Patch>> {
    if !settings.is_on("pseudoboots") {
        return Ok(Vec::new());
    }
    Ok(vec![Patch::veto(START_INVENTORY, "Pegasus Boots")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Consequence, Draft};
    use crate::score::Score;
    use crate::weights::OptionEntry;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn only(table: WeightTable, setting: &str, option: &str) -> WeightTable {
        table.with_option(setting, option, 1.0, Score::ZERO)
    }

    #[test]
    fn rules_only_read_settings_drawn_above_them() {
        let mut seen: HashSet<&str> = HashSet::new();
        for rule in RULES {
            for read in rule.reads {
                let produced_later = RULES.iter().any(|r| r.setting == *read);
                if produced_later {
                    assert!(
                        seen.contains(read),
                        "{} reads {} before it is drawn",
                        rule.setting,
                        read
                    );
                }
            }
            seen.insert(rule.setting);
        }
    }

    #[test]
    fn logic_precedes_settings_it_disables() {
        let position = |name: &str| RULES.iter().position(|r| r.setting == name).unwrap();
        assert!(position("logic") < position("pseudoboots"));
        assert!(position("logic") < position("algorithm"));
        assert!(position("goal") < position("openpyramid"));
        assert!(position("shuffle") < position("crystals_gt"));
        assert!(position("wild_dungeon_items") < position("universal_small_keys"));
        assert!(position("universal_small_keys") < position("keyshuffle"));
    }

    #[test]
    fn glitched_logic_grants_boots() {
        let mut settings = SettingsDocument::new();
        settings.set("logic", SettingValue::choice("owglitches"));
        let patches = after_logic(&settings, &WeightTable::new()).unwrap();
        assert!(patches.contains(&Patch::grant("Pegasus Boots")));
        assert!(patches.contains(&Patch::force("pseudoboots", "off")));
    }

    #[test]
    fn wild_dungeon_items_decompose_into_flags() {
        let mut table = WeightTable::new();
        table = only(table, "wild_dungeon_items", "mcsb");
        table = only(table, "universal_small_keys", "on");
        table = table
            .with_option("restrict_boss_items", "none", 1.0, Score::ZERO)
            .with_option("restrict_boss_items", "mapcompass", 1.0, Score::ZERO);

        let rules: Vec<Rule> = RULES
            .iter()
            .copied()
            .filter(|r| {
                matches!(
                    r.setting,
                    "wild_dungeon_items" | "universal_small_keys" | "keyshuffle"
                )
            })
            .collect();

        let mut draft = Draft::new(table, SettingsDocument::new());
        draft
            .run_rules(&rules, &mut StdRng::seed_from_u64(1))
            .unwrap();

        let s = &draft.settings;
        assert!(s.is_on("mapshuffle"));
        assert!(s.is_on("compassshuffle"));
        assert!(s.is_on("bigkeyshuffle"));
        assert!(s.is("keyshuffle", "universal"));
        assert!(!s.contains("wild_dungeon_items"));
        assert!(!s.contains("universal_small_keys"));
        assert_eq!(
            draft.weights.weight("restrict_boss_items", "mapcompass"),
            Some(0.0)
        );
        assert_eq!(draft.weights.weight("restrict_boss_items", "none"), Some(1.0));
    }

    #[test]
    fn map_compass_only_vetoes_mapcompass_restriction() {
        let mut settings = SettingsDocument::new();
        settings.set("wild_dungeon_items", SettingValue::choice("mc"));
        let patches = after_wild_dungeon_items(&settings, &WeightTable::new()).unwrap();
        assert!(patches.contains(&Patch::veto("restrict_boss_items", "mapcompass")));
        assert!(!patches.contains(&Patch::toggle_on("bigkeyshuffle")));
    }

    #[test]
    fn non_universal_keys_veto_universal_key_item() {
        let mut settings = SettingsDocument::new();
        settings.set("keyshuffle", SettingValue::choice("wild"));
        let patches = derive_keyshuffle(&settings, &WeightTable::new()).unwrap();
        assert!(patches.contains(&Patch::veto(START_INVENTORY, UNIVERSAL_KEYS_ITEM)));
    }

    #[test]
    fn crystals_gt_capped_by_ganon_requirement() {
        let mut table = WeightTable::new();
        for n in 0..=7 {
            table.insert(
                "crystals_gt",
                &n.to_string(),
                OptionEntry::new(1.0, Score::new(2.0, 1.0, 0.0, 0.0)),
            );
        }
        let mut defaults = SettingsDocument::new();
        defaults.set("shuffle", SettingValue::choice("vanilla"));
        defaults.set("goal", SettingValue::choice("ganon"));
        defaults.set("crystals_ganon", SettingValue::choice("3"));

        let rule = [RULES.iter().copied().find(|r| r.setting == "crystals_gt").unwrap()];
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..100 {
            let mut draft = Draft::new(table.clone(), defaults.clone());
            draft.run_rules(&rule, &mut rng).unwrap();
            let gt: i64 = draft.settings.text("crystals_gt").unwrap().parse().unwrap();
            assert!(gt <= 3);
            assert_eq!(draft.score, Score::ZERO);
        }
    }

    #[test]
    fn crystals_gt_pinned_for_closed_pyramid_ganonhunt() {
        let mut settings = SettingsDocument::new();
        settings.set("shuffle", SettingValue::choice("crossed"));
        settings.set("goal", SettingValue::choice("ganonhunt"));
        settings.set("openpyramid", SettingValue::Count(0));
        let patches = derive_crystals_gt(&settings, &WeightTable::new()).unwrap();
        assert_eq!(
            patches,
            vec![Patch::assign("crystals_gt", SettingValue::choice("0"))]
        );
    }

    #[test]
    fn crystals_gt_uniform_otherwise() {
        let mut settings = SettingsDocument::new();
        settings.set("shuffle", SettingValue::choice("crossed"));
        settings.set("goal", SettingValue::choice("ganon"));
        let patches = derive_crystals_gt(&settings, &WeightTable::new()).unwrap();
        assert_eq!(patches, vec![Patch::draw_uniform("crystals_gt", 0, 7)]);
    }

    #[test]
    fn non_numeric_ganon_crystals_is_an_error() {
        let mut settings = SettingsDocument::new();
        settings.set("shuffle", SettingValue::choice("vanilla"));
        settings.set("goal", SettingValue::choice("ganon"));
        settings.set("crystals_ganon", SettingValue::choice("random"));
        assert!(matches!(
            derive_crystals_gt(&settings, &WeightTable::new()),
            Err(MysteryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn entrance_shuffle_opens_pyramid_for_ganonhunt() {
        let mut settings = SettingsDocument::new();
        settings.set("shuffle", SettingValue::choice("insanity"));
        settings.set("goal", SettingValue::choice("ganonhunt"));
        settings.set("mode", SettingValue::choice("inverted"));
        let patches = after_shuffle(&settings, &WeightTable::new()).unwrap();
        for expected in [
            Patch::force("bombbag", "off"),
            Patch::grant("Ocarina"),
            Patch::force("shuffleganon", "off"),
            Patch::force("openpyramid", "on"),
            Patch::force("shufflelinks", "on"),
            Patch::zero_axis("take_any", "fixed", Axis::Familiarity),
        ] {
            assert!(patches.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn standard_mode_evens_out_boots_hint() {
        let table = WeightTable::new()
            .with_option("boots_hint", "on", 1.0, Score::ZERO)
            .with_option("boots_hint", "off", 4.0, Score::ZERO);
        let mut settings = SettingsDocument::new();
        settings.set("mode", SettingValue::choice("standard"));
        let patches = after_mode(&settings, &table).unwrap();
        assert_eq!(patches[0], Patch::reweight("boots_hint", "on", 4.0));
        assert_eq!(patches[1], Patch::force("flute_mode", "normal"));
    }

    #[test]
    fn pottery_forces_wild_items_outside_hunts() {
        let mut settings = SettingsDocument::new();
        settings.set("pottery", SettingValue::choice("lottery"));
        settings.set("goal", SettingValue::choice("ganon"));
        let patches = after_pottery(&settings, &WeightTable::new()).unwrap();
        assert!(patches.contains(&Patch::force("wild_dungeon_items", "mcsb")));
        assert!(patches.contains(&Patch::toggle_on("colorizepots")));

        settings.set("goal", SettingValue::choice("triforcehunt"));
        let patches = after_pottery(&settings, &WeightTable::new()).unwrap();
        assert!(!patches.contains(&Patch::force("wild_dungeon_items", "mcsb")));
    }

    #[test]
    fn progressive_keeps_its_identifier() {
        let table = only(WeightTable::new(), "progressive", "on");
        let rule = [RULES.iter().copied().find(|r| r.setting == "progressive").unwrap()];
        let mut draft = Draft::new(table, SettingsDocument::new());
        draft
            .run_rules(&rule, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(draft.settings.get("progressive"), Some(&SettingValue::choice("on")));
    }

    const ORDER: &[&str] = &[
        "logic",
        "goal",
        "crystals_ganon",
        "mode",
        "timer",
        "shuffleenemies",
        "shuffle",
        "crystals_gt",
        "door_shuffle",
        "intensity",
        "door_type_mode",
        "decoupledoors",
        "pottery",
        "wild_dungeon_items",
        "universal_small_keys",
        "keyshuffle",
        "bow_mode",
        "difficulty",
        "bombbag",
        "shopsanity",
        "mystery",
        "collection_rate",
        "flute_mode",
        "swords",
        "shufflebosses",
        "enemy_damage",
        "enemy_health",
        "boots_hint",
        "restrict_boss_items",
        "overworld_map",
        "shufflelinks",
        "shuffletavern",
        "shuffleganon",
        "openpyramid",
        "experimental",
        "algorithm",
        "dungeon_counters",
        "hints",
        "pseudoboots",
        "item_functionality",
        "progressive",
        "accessibility",
        "beemizer",
        "take_any",
        "dropshuffle",
    ];

    fn doc(pairs: &[(&str, SettingValue)]) -> SettingsDocument {
        let mut settings = SettingsDocument::new();
        for (setting, value) in pairs {
            settings.set(setting, value.clone());
        }
        settings
    }

    fn choice(setting: &str, option: &str) -> SettingsDocument {
        doc(&[(setting, SettingValue::choice(option))])
    }

    fn patches(consequence: Consequence, settings: &SettingsDocument) -> Vec<Patch> {
        consequence(settings, &WeightTable::new()).unwrap()
    }

    #[test]
    fn rule_order_is_fixed() {
        let order: Vec<&str> = RULES.iter().map(|r| r.setting).collect();
        assert_eq!(order, ORDER);
    }

    #[test]
    fn timer_disables_enemy_and_boss_shuffle() {
        assert!(patches(after_timer, &choice("timer", "none")).is_empty());
        assert_eq!(
            patches(after_timer, &choice("timer", "timed-ohko")),
            vec![
                Patch::force("shuffleenemies", "none"),
                Patch::force("shufflebosses", "none"),
            ]
        );
    }

    #[test]
    fn enemy_shuffle_table() {
        let cases = [
            ("none", "standard", vec![]),
            (
                "shuffled",
                "open",
                vec![
                    Patch::veto("enemy_health", "hard"),
                    Patch::veto("enemy_health", "expert"),
                ],
            ),
            (
                "random",
                "standard",
                vec![
                    Patch::force("swords", "assured"),
                    Patch::veto("enemy_health", "hard"),
                    Patch::veto("enemy_health", "expert"),
                ],
            ),
        ];
        for (enemies, mode, expected) in cases {
            let settings = doc(&[
                ("shuffleenemies", SettingValue::choice(enemies)),
                ("mode", SettingValue::choice(mode)),
            ]);
            assert_eq!(patches(after_shuffleenemies, &settings), expected, "{enemies}/{mode}");
        }
    }

    #[test]
    fn vanilla_entrances_pin_entrance_extras() {
        let settings = doc(&[
            ("shuffle", SettingValue::choice("vanilla")),
            ("goal", SettingValue::choice("ganonhunt")),
        ]);
        assert_eq!(
            patches(after_shuffle, &settings),
            vec![
                Patch::force("shuffleganon", "off"),
                Patch::force("shufflelinks", "off"),
                Patch::force("shuffletavern", "off"),
                Patch::force("overworld_map", "default"),
            ]
        );
    }

    #[test]
    fn lean_entrances_drop_cave_pots_and_shops() {
        let settings = doc(&[
            ("shuffle", SettingValue::choice("lean")),
            ("goal", SettingValue::choice("ganon")),
            ("mode", SettingValue::choice("open")),
        ]);
        let lean = patches(after_shuffle, &settings);
        for expected in [
            Patch::veto("pottery", "lottery"),
            Patch::veto("pottery", "cave"),
            Patch::veto("pottery", "cavekeys"),
            Patch::force("shopsanity", "off"),
            Patch::force("shuffleganon", "on"),
            Patch::force("openpyramid", "off"),
            Patch::force("accessibility", "locations"),
        ] {
            assert!(lean.contains(&expected), "missing {expected:?}");
        }
        assert!(!lean.contains(&Patch::force("bombbag", "off")));
        assert!(!lean.contains(&Patch::force("shufflelinks", "on")));
    }

    #[test]
    fn goal_consequences() {
        assert_eq!(
            patches(after_goal, &choice("goal", "completionist")),
            vec![
                Patch::force("accessibility", "locations"),
                Patch::force("mystery", "off"),
                Patch::force("collection_rate", "on"),
            ]
        );
        assert_eq!(
            patches(after_goal, &choice("goal", "ganonhunt")),
            vec![
                Patch::veto("algorithm", "major_only"),
                Patch::reweight("openpyramid", "on", 1.0),
                Patch::reweight("openpyramid", "off", 1.0),
            ]
        );
        assert_eq!(
            patches(after_goal, &choice("goal", "crystals")),
            vec![Patch::force("openpyramid", "on")]
        );
        assert!(patches(after_goal, &choice("goal", "ganon")).is_empty());
    }

    #[test]
    fn shuffled_doors_need_counters_and_wild_items() {
        assert!(patches(after_door_shuffle, &choice("door_shuffle", "vanilla")).is_empty());
        assert_eq!(
            patches(after_door_shuffle, &choice("door_shuffle", "crossed")),
            vec![
                Patch::force("dungeon_counters", "on"),
                Patch::veto("wild_dungeon_items", "none"),
            ]
        );
    }

    #[test]
    fn retro_bow_renames_the_start_bow() {
        let table = only(WeightTable::new(), "bow_mode", "retro")
            .with_option(START_INVENTORY, "Progressive Bow", 1.0, Score::new(-2.0, 0.0, 1.0, 0.0))
            .with_option(START_INVENTORY, "Arrow Upgrade (+10)", 1.0, Score::ZERO)
            .with_option(START_INVENTORY, "Lamp", 1.0, Score::ZERO);
        let rule = [RULES.iter().copied().find(|r| r.setting == "bow_mode").unwrap()];
        let mut draft = Draft::new(table, SettingsDocument::new());
        draft
            .run_rules(&rule, &mut StdRng::seed_from_u64(6))
            .unwrap();

        let weights = &draft.weights;
        assert!(weights.option(START_INVENTORY, "Progressive Bow").is_none());
        assert_eq!(
            weights.option(START_INVENTORY, "Bow"),
            Some(&OptionEntry::new(1.0, Score::new(-2.0, 0.0, 1.0, 0.0)))
        );
        assert_eq!(weights.weight(START_INVENTORY, "Arrow Upgrade (+10)"), Some(0.0));
        assert_eq!(weights.weight(START_INVENTORY, "Lamp"), Some(1.0));

        assert!(patches(after_bow_mode, &choice("bow_mode", "progressive")).is_empty());
    }

    #[test]
    fn item_pool_and_bombbag_veto_start_items() {
        let cases: [(Consequence, SettingsDocument, Vec<Patch>); 6] = [
            (
                after_difficulty,
                choice("difficulty", "hard"),
                vec![Patch::veto(START_INVENTORY, "Progressive Armor,Progressive Armor")],
            ),
            (
                after_difficulty,
                choice("difficulty", "expert"),
                vec![Patch::veto(START_INVENTORY, "Progressive Armor,Progressive Armor")],
            ),
            (after_difficulty, choice("difficulty", "normal"), vec![]),
            (
                after_bombbag,
                doc(&[("bombbag", SettingValue::Toggle(true))]),
                vec![Patch::veto(START_INVENTORY, "Bomb Upgrade (+10)")],
            ),
            (after_bombbag, doc(&[("bombbag", SettingValue::Toggle(false))]), vec![]),
            (
                after_pseudoboots,
                doc(&[("pseudoboots", SettingValue::Toggle(true))]),
                vec![Patch::veto(START_INVENTORY, "Pegasus Boots")],
            ),
        ];
        for (consequence, settings, expected) in cases {
            assert_eq!(patches(consequence, &settings), expected);
        }
        assert!(patches(
            after_pseudoboots,
            &doc(&[("pseudoboots", SettingValue::Toggle(false))])
        )
        .is_empty());
    }

    #[test]
    fn mystery_needs_no_collection_rate_without_extra_locations() {
        let quiet = doc(&[
            ("shopsanity", SettingValue::Toggle(false)),
            ("pottery", SettingValue::choice("none")),
        ]);
        assert_eq!(
            patches(after_mystery, &quiet),
            vec![Patch::force("collection_rate", "off")]
        );
        let shops = doc(&[
            ("shopsanity", SettingValue::Toggle(true)),
            ("pottery", SettingValue::choice("none")),
        ]);
        assert!(patches(after_mystery, &shops).is_empty());
    }

    #[test]
    fn collection_rate_is_drawn_after_mystery() {
        let start = RULES.iter().position(|r| r.setting == "shopsanity").unwrap();
        let end = RULES.iter().position(|r| r.setting == "collection_rate").unwrap();
        let table = only(WeightTable::new(), "shopsanity", "off")
            .with_option("mystery", "on", 1.0, Score::ZERO)
            .with_option("collection_rate", "on", 1.0, Score::ZERO)
            .with_option("collection_rate", "off", 1.0, Score::ZERO);
        let defaults = choice("pottery", "none");

        for seed in 0..40 {
            let mut draft = Draft::new(table.clone(), defaults.clone());
            draft
                .run_rules(&RULES[start..=end], &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert!(draft.settings.is_off("collection_rate"), "seed {seed}");
        }
    }
}
