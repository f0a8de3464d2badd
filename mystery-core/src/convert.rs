//! Translation of a generated settings document into the YAML dialect used by
//! the web generator.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::rules::START_INVENTORY;
use crate::settings::{SettingValue, SettingsDocument};
use crate::Result;

/// CLI-only settings with no web counterpart.
const IGNORED: &[&str] = &[
    "enemizercli",
    "saveonexit",
    "calc_playthrough",
    "create_spoiler",
    "mystery",
    "bps",
    "collection_rate",
];

const SETTING_NAMES: &[(&str, &str)] = &[
    ("goal", "goals"),
    ("bigkeyshuffle", "bigkey_shuffle"),
    ("keyshuffle", "smallkey_shuffle"),
    ("compassshuffle", "compass_shuffle"),
    ("mapshuffle", "map_shuffle"),
    ("swords", "weapons"),
    ("crystals_ganon", "ganon_open"),
    ("crystals_gt", "tower_open"),
    ("mode", "world_state"),
    ("shuffle", "entrance_shuffle"),
    ("shuffleenemies", "enemy_shuffle"),
    ("shufflebosses", "boss_shuffle"),
    ("logic", "glitches_required"),
    ("difficulty", "item_pool"),
];

/// Settings whose 0/1 values are counts, not switches.
const NUMERIC: &[&str] = &["ganon_open", "tower_open", "beemizer"];

const OPTION_NAMES: &[(&str, &str, &str)] = &[
    ("goals", "crystals", "fast_ganon"),
    ("goals", "triforcehunt", "triforce-hunt"),
    ("weapons", "random", "randomized"),
    ("glitches_required", "noglitches", "none"),
    ("glitches_required", "owglitches", "owg"),
    ("glitches_required", "no_logic", "nologic"),
];

fn setting_name(setting: &str) -> &str {
    SETTING_NAMES
        .iter()
        .find(|(from, _)| *from == setting)
        .map_or(setting, |&(_, to)| to)
}

fn option_value(setting: &str, value: &SettingValue) -> Result<Value> {
    if !NUMERIC.contains(&setting) {
        if let Some(on) = value.as_flag() {
            return Ok(Value::from(if on { "on" } else { "off" }));
        }
    }
    if let Some(option) = value.as_str() {
        let renamed = OPTION_NAMES
            .iter()
            .find(|(name, from, _)| *name == setting && *from == option)
            .map_or(option, |&(_, _, to)| to);
        return Ok(Value::from(renamed));
    }
    Ok(match value {
        SettingValue::Toggle(on) => Value::from(i64::from(*on)),
        SettingValue::Count(n) => Value::from(*n),
        SettingValue::Raw(raw) => serde_yaml::to_value(raw)?,
        SettingValue::Choice(text) => Value::from(text.as_str()),
    })
}

fn start_inventory(value: &SettingValue) -> Value {
    let mut items = Mapping::new();
    let text = value.to_string();
    for item in text.split(',').filter(|item| !item.is_empty()) {
        items.insert(Value::from(item), Value::from("on"));
    }
    Value::Mapping(items)
}

pub fn to_web_yaml(settings: &SettingsDocument) -> Result<Mapping> {
    let mut out = Mapping::new();
    out.insert(Value::from("description"), Value::from("Mystery"));

    for (setting, value) in settings.iter() {
        if IGNORED.contains(&setting) {
            continue;
        }
        if setting == START_INVENTORY {
            out.insert(Value::from(setting), start_inventory(value));
            continue;
        }
        let name = setting_name(setting);
        out.insert(Value::from(name), option_value(name, value)?);
    }
    Ok(out)
}

pub fn write_web_yaml(settings: &SettingsDocument, path: &Path) -> Result<()> {
    let text = serde_yaml::to_string(&to_web_yaml(settings)?)?;
    fs::write(path, text)?;
    Ok(())
}
