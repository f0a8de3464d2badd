use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::Result;

/// How a drawn option identifier is stored in the document.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Coerce {
    /// `on`/`off` become a 0/1 toggle; anything else is kept as a choice.
    OnOff,
    /// Keep the identifier as-is, even when it is `on`/`off`.
    Verbatim,
}

/// A single value of the generated settings document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum SettingValue {
    /// Drawn `on`/`off` option, written out as `0`/`1`.
    Toggle(bool),
    Choice(String),
    Count(i64),
    /// Anything else the defaults document carries, passed through.
    Raw(serde_json::Value),
}

impl SettingValue {
    pub fn choice(value: impl Into<String>) -> Self {
        SettingValue::Choice(value.into())
    }

    pub fn from_drawn(option: &str, coerce: Coerce) -> Self {
        match (coerce, option) {
            (Coerce::OnOff, "on") => SettingValue::Toggle(true),
            (Coerce::OnOff, "off") => SettingValue::Toggle(false),
            _ => SettingValue::Choice(option.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Choice(text) => Some(text),
            SettingValue::Raw(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Count(n) => Some(*n),
            _ => self.as_str()?.trim().parse().ok(),
        }
    }

    /// Value as on/off when it is toggle-like. JSON booleans from the
    /// defaults document count too.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            SettingValue::Toggle(on) => Some(*on),
            SettingValue::Raw(serde_json::Value::Bool(on)) => Some(*on),
            SettingValue::Count(0) => Some(false),
            SettingValue::Count(1) => Some(true),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for SettingValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => SettingValue::Choice(text),
            serde_json::Value::Number(ref number) => match number.as_i64() {
                Some(n) => SettingValue::Count(n),
                None => SettingValue::Raw(value),
            },
            other => SettingValue::Raw(other),
        }
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SettingValue::Toggle(on) => serializer.serialize_i64(i64::from(*on)),
            SettingValue::Choice(text) => serializer.serialize_str(text),
            SettingValue::Count(n) => serializer.serialize_i64(*n),
            SettingValue::Raw(value) => value.serialize(serializer),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Toggle(on) => write!(f, "{}", i64::from(*on)),
            SettingValue::Choice(text) => f.write_str(text),
            SettingValue::Count(n) => write!(f, "{n}"),
            SettingValue::Raw(value) => write!(f, "{value}"),
        }
    }
}

/// The settings document under construction for one attempt.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument {
    values: BTreeMap<String, SettingValue>,
}

impl SettingsDocument {
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

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn get(&self, setting: &str) -> Option<&SettingValue> {
        self.values.get(setting)
    }

    pub fn set(&mut self, setting: &str, value: SettingValue) {
        self.values.insert(setting.to_string(), value);
    }

    pub fn remove(&mut self, setting: &str) -> Option<SettingValue> {
        self.values.remove(setting)
    }

    pub fn contains(&self, setting: &str) -> bool {
        self.values.contains_key(setting)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn text(&self, setting: &str) -> Option<&str> {
        self.get(setting).and_then(SettingValue::as_str)
    }

    /// True when `setting` holds the choice `option`. Absent settings match
    /// nothing.
    pub fn is(&self, setting: &str, option: &str) -> bool {
        self.text(setting) == Some(option)
    }

    pub fn is_any(&self, setting: &str, options: &[&str]) -> bool {
        options.iter().any(|option| self.is(setting, option))
    }

    pub fn is_on(&self, setting: &str) -> bool {
        self.get(setting).and_then(SettingValue::as_flag) == Some(true)
    }

    pub fn is_off(&self, setting: &str) -> bool {
        self.get(setting).and_then(SettingValue::as_flag) == Some(false)
    }

    /// Whether the choice string of `setting` contains `flag`, as used by the
    /// compound `wild_dungeon_items` value.
    pub fn has_flag(&self, setting: &str, flag: char) -> bool {
        self.text(setting).is_some_and(|text| text.contains(flag))
    }
}
