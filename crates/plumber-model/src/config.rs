//! INI-backed configuration model.
//!
//! Files use the classic `[section]` / `key = value` layout. Section and key
//! names are folded to lowercase by the syntax layer, so lookups here are
//! case-insensitive. After the raw read, three passes run in order:
//!
//! 1. `${section:key}` references (or `${key}` within the same section) are
//!    resolved textually against the raw string map;
//! 2. values containing a comma are split into trimmed, non-empty pieces;
//! 3. every scalar or list element is coerced to its typed form.
//!
//! The result is immutable; consumers hold a `&Config` and use the typed
//! lookups below.

use std::collections::BTreeMap;
use std::path::Path;

use configparser::ini::Ini;
use serde::{Deserialize, Serialize};

use crate::coerce::coerce;
use crate::error::{ConfigError, Result};
use crate::value::ConfigValue;

/// Upper bound on reference-resolution passes. Anything still unresolved
/// after this many rounds is cyclic.
const MAX_REFERENCE_PASSES: usize = 8;

type RawSections = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// A parsed configuration: section name -> key -> typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, ConfigValue>>,
}

impl Config {
    /// A configuration with no sections at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read and parse a configuration file.
    pub fn parse(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text, path)
    }

    /// Parse configuration text; `origin` is only used in error messages.
    pub fn parse_str(text: &str, origin: &Path) -> Result<Self> {
        let mut ini = Ini::new();
        let raw = ini
            .read(text.to_string())
            .map_err(|message| ConfigError::Syntax {
                path: origin.to_path_buf(),
                message,
            })?;
        let mut raw: RawSections = raw
            .into_iter()
            .map(|(section, keys)| (section, keys.into_iter().collect()))
            .collect();
        resolve_references(&mut raw)?;

        let mut sections = BTreeMap::new();
        for (section, keys) in raw {
            let mut typed = BTreeMap::new();
            for (key, value) in keys {
                typed.insert(key, typed_value(value.as_deref()));
            }
            sections.insert(section, typed);
        }
        Ok(Self { sections })
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.sections
            .get(&section.to_lowercase())?
            .get(&key.to_lowercase())
    }

    /// Like [`Config::get`], but a missing section or key is an error that
    /// names what was being looked up.
    pub fn require(&self, section: &str, key: &str) -> Result<&ConfigValue> {
        let keys =
            self.sections
                .get(&section.to_lowercase())
                .ok_or_else(|| ConfigError::MissingSection {
                    section: section.to_string(),
                })?;
        keys.get(&key.to_lowercase())
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, ConfigValue>> {
        self.sections.get(&name.to_lowercase())
    }

    pub fn sections(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, ConfigValue>)> {
        self.sections.iter()
    }

    /// Required key read as a list of strings (a scalar counts as a
    /// one-element list).
    pub fn str_list(&self, section: &str, key: &str) -> Result<Vec<String>> {
        Ok(self.require(section, key)?.as_str_list())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn typed_value(raw: Option<&str>) -> ConfigValue {
    let Some(raw) = raw else {
        return ConfigValue::Null;
    };
    if raw.contains(',') {
        let items: Vec<ConfigValue> = raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(coerce)
            .collect();
        ConfigValue::List(items)
    } else {
        coerce(raw)
    }
}

/// Resolve `${...}` references in place. Unknown targets fail immediately;
/// references that survive every pass are cyclic and fail afterwards.
fn resolve_references(raw: &mut RawSections) -> Result<()> {
    for _ in 0..MAX_REFERENCE_PASSES {
        let snapshot = raw.clone();
        let mut changed = false;
        for (section, keys) in raw.iter_mut() {
            for (key, slot) in keys.iter_mut() {
                let Some(value) = slot.as_deref() else {
                    continue;
                };
                if !value.contains("${") {
                    continue;
                }
                let rewritten = substitute(value, section, &snapshot).map_err(|reference| {
                    ConfigError::Interpolation {
                        section: section.clone(),
                        key: key.clone(),
                        reference,
                    }
                })?;
                if rewritten != *value {
                    *slot = Some(rewritten);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    for (section, keys) in raw.iter() {
        for (key, slot) in keys {
            if let Some(value) = slot.as_deref()
                && let Some(reference) = first_reference(value)
            {
                return Err(ConfigError::Interpolation {
                    section: section.clone(),
                    key: key.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Expand every `${section:key}` (or same-section `${key}`) reference in
/// `value` using the raw string map. Returns the offending reference text on
/// failure.
fn substitute(
    value: &str,
    current_section: &str,
    raw: &RawSections,
) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find('}') else {
            return Err(tail.to_string());
        };
        let reference = &tail[..end];
        let (section, key) = match reference.split_once(':') {
            Some((section, key)) => (section.trim().to_lowercase(), key.trim().to_lowercase()),
            None => (
                current_section.to_string(),
                reference.trim().to_lowercase(),
            ),
        };
        match raw
            .get(&section)
            .and_then(|keys| keys.get(&key))
            .and_then(|slot| slot.as_deref())
        {
            Some(text) => out.push_str(text),
            None => return Err(reference.to_string()),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn first_reference(value: &str) -> Option<&str> {
    let start = value.find("${")?;
    let tail = &value[start + 2..];
    match tail.find('}') {
        Some(end) => Some(&tail[..end]),
        None => Some(tail),
    }
}
