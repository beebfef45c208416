use axon_error::{AxonResult, axon_err};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Parsed view of a `.cfg` file: `[SECTION]` headers opening named sections,
/// `key = value` lines inside them. Keys, values, and bracketed section names
/// are trimmed of surrounding whitespace; lines without an `=` are ignored.
///
/// The parser stores everything as strings; type coercion happens at lookup
/// time through [`Section`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfigParser {
    sections: BTreeMap<String, Section>,
}

impl ConfigParser {
    pub fn from_file(path: impl AsRef<Path>) -> AxonResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&contents))
    }

    pub fn from_str(contents: &str) -> Self {
        let mut sections = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in contents.lines() {
            if let (Some(lead), Some(tail)) = (line.find('['), line.find(']')) {
                if lead < tail {
                    let name = line[lead + 1..tail].trim().to_string();
                    sections.entry(name.clone()).or_insert_with(|| Section {
                        name: name.clone(),
                        entries: BTreeMap::new(),
                    });
                    current = Some(name);
                    continue;
                }
            }

            let Some(pos) = line.find('=') else {
                continue;
            };

            if let Some(section) = current.as_ref().and_then(|name| sections.get_mut(name)) {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().to_string();
                section.entries.insert(key, value);
            }
        }

        ConfigParser { sections }
    }

    /// Look up a section by name, failing with `UnknownSection` when the file
    /// did not declare it.
    pub fn section(&self, name: &str) -> AxonResult<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| axon_err!(UnknownSection: "config does not contain the '{}' section", name))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}

impl Display for ConfigParser {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, section) in &self.sections {
            writeln!(f, "[{}]", name)?;
            for (key, value) in &section.entries {
                writeln!(f, "  - {} : {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// One named section of a parsed config, with type-coerced lookups. A missing
/// key fails with `MissingKey`; a value that does not parse fails with
/// `InvalidValue`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Section {
    name: String,
    entries: BTreeMap<String, String>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_str(&self, key: &str) -> AxonResult<&str> {
        self.entries
            .get(key)
            .map(|value| value.as_str())
            .ok_or_else(|| axon_err!(MissingKey: "'{}' not found in section '{}'", key, self.name))
    }

    pub fn get_f32(&self, key: &str) -> AxonResult<f32> {
        let value = self.get_str(key)?;
        value.parse::<f32>().map_err(
            |_| axon_err!(InvalidValue: "'{}' = '{}' in section '{}' is not a float", key, value, self.name),
        )
    }

    pub fn get_i32(&self, key: &str) -> AxonResult<i32> {
        let value = self.get_str(key)?;
        value.parse::<i32>().map_err(
            |_| axon_err!(InvalidValue: "'{}' = '{}' in section '{}' is not an integer", key, value, self.name),
        )
    }

    /// Accepts case-insensitive `true|false|1|0`.
    pub fn get_bool(&self, key: &str) -> AxonResult<bool> {
        let value = self.get_str(key)?;
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(
                axon_err!(InvalidValue: "'{}' = '{}' in section '{}' is not a bool", key, value, self.name),
            ),
        }
    }

    /// Splits the value on commas and trims each item. Empty items are kept
    /// out of the result.
    pub fn get_str_list(&self, key: &str) -> AxonResult<Vec<String>> {
        let value = self.get_str(key)?;
        Ok(value
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect())
    }
}
