/*
 * Master preference definitions and the local override table a workspace
 * fills. The rest of the application looks preferences up through
 * `PreferenceTable::value`, which prefers an override over the declared
 * default.
 */
use crate::core::models::{PreferenceEntry, PreferenceValue};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceDefinition {
    pub default: PreferenceValue,
    // Only workspace-relevant preferences are written into workspace documents.
    pub workspace_relevant: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PreferenceTable {
    definitions: BTreeMap<String, PreferenceDefinition>,
    overrides: HashMap<String, PreferenceValue>,
}

impl PreferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, default: PreferenceValue, workspace_relevant: bool) {
        self.definitions.insert(
            name.to_string(),
            PreferenceDefinition {
                default,
                workspace_relevant,
            },
        );
    }

    pub fn default_value(&self, name: &str) -> Option<&PreferenceValue> {
        self.definitions.get(name).map(|d| &d.default)
    }

    pub fn value(&self, name: &str) -> Option<&PreferenceValue> {
        self.overrides.get(name).or_else(|| self.default_value(name))
    }

    pub fn override_value(&self, name: &str) -> Option<&PreferenceValue> {
        self.overrides.get(name)
    }

    pub fn overrides(&self) -> &HashMap<String, PreferenceValue> {
        &self.overrides
    }

    /*
     * Sets a local override. Rejected (returns false) when the preference is
     * unknown or the value's type differs from the declared default's.
     */
    pub fn set_override(&mut self, name: &str, value: PreferenceValue) -> bool {
        match self.default_value(name) {
            Some(default) if default.same_type(&value) => {
                self.overrides.insert(name.to_string(), value);
                true
            }
            Some(_) => {
                log::warn!("PreferenceTable: Type mismatch for override of '{name}'");
                false
            }
            None => {
                log::warn!("PreferenceTable: Unknown preference '{name}'");
                false
            }
        }
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    // Effective values of the workspace-relevant preferences, in name order.
    pub fn workspace_entries(&self) -> Vec<PreferenceEntry> {
        self.definitions
            .iter()
            .filter(|(_, def)| def.workspace_relevant)
            .map(|(name, def)| {
                let value = self.overrides.get(name).unwrap_or(&def.default);
                PreferenceEntry {
                    name: name.clone(),
                    text: value.to_xml_text(),
                }
            })
            .collect()
    }

    /*
     * Replaces the override table with the typed form of `entries`. Each entry
     * is typed by its declared default; entries that are unknown or do not
     * parse are logged and skipped without affecting the others. Returns the
     * number of overrides applied.
     */
    pub fn apply_entries(&mut self, entries: &[PreferenceEntry]) -> usize {
        self.overrides.clear();
        let mut applied = 0;
        for entry in entries {
            let Some(default) = self.default_value(&entry.name) else {
                log::warn!(
                    "PreferenceTable: Preference '{}' has no declared type, skipped.",
                    entry.name
                );
                continue;
            };
            match default.parse_like(&entry.text) {
                Ok(value) => {
                    self.overrides.insert(entry.name.clone(), value);
                    applied += 1;
                }
                Err(e) => {
                    log::warn!("PreferenceTable: Skipping preference '{}': {e}", entry.name);
                }
            }
        }
        applied
    }
}
