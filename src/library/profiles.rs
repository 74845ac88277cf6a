//! Style profile loading
//!
//! A profile carries a substitution table (roman → allowed substitutes)
//! and a typicality-weight table keyed by exact pattern id or wildcard
//! prefix ("family.*"). Wildcards are precompiled into a
//! longest-prefix-first list at load time so per-call lookup does no
//! string scanning beyond prefix tests.

use std::path::Path;

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::AnalysisError;
use crate::features::matching::SubstitutionTable;

#[derive(Debug, Deserialize)]
struct ProfileLibraryFile {
    profiles: Vec<ProfileSpec>,
}

#[derive(Debug, Deserialize)]
struct ProfileSpec {
    name: String,
    display_name: String,
    enabled: bool,
    #[serde(default)]
    substitutions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    typicality_weights: BTreeMap<String, f32>,
}

/// Precompiled typicality lookup table
#[derive(Debug, Clone, Default)]
pub struct TypicalityTable {
    exact: BTreeMap<String, f32>,
    /// (prefix including the trailing dot, weight), longest prefix first
    wildcards: Vec<(String, f32)>,
}

impl TypicalityTable {
    fn compile(
        raw: &BTreeMap<String, f32>,
        profile_name: &str,
    ) -> Result<Self, AnalysisError> {
        let mut exact = BTreeMap::new();
        let mut wildcards = Vec::new();
        for (key, &weight) in raw {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(AnalysisError::SchemaValidation(format!(
                    "profiles['{}'].typicality_weights['{}']: {} outside [0, 1]",
                    profile_name, key, weight
                )));
            }
            if let Some(stem) = key.strip_suffix(".*") {
                if stem.is_empty() {
                    return Err(AnalysisError::SchemaValidation(format!(
                        "profiles['{}'].typicality_weights['{}']: empty wildcard stem",
                        profile_name, key
                    )));
                }
                wildcards.push((format!("{}.", stem), weight));
            } else {
                exact.insert(key.clone(), weight);
            }
        }
        // Longest prefix wins when wildcards nest ("a.*" vs "a.b.*")
        wildcards.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Ok(Self { exact, wildcards })
    }

    /// Typicality of a pattern id: exact entry, else longest wildcard
    /// prefix, else the neutral default
    pub fn lookup(&self, pattern_id: &str, neutral: f32) -> f32 {
        if let Some(&weight) = self.exact.get(pattern_id) {
            return weight;
        }
        for (prefix, weight) in &self.wildcards {
            if pattern_id.starts_with(prefix.as_str()) {
                return *weight;
            }
        }
        neutral
    }
}

/// One style profile, immutable after load
#[derive(Debug, Clone)]
pub struct Profile {
    /// Internal name (lookup key)
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Disabled profiles are loaded but never auto-selected
    pub enabled: bool,
    /// Allowed substitutions per roman numeral
    pub substitutions: SubstitutionTable,
    /// Typicality weights
    pub typicality: TypicalityTable,
}

/// The loaded profile library
#[derive(Debug, Clone, Default)]
pub struct ProfileLibrary {
    profiles: Vec<Profile>,
}

impl ProfileLibrary {
    /// Load and validate a profile library file
    ///
    /// # Errors
    ///
    /// `AnalysisError::Io` if the file cannot be read,
    /// `AnalysisError::SchemaValidation` on malformed content.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading profile library from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Parse and validate a profile library from JSON text
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        let file: ProfileLibraryFile = serde_json::from_str(text)?;
        let mut profiles = Vec::with_capacity(file.profiles.len());
        for spec in &file.profiles {
            if spec.name.is_empty() {
                return Err(AnalysisError::SchemaValidation(
                    "profiles[].name: must not be empty".to_string(),
                ));
            }
            if profiles.iter().any(|p: &Profile| p.name == spec.name) {
                return Err(AnalysisError::SchemaValidation(format!(
                    "profiles['{}']: duplicate profile name",
                    spec.name
                )));
            }
            profiles.push(Profile {
                name: spec.name.clone(),
                display_name: spec.display_name.clone(),
                enabled: spec.enabled,
                substitutions: spec.substitutions.clone(),
                typicality: TypicalityTable::compile(&spec.typicality_weights, &spec.name)?,
            });
        }
        log::debug!("Loaded {} style profile(s)", profiles.len());
        Ok(Self { profiles })
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// First enabled profile in file order, if any
    pub fn first_enabled(&self) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.enabled)
    }

    /// All loaded profiles
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    /// Enabled profiles only
    pub fn enabled(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(|p| p.enabled)
    }
}
