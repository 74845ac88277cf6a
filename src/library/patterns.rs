//! Pattern library loading and schema validation
//!
//! The pattern library is a versioned JSON file of declarative pattern
//! specifications. Loading compiles each specification into the runtime
//! [`Pattern`] form (typed sequence elements, resolved window bounds,
//! closed confidence-function registry). A missing required field, an
//! out-of-enum scope/track value, an ill-formed id, or a weight outside
//! [0, 1] is a fatal validation error naming the offending field.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::context::{Mode, Scope, Track};
use crate::error::AnalysisError;
use crate::features::matching::{
    ConfidenceFn, Constraints, KeyContext, Pattern, PositionConstraint, SequenceElement,
    SequenceKind,
};

/// Default maximum window length when a pattern declares no bounds
pub const DEFAULT_MAX_WINDOW: usize = 8;

#[derive(Debug, Deserialize)]
struct PatternLibraryFile {
    version: u32,
    #[serde(default)]
    #[allow(dead_code)]
    metadata: Option<serde_json::Value>,
    patterns: Vec<PatternSpec>,
}

#[derive(Debug, Deserialize)]
struct PatternSpec {
    id: String,
    name: String,
    scope: Vec<Scope>,
    track: Vec<Track>,
    matchers: MatcherSpec,
    evidence: EvidenceSpec,
    #[serde(default)]
    metadata: Option<PatternMetadataSpec>,
}

#[derive(Debug, Deserialize)]
struct MatcherSpec {
    #[serde(default)]
    roman_seq: Option<Vec<String>>,
    #[serde(default)]
    chord_seq: Option<Vec<String>>,
    #[serde(default)]
    interval_seq: Option<Vec<String>>,
    #[serde(default)]
    scale_degrees: Option<Vec<String>>,
    #[serde(default)]
    mode: Option<Mode>,
    #[serde(default)]
    transposition_invariant: Option<bool>,
    #[serde(default)]
    constraints: Option<ConstraintSpec>,
    #[serde(default)]
    window: Option<WindowSpec>,
}

#[derive(Debug, Deserialize)]
struct ConstraintSpec {
    #[serde(default)]
    soprano_degrees: Option<Vec<String>>,
    #[serde(default)]
    bass_motion: Option<String>,
    #[serde(default)]
    key_context: Option<KeyContext>,
    #[serde(default)]
    position: Option<PositionConstraint>,
}

#[derive(Debug, Deserialize)]
struct WindowSpec {
    #[serde(default)]
    len: Option<usize>,
    #[serde(default)]
    min: Option<usize>,
    #[serde(default)]
    max: Option<usize>,
    #[serde(default)]
    overlap_ok: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct EvidenceSpec {
    weight: f32,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    confidence_fn: Option<String>,
    #[serde(default)]
    uncertainty: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct PatternMetadataSpec {
    #[serde(default)]
    #[allow(dead_code)]
    tags: Vec<String>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    examples: Option<Vec<String>>,
    #[serde(default)]
    #[allow(dead_code)]
    false_positives: Option<Vec<String>>,
    #[serde(default)]
    #[allow(dead_code)]
    references: Option<Vec<String>>,
}

/// The loaded, immutable pattern library
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    /// Library file format version
    pub version: u32,
    /// Compiled patterns, in file order
    pub patterns: Vec<Pattern>,
}

impl PatternLibrary {
    /// Load and validate a pattern library file
    ///
    /// # Errors
    ///
    /// `AnalysisError::Io` if the file cannot be read,
    /// `AnalysisError::SchemaValidation` on any malformed content.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading pattern library from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Parse and validate a pattern library from JSON text
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        let file: PatternLibraryFile = serde_json::from_str(text)?;
        let mut patterns = Vec::with_capacity(file.patterns.len());
        let mut seen_ids = BTreeMap::new();
        for (index, spec) in file.patterns.iter().enumerate() {
            let pattern = compile_pattern(spec, index)?;
            if let Some(previous) = seen_ids.insert(pattern.id.clone(), index) {
                return Err(AnalysisError::SchemaValidation(format!(
                    "patterns[{}].id: '{}' already declared at patterns[{}]",
                    index, pattern.id, previous
                )));
            }
            patterns.push(pattern);
        }
        log::debug!(
            "Loaded pattern library v{} with {} patterns",
            file.version,
            patterns.len()
        );
        Ok(Self {
            version: file.version,
            patterns,
        })
    }

    /// The built-in curated library: common cadences, modal markers, and
    /// chromatic idioms
    ///
    /// Guaranteed to pass the same validation as an external file; an
    /// external library replaces it wholesale.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_LIBRARY_JSON)
            .unwrap_or_else(|e| panic!("built-in pattern library is invalid: {}", e))
    }
}

fn valid_pattern_id(id: &str) -> bool {
    let segments: Vec<&str> = id.split('.').collect();
    segments.len() >= 2
        && segments.iter().all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn compile_pattern(spec: &PatternSpec, index: usize) -> Result<Pattern, AnalysisError> {
    let path = |field: &str| format!("patterns[{}].{}", index, field);

    if !valid_pattern_id(&spec.id) {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: '{}' is not a namespaced id (segments of [A-Za-z0-9_] joined by '.')",
            path("id"),
            spec.id
        )));
    }
    if spec.scope.is_empty() {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: at least one scope is required",
            path("scope")
        )));
    }
    if spec.track.is_empty() {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: at least one track is required",
            path("track")
        )));
    }

    let sequences = [
        (SequenceKind::Roman, &spec.matchers.roman_seq),
        (SequenceKind::Chord, &spec.matchers.chord_seq),
        (SequenceKind::Interval, &spec.matchers.interval_seq),
        (SequenceKind::ScaleDegree, &spec.matchers.scale_degrees),
    ];
    let mut present = sequences
        .iter()
        .filter_map(|(kind, seq)| seq.as_ref().map(|s| (*kind, s)));
    let (kind, raw_elements) = match (present.next(), present.next()) {
        (Some(first), None) => first,
        (None, _) => {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: one of roman_seq/chord_seq/interval_seq/scale_degrees is required",
                path("matchers")
            )));
        }
        (Some(_), Some(_)) => {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: only one sequence kind may be declared",
                path("matchers")
            )));
        }
    };
    if raw_elements.is_empty() {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: sequence must not be empty",
            path("matchers")
        )));
    }

    let elements: Vec<SequenceElement> = raw_elements
        .iter()
        .map(|e| SequenceElement::parse(e))
        .collect();

    let transposition_invariant = spec.matchers.transposition_invariant.unwrap_or(false);
    if transposition_invariant {
        if kind != SequenceKind::Chord {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: transposition_invariant requires chord_seq",
                path("matchers.transposition_invariant")
            )));
        }
        if elements
            .iter()
            .any(|e| !matches!(e, SequenceElement::Exact(_)))
        {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: transposition-invariant sequences allow only plain chord symbols",
                path("matchers.chord_seq")
            )));
        }
    }

    let (min_window, max_window, overlap_ok) = resolve_window(
        spec.matchers.window.as_ref(),
        &path("matchers.window"),
    )?;

    if !spec.evidence.weight.is_finite()
        || !(0.0..=1.0).contains(&spec.evidence.weight)
    {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: {} outside [0, 1]",
            path("evidence.weight"),
            spec.evidence.weight
        )));
    }
    if let Some(u) = spec.evidence.uncertainty {
        if !u.is_finite() || !(0.0..=1.0).contains(&u) {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: {} outside [0, 1]",
                path("evidence.uncertainty"),
                u
            )));
        }
    }
    let confidence_fn = match &spec.evidence.confidence_fn {
        None => ConfidenceFn::Identity,
        Some(name) => ConfidenceFn::by_name(name).ok_or_else(|| {
            AnalysisError::SchemaValidation(format!(
                "{}: unknown confidence function '{}'",
                path("evidence.confidence_fn"),
                name
            ))
        })?,
    };

    let constraints = match &spec.matchers.constraints {
        None => Constraints::default(),
        Some(c) => Constraints {
            soprano_degrees: c.soprano_degrees.clone(),
            bass_motion: c.bass_motion.clone(),
            key_context: c.key_context,
            position: c.position,
        },
    };

    // Safe: id validation guarantees a dot
    let family = spec.id.split('.').next().unwrap_or(&spec.id).to_string();

    Ok(Pattern {
        id: spec.id.clone(),
        family,
        name: spec.name.clone(),
        scopes: spec.scope.clone(),
        tracks: spec.track.clone(),
        kind,
        elements,
        mode: spec.matchers.mode,
        transposition_invariant,
        min_window,
        max_window,
        overlap_ok,
        constraints,
        weight: spec.evidence.weight,
        features: spec.evidence.features.clone().unwrap_or_default(),
        confidence_fn,
        uncertainty: spec.evidence.uncertainty,
        priority: spec
            .metadata
            .as_ref()
            .and_then(|m| m.priority)
            .unwrap_or(0),
    })
}

fn resolve_window(
    window: Option<&WindowSpec>,
    field_path: &str,
) -> Result<(usize, usize, bool), AnalysisError> {
    let Some(w) = window else {
        return Ok((1, DEFAULT_MAX_WINDOW, true));
    };
    let overlap_ok = w.overlap_ok.unwrap_or(true);
    if let Some(len) = w.len {
        if len == 0 {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}.len: must be at least 1",
                field_path
            )));
        }
        if w.min.is_some() || w.max.is_some() {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}: len cannot be combined with min/max",
                field_path
            )));
        }
        return Ok((len, len, overlap_ok));
    }
    let min = w.min.unwrap_or(1);
    let max = w.max.unwrap_or(DEFAULT_MAX_WINDOW);
    if min == 0 {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}.min: must be at least 1",
            field_path
        )));
    }
    if min > max {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}: min {} exceeds max {}",
            field_path, min, max
        )));
    }
    Ok((min, max, overlap_ok))
}

/// The curated built-in library (also the reference example of the file
/// format)
const BUILTIN_LIBRARY_JSON: &str = r#"{
  "version": 1,
  "metadata": {"name": "builtin", "description": "Curated cadence, modal, and chromatic patterns"},
  "patterns": [
    {
      "id": "cadence.authentic",
      "name": "Authentic cadence",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {
        "roman_seq": ["V|V7|V65|V43|V42", "I|i"],
        "constraints": {"key_context": "diatonic"}
      },
      "evidence": {"weight": 0.9},
      "metadata": {"tags": ["cadence"], "priority": 10, "description": "Dominant resolving to tonic"}
    },
    {
      "id": "cadence.authentic_perfect",
      "name": "Perfect authentic cadence",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {
        "roman_seq": ["V|V7", "I|i"],
        "constraints": {"soprano_degrees": ["1"], "position": "end"}
      },
      "evidence": {"weight": 0.95},
      "metadata": {"tags": ["cadence"], "priority": 12}
    },
    {
      "id": "cadence.half",
      "name": "Half cadence",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {
        "roman_seq": ["*", "V|V7"],
        "constraints": {"position": "end"}
      },
      "evidence": {"weight": 0.5},
      "metadata": {"tags": ["cadence"], "priority": 5}
    },
    {
      "id": "cadence.plagal",
      "name": "Plagal cadence",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {"roman_seq": ["IV|iv", "I|i"]},
      "evidence": {"weight": 0.6},
      "metadata": {"tags": ["cadence"], "priority": 6}
    },
    {
      "id": "cadence.deceptive",
      "name": "Deceptive cadence",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {"roman_seq": ["V|V7", "vi|VI"]},
      "evidence": {"weight": 0.65},
      "metadata": {"tags": ["cadence"], "priority": 6}
    },
    {
      "id": "cadence.backdoor",
      "name": "Backdoor cadence",
      "scope": ["harmonic"],
      "track": ["modal"],
      "matchers": {"roman_seq": ["bVII|bVII7", "I|Imaj7"]},
      "evidence": {"weight": 0.7, "features": ["modal_marker"]},
      "metadata": {"tags": ["cadence", "modal"], "priority": 7}
    },
    {
      "id": "function.full_phrase",
      "name": "Tonic-predominant-dominant-tonic phrase",
      "scope": ["harmonic"],
      "track": ["functional"],
      "matchers": {"roman_seq": ["I|i", "IV|iv|ii|ii65", "V|V7", "I|i"]},
      "evidence": {"weight": 0.8, "confidence_fn": "coverage"},
      "metadata": {"tags": ["phrase"], "priority": 8}
    },
    {
      "id": "function.secondary_dominant",
      "name": "Secondary dominant",
      "scope": ["harmonic"],
      "track": ["functional", "chromatic"],
      "matchers": {"roman_seq": ["V/*"]},
      "evidence": {"weight": 0.55},
      "metadata": {"tags": ["chromatic"], "priority": 4}
    },
    {
      "id": "modal.flat_seven",
      "name": "Flat-seven chord",
      "scope": ["harmonic"],
      "track": ["modal"],
      "matchers": {"roman_seq": ["bVII|bVII7|♭VII"]},
      "evidence": {"weight": 0.7, "features": ["modal_marker"]},
      "metadata": {"tags": ["modal"], "priority": 7, "description": "Mixolydian / borrowed flat-seven"}
    },
    {
      "id": "modal.flat_two",
      "name": "Flat-two chord",
      "scope": ["harmonic"],
      "track": ["modal", "chromatic"],
      "matchers": {"roman_seq": ["bII|♭II|bII7"]},
      "evidence": {"weight": 0.65, "features": ["modal_marker"]},
      "metadata": {"tags": ["modal", "phrygian"], "priority": 7}
    },
    {
      "id": "modal.andalusian",
      "name": "Andalusian cadence",
      "scope": ["harmonic"],
      "track": ["modal"],
      "matchers": {"roman_seq": ["i", "bVII", "bVI", "V"]},
      "evidence": {"weight": 0.85, "features": ["modal_marker"]},
      "metadata": {"tags": ["cadence", "modal"], "priority": 9}
    },
    {
      "id": "modal.dorian_four",
      "name": "Dorian major four",
      "scope": ["harmonic"],
      "track": ["modal"],
      "matchers": {"roman_seq": ["i", "IV"]},
      "evidence": {"weight": 0.6, "features": ["modal_marker"]},
      "metadata": {"tags": ["modal", "dorian"], "priority": 5}
    },
    {
      "id": "chromatic.neapolitan",
      "name": "Neapolitan sixth",
      "scope": ["harmonic"],
      "track": ["chromatic"],
      "matchers": {"roman_seq": ["N6|bII6", "V|V7"]},
      "evidence": {"weight": 0.7},
      "metadata": {"tags": ["chromatic"], "priority": 7}
    },
    {
      "id": "chromatic.augmented_sixth",
      "name": "Augmented sixth resolution",
      "scope": ["harmonic"],
      "track": ["chromatic"],
      "matchers": {"roman_seq": ["It6|Ger65|Fr43", "V|V7"]},
      "evidence": {"weight": 0.7},
      "metadata": {"tags": ["chromatic"], "priority": 7}
    }
  ]
}"#;
