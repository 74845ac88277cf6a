//! Input data model: tokens, analysis context, and the closed scope/track enums
//!
//! Tokenization itself is a collaborator concern: something upstream turns
//! chord symbols (or roman numerals, or a melody) plus a key context into
//! the shapes defined here. This engine only depends on the shape.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// The kind of input a pattern requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Chord symbols / roman numerals
    Harmonic,
    /// Melodic events
    Melodic,
    /// Scale-note collections
    Scale,
}

/// One of the competing interpretation families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Tonic / predominant / dominant syntax
    Functional,
    /// Modal colour (flat-seven, flat-two, Andalusian motion, ...)
    Modal,
    /// Chromatic / borrowed harmony
    Chromatic,
}

impl Track {
    /// Lowercase name as used in calibration mapping files
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Functional => "functional",
            Track::Modal => "modal",
            Track::Chromatic => "chromatic",
        }
    }
}

/// Functional role of a harmonic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionalRole {
    /// Tonic function
    Tonic,
    /// Predominant function
    Predominant,
    /// Dominant function
    Dominant,
}

/// Mode of a harmonic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

/// One harmonic unit, created once per input chord during tokenization
/// and read-only thereafter
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Roman numeral text (case-sensitive: "V" and "v" are distinct)
    pub roman: String,
    /// Functional role, if the tokenizer assigned one
    pub role: Option<FunctionalRole>,
    /// Qualitative flags ("seventh", "borrowed", "cadential64", ...)
    pub flags: BTreeSet<String>,
    /// Mode, if known
    pub mode: Option<Mode>,
    /// Soprano scale degree ("1".."7", with "b"/"#" prefixes), if known
    pub soprano_degree: Option<String>,
    /// Bass motion from the previous token in semitones; `None` for the
    /// first token
    pub bass_motion_from_prev: Option<i8>,
    /// Target of a secondary function (e.g. "V" for "V/V")
    pub secondary_of: Option<String>,
}

impl Token {
    /// Create a token carrying only a roman numeral
    pub fn new(roman: impl Into<String>) -> Self {
        Self {
            roman: roman.into(),
            role: None,
            flags: BTreeSet::new(),
            mode: None,
            soprano_degree: None,
            bass_motion_from_prev: None,
            secondary_of: None,
        }
    }

    /// Set the functional role
    pub fn with_role(mut self, role: FunctionalRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Add a qualitative flag
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Set the soprano scale degree
    pub fn with_soprano(mut self, degree: impl Into<String>) -> Self {
        self.soprano_degree = Some(degree.into());
        self
    }
}

/// Immutable per-call analysis input
///
/// Parallel arrays describe the same progression from different angles;
/// any of them may be empty, and scope gating in the matcher skips
/// patterns whose required inputs are absent.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    /// Key / tonal center (e.g. "C", "F#", "Bb"); `None` for key-less input
    pub key_center: Option<String>,
    /// Tokenized harmonic units, one per chord
    pub tokens: Vec<Token>,
    /// Chord symbols as written (e.g. "G7", "F#m/A")
    pub chord_symbols: Vec<String>,
    /// Roman numerals, parallel to `chord_symbols` when both are present
    pub romans: Vec<String>,
    /// Melodic events (note names or interval strings)
    pub melody: Vec<String>,
    /// Scale notes, when a scale analysis is requested
    pub scale_notes: Vec<String>,
    /// Free-form metadata ("profile" selects the style profile)
    pub metadata: BTreeMap<String, String>,
}

impl AnalysisContext {
    /// Build a context, enforcing the roman-numerals-require-a-key invariant
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if roman numerals are present
    /// without a key center.
    pub fn new(
        key_center: Option<String>,
        tokens: Vec<Token>,
        chord_symbols: Vec<String>,
        romans: Vec<String>,
    ) -> Result<Self, AnalysisError> {
        if !romans.is_empty() && key_center.is_none() {
            return Err(AnalysisError::InvalidInput(
                "roman numerals require a key context".to_string(),
            ));
        }
        Ok(Self {
            key_center,
            tokens,
            chord_symbols,
            romans,
            ..Self::default()
        })
    }

    /// Convenience constructor for a roman-numeral progression in a key
    ///
    /// Tokens are derived 1:1 from the numerals; flags, roles, and soprano
    /// degrees can be added by the caller afterwards via richer tokens.
    pub fn from_romans(key_center: &str, romans: &[&str]) -> Self {
        Self {
            key_center: Some(key_center.to_string()),
            tokens: romans.iter().map(|r| Token::new(*r)).collect(),
            chord_symbols: Vec::new(),
            romans: romans.iter().map(|r| r.to_string()).collect(),
            melody: Vec::new(),
            scale_notes: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Name of the requested style profile, if any
    pub fn profile_name(&self) -> Option<&str> {
        self.metadata.get("profile").map(|s| s.as_str())
    }

    /// Number of harmonic units in this context
    pub fn len(&self) -> usize {
        self.tokens
            .len()
            .max(self.romans.len())
            .max(self.chord_symbols.len())
    }

    /// True when the context carries no harmonic units at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
