//! Declarative pattern matching
//!
//! Searches token-stream windows against compiled pattern specifications
//! and emits raw evidence. Matching is brute force over all candidate
//! windows — the sequences in this domain are short (≤ ~16 elements), so
//! the O(windows × patterns) search is deliberate simplicity, not an
//! oversight.

pub mod constraints;
pub mod element;
pub mod selection;
pub mod window;

pub use element::{SequenceElement, SubstitutionTable};
pub use selection::best_cover;
pub use window::{applies, match_pattern};

use crate::context::{Mode, Scope, Track};

/// Which parallel array of the context a pattern sequence reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Roman numerals
    Roman,
    /// Chord symbols as written
    Chord,
    /// Melodic interval events
    Interval,
    /// Scale-degree / scale-note sequence
    ScaleDegree,
}

/// Key-context constraint on a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyContext {
    /// Key present and every window token diatonic
    Diatonic,
    /// At least one chromatic (borrowed / altered) token in the window
    Chromatic,
}

/// Positional constraint on a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionConstraint {
    /// Window must begin the progression
    Start,
    /// Window must close the progression
    End,
}

/// Compiled constraint set of one pattern
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// The window's final soprano degree must be in this set
    pub soprano_degrees: Option<Vec<String>>,
    /// Root-motion label required going into the window's final chord
    pub bass_motion: Option<String>,
    /// Diatonic / chromatic key-context requirement
    pub key_context: Option<KeyContext>,
    /// Start / end position requirement
    pub position: Option<PositionConstraint>,
}

impl Constraints {
    /// True when no constraint is declared
    pub fn is_empty(&self) -> bool {
        self.soprano_degrees.is_none()
            && self.bass_motion.is_none()
            && self.key_context.is_none()
            && self.position.is_none()
    }
}

/// Named confidence function applied to a match before weighting
///
/// The registry is closed: pattern files naming anything else are
/// rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceFn {
    /// Score is the pattern weight unchanged (the default)
    #[default]
    Identity,
    /// Weight scaled by the fraction of the progression the match covers
    Coverage,
}

impl ConfidenceFn {
    /// Look up a confidence function by its pattern-file name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(ConfidenceFn::Identity),
            "coverage" => Some(ConfidenceFn::Coverage),
            _ => None,
        }
    }

    /// Evaluate for a match spanning `[start, end)` of a progression of
    /// `total` units
    pub fn evaluate(&self, start: usize, end: usize, total: usize) -> f32 {
        match self {
            ConfidenceFn::Identity => 1.0,
            ConfidenceFn::Coverage => {
                if total == 0 {
                    0.0
                } else {
                    (end - start) as f32 / total as f32
                }
            }
        }
    }
}

/// One compiled, immutable pattern from the library
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Namespaced identifier, e.g. "cadence.authentic"
    pub id: String,
    /// Evidence family: the id segment before the first dot
    pub family: String,
    /// Human-readable name
    pub name: String,
    /// Required input scopes; all must be present for the pattern to apply
    pub scopes: Vec<Scope>,
    /// Interpretation tracks this pattern supports
    pub tracks: Vec<Track>,
    /// Which context array the sequence reads
    pub kind: SequenceKind,
    /// Compiled per-position elements
    pub elements: Vec<SequenceElement>,
    /// Mode the window's tokens must agree with, when declared
    pub mode: Option<Mode>,
    /// Chord sequences match by root-interval shape instead of exact
    /// symbols (chord-kind patterns only)
    pub transposition_invariant: bool,
    /// Minimum admissible window length
    pub min_window: usize,
    /// Maximum admissible window length
    pub max_window: usize,
    /// Whether overlapping windows of this pattern may all be reported
    pub overlap_ok: bool,
    /// Declared constraints
    pub constraints: Constraints,
    /// Evidence weight in [0, 1]
    pub weight: f32,
    /// Feature names attached to emitted evidence
    pub features: Vec<String>,
    /// Confidence function applied before weighting
    pub confidence_fn: ConfidenceFn,
    /// Optional per-pattern uncertainty annotation (advisory, carried
    /// through to evidence consumers)
    pub uncertainty: Option<f32>,
    /// Priority for tie-breaking in best-cover selection
    pub priority: i32,
}

/// Raw evidence from one successful pattern match
///
/// Transient: created per analysis call and discarded after aggregation.
#[derive(Debug, Clone)]
pub struct Evidence {
    /// Id of the matching pattern
    pub pattern_id: String,
    /// Evidence family of the pattern
    pub family: String,
    /// Tracks the pattern supports
    pub tracks: Vec<Track>,
    /// Matched window start (inclusive)
    pub start: usize,
    /// Matched window end (exclusive)
    pub end: usize,
    /// Raw score: pattern weight × confidence function
    pub raw_score: f32,
    /// Feature names declared by the pattern
    pub features: Vec<String>,
    /// Source pattern's priority, used in selection tie-breaks
    pub priority: i32,
}

/// Structured account of why a window did not match
///
/// Failures are informational, never errors: they exist so a caller can
/// see how close a pattern came and which constraint rejected it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchFailure {
    /// Id of the pattern that was tested
    pub pattern_id: String,
    /// Window start (inclusive)
    pub start: usize,
    /// Window end (exclusive)
    pub end: usize,
    /// Short machine-readable reason ("sequence", "soprano_degrees", ...)
    pub reason: String,
    /// Human-readable diagnostic detail
    pub detail: String,
}

/// Match selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Report every matching window, overlaps included (the default)
    #[default]
    Existence,
    /// Greedily keep non-overlapping, highest-scoring matches per region
    BestCover,
}
