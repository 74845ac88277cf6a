//! Analysis result types

use std::collections::BTreeMap;

use crate::context::Track;
use crate::features::events::LowLevelEvents;
use crate::features::matching::{Evidence, MatchFailure};

use super::arbitration::ArbitrationResult;

/// Raw and calibrated confidence for one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackScore {
    /// Profile-weighted confidence before calibration
    pub raw: f32,
    /// Confidence after the three-stage calibration transform
    pub calibrated: f32,
}

/// Analysis metadata
#[derive(Debug, Clone)]
pub struct AnalysisMetadata {
    /// Engine version
    pub algorithm_version: String,
    /// Name of the style profile that weighted the evidence, if any
    pub profile: Option<String>,
    /// Harmonic units in the analyzed progression
    pub token_count: usize,
    /// Patterns that passed scope gating and were searched
    pub patterns_evaluated: usize,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f64,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: None,
            token_count: 0,
            patterns_evaluated: 0,
            processing_time_ms: 0.0,
        }
    }
}

/// Complete result of one analysis call
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Per-track raw and calibrated confidences
    pub tracks: BTreeMap<Track, TrackScore>,
    /// All evidence that survived match selection
    pub evidence: Vec<Evidence>,
    /// Windows that matched a sequence but were rejected by a constraint
    pub failures: Vec<MatchFailure>,
    /// The arbitration decision between functional and modal
    pub arbitration: ArbitrationResult,
    /// Low-level events the matcher saw, surfaced for introspection
    pub events: LowLevelEvents,
    /// Call metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Score for one track (absent tracks score zero)
    pub fn track(&self, track: Track) -> TrackScore {
        self.tracks.get(&track).copied().unwrap_or(TrackScore {
            raw: 0.0,
            calibrated: 0.0,
        })
    }
}
