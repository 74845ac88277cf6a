//! Configuration parameters for harmonic analysis

use crate::features::matching::SelectionPolicy;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Event extraction
    /// Minimum chord count for a circle-of-fifths chain (default: 3)
    /// A chain of n chords spans n-1 descending-fifth transitions
    pub min_fifth_chain: usize,

    // Pattern matching
    /// Hard cap on window length; patterns with longer sequences are
    /// skipped regardless of their own declared bounds (default: 8)
    pub max_window: usize,

    /// Match selection policy (default: Existence — report every matching
    /// window, overlaps included)
    pub selection: SelectionPolicy,

    // Confidence aggregation
    /// Per-extra-family diversity bonus rate (default: 0.1)
    /// One evidence family gives multiplier 1.0, three families 1.2
    pub diversity_bonus_rate: f32,

    /// Typicality weight for patterns a profile does not mention (default: 0.5)
    pub neutral_typicality: f32,

    /// Multiplier applied to the focus profile in dominant-style selection
    /// (default: 1.2)
    pub focus_multiplier: f32,

    // Arbitration
    /// Minimum confidence gap for a track to win outright (default: 0.10)
    pub arbitration_margin: f32,

    /// Minimum confidence for a track to be declared primary (default: 0.35)
    pub min_primary: f32,

    /// Allow modal evidence markers to promote modal within the margin band
    /// (default: false)
    pub evidence_override: bool,

    /// Guardband ceiling for the evidence override: modal is never promoted
    /// when functional leads by more than this (default: 0.25)
    pub override_guardband: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_fifth_chain: 3,
            max_window: 8,
            selection: SelectionPolicy::Existence,
            diversity_bonus_rate: 0.1,
            neutral_typicality: 0.5,
            focus_multiplier: 1.2,
            arbitration_margin: 0.10,
            min_primary: 0.35,
            evidence_override: false,
            override_guardband: 0.25,
        }
    }
}
