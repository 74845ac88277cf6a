//! # Cadenza
//!
//! A harmonic pattern analysis engine. Classifies short symbolic
//! chord/roman-numeral progressions into competing music-theoretic
//! interpretations — functional vs. modal, with cadence and pattern
//! labels — and assigns each a calibrated confidence.
//!
//! ## Features
//!
//! - **Event extraction**: bass motion, pedal points, circle-of-fifths
//!   chains, and voice-leading idioms derived from the token stream
//! - **Pattern matching**: a declarative library of sequence + constraint
//!   specifications searched over token-stream windows
//! - **Style confidence**: typicality-weighted evidence aggregation with
//!   an evidence-family diversity bonus
//! - **Calibration**: Platt scaling, isotonic interpolation, and
//!   uncertainty shrinkage against externally trained parameters
//! - **Arbitration**: margin-based choice of the primary interpretation
//!   with an explained decision
//!
//! ## Quick Start
//!
//! ```
//! use cadenza::{Analyzer, AnalysisConfig, AnalysisContext, Track};
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default());
//! let context = AnalysisContext::from_romans("C", &["I", "IV", "V7", "I"]);
//!
//! let result = analyzer.analyze(&context)?;
//!
//! println!("Primary: {:?} ({})", result.arbitration.primary, result.arbitration.reasoning);
//! println!("Functional: {:.2}", result.track(Track::Functional).calibrated);
//! # Ok::<(), cadenza::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Token Stream → Event Extraction → Pattern Matching → Style Confidence
//!              → Calibration → Arbitration → Output
//! ```
//!
//! All analysis is synchronous and stateless per call: the pattern
//! library, style profiles, and calibration mapping are loaded once and
//! are read-only afterwards, so concurrent calls from multiple threads
//! are safe by construction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod library;

// Re-export main types
pub use analysis::arbitration::{ArbitrationResult, ArbitrationRule};
pub use analysis::calibration::{BucketRouter, CalibrationService, RoutingFeatures, ThresholdRouter};
pub use analysis::result::{AnalysisMetadata, AnalysisResult, TrackScore};
pub use config::AnalysisConfig;
pub use context::{AnalysisContext, FunctionalRole, Mode, Scope, Token, Track};
pub use error::AnalysisError;
pub use features::events::LowLevelEvents;
pub use features::matching::{Evidence, MatchFailure, Pattern, SelectionPolicy};
pub use library::{CalibrationMapping, PatternLibrary, Profile, ProfileLibrary};

use std::collections::BTreeMap;

use analysis::result::TrackScore as Score;
use features::matching;

/// The analysis engine: immutable configuration plus loaded libraries
///
/// Construct once at startup, then call [`analyze`](Analyzer::analyze)
/// from as many threads as you like — every call allocates its own
/// working state.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    patterns: PatternLibrary,
    profiles: ProfileLibrary,
    calibration: CalibrationService,
}

impl Analyzer {
    /// Engine with the built-in pattern library, no style profiles, and
    /// pass-through calibration
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            patterns: PatternLibrary::builtin(),
            profiles: ProfileLibrary::default(),
            calibration: CalibrationService::pass_through(),
        }
    }

    /// Replace the pattern library
    pub fn with_pattern_library(mut self, patterns: PatternLibrary) -> Self {
        self.patterns = patterns;
        self
    }

    /// Install style profiles
    pub fn with_profiles(mut self, profiles: ProfileLibrary) -> Self {
        self.profiles = profiles;
        self
    }

    /// Install a calibration service
    pub fn with_calibration(mut self, calibration: CalibrationService) -> Self {
        self.calibration = calibration;
        self
    }

    /// The loaded pattern library
    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    /// The style profile that will weight evidence for a context
    fn resolve_profile(&self, context: &AnalysisContext) -> Option<&Profile> {
        match context.profile_name() {
            Some(name) => {
                let profile = self.profiles.get(name);
                if profile.is_none() {
                    log::warn!("Unknown style profile '{}', using neutral typicality", name);
                }
                profile
            }
            None => self.profiles.first_enabled(),
        }
    }

    /// Analyze one progression
    ///
    /// Runs the full pipeline: event extraction, pattern matching, style
    /// confidence per track, calibration, and arbitration. An empty
    /// context is not an error — it produces zero evidence, zero
    /// confidences, and a low-certainty arbitration.
    ///
    /// # Errors
    ///
    /// Calibration of a non-finite raw confidence returns
    /// `AnalysisError::InvalidInput`; raw confidences produced by this
    /// pipeline are always finite, so in practice `analyze` fails only
    /// if a custom calibration router misbehaves.
    pub fn analyze(&self, context: &AnalysisContext) -> Result<AnalysisResult, AnalysisError> {
        use std::time::Instant;
        let start_time = Instant::now();

        log::debug!(
            "Starting analysis: {} units, key={:?}, profile={:?}",
            context.len(),
            context.key_center,
            context.profile_name()
        );

        // Step 1: low-level events
        let events = features::events::extract_events(
            &context.tokens,
            &context.chord_symbols,
            context.key_center.as_deref(),
            self.config.min_fifth_chain,
        );

        // Step 2: pattern matching
        let profile = self.resolve_profile(context);
        let substitutions = profile.map(|p| &p.substitutions);
        let mut evidence = Vec::new();
        let mut failures = Vec::new();
        let mut patterns_evaluated = 0usize;
        for pattern in &self.patterns.patterns {
            if !matching::applies(pattern, context) {
                continue;
            }
            if pattern.elements.len() > self.config.max_window {
                log::debug!(
                    "Skipping pattern '{}': {} elements exceeds the window cap",
                    pattern.id,
                    pattern.elements.len()
                );
                continue;
            }
            patterns_evaluated += 1;
            let (mut found, mut rejected) =
                matching::match_pattern(pattern, context, &events, substitutions);
            if !pattern.overlap_ok {
                found = matching::best_cover(found);
            }
            evidence.append(&mut found);
            failures.append(&mut rejected);
        }
        if self.config.selection == SelectionPolicy::BestCover {
            evidence = matching::best_cover(evidence);
        }
        log::debug!(
            "Matched {} evidence item(s) from {} pattern(s) ({} constrained window(s) rejected)",
            evidence.len(),
            patterns_evaluated,
            failures.len()
        );

        // Step 3: per-track raw confidence
        let mut tracks = BTreeMap::new();
        let mut raw = BTreeMap::new();
        for track in [Track::Functional, Track::Modal, Track::Chromatic] {
            let track_evidence: Vec<Evidence> = evidence
                .iter()
                .filter(|e| e.tracks.contains(&track))
                .cloned()
                .collect();
            raw.insert(
                track,
                analysis::confidence::calculate_confidence(&track_evidence, profile, &self.config),
            );
        }

        // Step 4: calibration
        let routing = self.routing_features(context, &evidence);
        for track in [Track::Functional, Track::Modal, Track::Chromatic] {
            let raw_score = raw[&track];
            let calibrated = self.calibration.calibrate(raw_score, track, &routing)?;
            tracks.insert(
                track,
                Score {
                    raw: raw_score,
                    calibrated,
                },
            );
        }

        // Step 5: arbitration between functional and modal
        let arbitration = analysis::arbitration::decide(
            tracks[&Track::Functional].calibrated,
            tracks[&Track::Modal].calibrated,
            &evidence,
            &self.config,
        );
        log::debug!("Arbitration: {}", arbitration.reasoning);

        let metadata = AnalysisMetadata {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: profile.map(|p| p.name.clone()),
            token_count: context.len(),
            patterns_evaluated,
            processing_time_ms: start_time.elapsed().as_secs_f64() * 1000.0,
        };

        Ok(AnalysisResult {
            tracks,
            evidence,
            failures,
            arbitration,
            events,
            metadata,
        })
    }

    /// Routing features for calibration bucket selection
    fn routing_features(
        &self,
        context: &AnalysisContext,
        evidence: &[Evidence],
    ) -> RoutingFeatures {
        let total = context.len();
        let chromatic = (0..total)
            .filter(|&i| features::matching::constraints::is_chromatic_at(context, i))
            .count();
        RoutingFeatures {
            modal_marker_count: analysis::arbitration::modal_marker_count(evidence),
            chromatic_ratio: if total == 0 {
                0.0
            } else {
                chromatic as f32 / total as f32
            },
            token_count: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_empty_context() {
        let analyzer = Analyzer::new(AnalysisConfig::default());
        let result = analyzer.analyze(&AnalysisContext::default()).unwrap();
        assert!(result.evidence.is_empty());
        assert_eq!(result.track(Track::Functional).raw, 0.0);
        assert!(result.arbitration.low_certainty);
        assert!(!result.arbitration.reasoning.is_empty());
    }

    #[test]
    fn test_authentic_cadence_is_functional() {
        let analyzer = Analyzer::new(AnalysisConfig::default());
        let context = AnalysisContext::from_romans("C", &["V7", "I"]);
        let result = analyzer.analyze(&context).unwrap();

        // A cadence-family pattern matched with a strong raw score
        assert!(result
            .evidence
            .iter()
            .any(|e| e.family == "cadence" && e.raw_score > 0.5));
        let functional = result.track(Track::Functional);
        let modal = result.track(Track::Modal);
        assert!(functional.calibrated > modal.calibrated);
        assert_eq!(result.arbitration.primary, Track::Functional);
    }

    #[test]
    fn test_andalusian_is_modal_under_modal_profile() {
        let profiles = ProfileLibrary::from_json(
            r#"{"profiles": [{
                "name": "modal_folk", "display_name": "Modal / folk", "enabled": true,
                "typicality_weights": {"modal.*": 0.9, "cadence.*": 0.3}
            }]}"#,
        )
        .unwrap();
        let analyzer = Analyzer::new(AnalysisConfig::default()).with_profiles(profiles);
        let context = AnalysisContext::from_romans("A", &["i", "bVII", "bVI", "V"]);
        let result = analyzer.analyze(&context).unwrap();

        assert!(result.evidence.iter().any(|e| e.pattern_id == "modal.andalusian"));
        let functional = result.track(Track::Functional);
        let modal = result.track(Track::Modal);
        assert!(modal.raw > functional.raw);
        assert_eq!(result.arbitration.primary, Track::Modal);
        assert_eq!(result.metadata.profile.as_deref(), Some("modal_folk"));
    }

    #[test]
    fn test_events_surfaced_on_result() {
        let analyzer = Analyzer::new(AnalysisConfig::default());
        let mut context = AnalysisContext::from_romans("C", &["vi", "ii", "V", "I"]);
        context.chord_symbols = ["Am", "Dm", "G", "C"].iter().map(|s| s.to_string()).collect();
        let result = analyzer.analyze(&context).unwrap();
        assert_eq!(result.events.root_motion.len(), 4);
        assert_eq!(result.events.fifth_chains.len(), 1);
    }

    #[test]
    fn test_metadata_populated() {
        let analyzer = Analyzer::new(AnalysisConfig::default());
        let context = AnalysisContext::from_romans("C", &["V", "I"]);
        let result = analyzer.analyze(&context).unwrap();
        assert_eq!(result.metadata.token_count, 2);
        assert!(result.metadata.patterns_evaluated > 0);
        assert!(result.metadata.processing_time_ms >= 0.0);
        assert_eq!(result.metadata.algorithm_version, env!("CARGO_PKG_VERSION"));
    }
}
