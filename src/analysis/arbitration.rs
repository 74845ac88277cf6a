//! Arbitration between the functional and modal interpretation tracks
//!
//! Picks the primary interpretation from the two calibrated confidences
//! and explains the decision. Inputs are clamped before comparison
//! (advisory analysis never aborts on a bad confidence), and the
//! reasoning string always names the rule that fired.

use crate::config::AnalysisConfig;
use crate::context::Track;
use crate::features::matching::Evidence;

/// Which arbitration rule decided the primary track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationRule {
    /// Functional led by at least the margin and cleared the floor
    FunctionalByMargin,
    /// Modal led by at least the margin and cleared the floor
    ModalByMargin,
    /// Modal promoted by evidence markers inside the margin band
    ModalOverride,
    /// Neither track won outright; the numerically higher one was taken
    TieBreak,
}

/// Outcome of arbitration: one instance per analysis call
#[derive(Debug, Clone)]
pub struct ArbitrationResult {
    /// The chosen primary track
    pub primary: Track,
    /// Functional confidence after clamping
    pub functional: f32,
    /// Modal confidence after clamping
    pub modal: f32,
    /// True when the decision was a low-certainty tie-break
    pub low_certainty: bool,
    /// The rule that fired
    pub rule: ArbitrationRule,
    /// Human-readable explanation; never empty
    pub reasoning: String,
}

fn clamp_confidence(value: f32, name: &str) -> f32 {
    if !value.is_finite() {
        log::warn!("Non-finite {} confidence {} clamped to 0.0", name, value);
        return 0.0;
    }
    if !(0.0..=1.0).contains(&value) {
        log::warn!("{} confidence {} clamped into [0, 1]", name, value);
    }
    value.clamp(0.0, 1.0)
}

/// Count modal evidence markers: evidence carrying the "modal_marker"
/// feature (flat-seven chords, flat-two chords, Andalusian motion, ...)
pub fn modal_marker_count(evidence: &[Evidence]) -> usize {
    evidence
        .iter()
        .filter(|e| e.features.iter().any(|f| f == "modal_marker"))
        .count()
}

/// Decide the primary interpretation
///
/// Decision order:
/// 1. Functional wins when `functional ≥ modal + margin` and
///    `functional ≥ min_primary`; symmetrically for modal.
/// 2. With the evidence override enabled, modal is promoted inside the
///    margin band when modal markers are present — but never when the
///    functional lead exceeds the override guardband.
/// 3. Otherwise the numerically higher track wins as a low-certainty
///    tie-break (functional on an exact tie).
pub fn decide(
    functional: f32,
    modal: f32,
    evidence: &[Evidence],
    config: &AnalysisConfig,
) -> ArbitrationResult {
    let functional = clamp_confidence(functional, "functional");
    let modal = clamp_confidence(modal, "modal");
    let margin = config.arbitration_margin;
    let floor = config.min_primary;

    if functional >= modal + margin && functional >= floor {
        return ArbitrationResult {
            primary: Track::Functional,
            functional,
            modal,
            low_certainty: false,
            rule: ArbitrationRule::FunctionalByMargin,
            reasoning: format!(
                "functional {:.2} leads modal {:.2} by at least the margin {:.2} and clears the primary floor {:.2}",
                functional, modal, margin, floor
            ),
        };
    }

    if modal >= functional + margin && modal >= floor {
        return ArbitrationResult {
            primary: Track::Modal,
            functional,
            modal,
            low_certainty: false,
            rule: ArbitrationRule::ModalByMargin,
            reasoning: format!(
                "modal {:.2} leads functional {:.2} by at least the margin {:.2} and clears the primary floor {:.2}",
                modal, functional, margin, floor
            ),
        };
    }

    if config.evidence_override {
        let markers = modal_marker_count(evidence);
        let gap = functional - modal;
        // Guardband invariant: a comfortable functional lead is never
        // overridden, regardless of markers
        if markers > 0 && gap <= config.override_guardband {
            return ArbitrationResult {
                primary: Track::Modal,
                functional,
                modal,
                low_certainty: true,
                rule: ArbitrationRule::ModalOverride,
                reasoning: format!(
                    "evidence override: {} modal marker(s) promote modal {:.2} within the margin band (functional lead {:.2} inside guardband {:.2})",
                    markers, modal, gap.max(0.0), config.override_guardband
                ),
            };
        }
    }

    let primary = if modal > functional {
        Track::Modal
    } else {
        Track::Functional
    };
    ArbitrationResult {
        primary,
        functional,
        modal,
        low_certainty: true,
        rule: ArbitrationRule::TieBreak,
        reasoning: format!(
            "no track won by margin {:.2}; low-certainty tie-break on the higher confidence ({} {:.2})",
            margin,
            primary.as_str(),
            functional.max(modal)
        ),
    }
}
