//! Window search over the token stream
//!
//! Brute-force enumeration of candidate windows for one pattern, with
//! constraint evaluation and evidence scoring.

use crate::context::{AnalysisContext, Mode, Scope};
use crate::features::events::bass::parse_bass_pitch_class;
use crate::features::events::LowLevelEvents;

use super::{
    constraints, Evidence, MatchFailure, Pattern, SequenceElement, SequenceKind,
    SubstitutionTable,
};

/// Scope gating: does this pattern apply to the given context at all?
///
/// Every scope the pattern declares must have its input present —
/// melodic-scope patterns require a non-empty melody, scale-scope
/// patterns require scale data. Returns false, never an error, when a
/// required input is absent.
pub fn applies(pattern: &Pattern, context: &AnalysisContext) -> bool {
    pattern.scopes.iter().all(|scope| match scope {
        Scope::Harmonic => {
            !context.romans.is_empty()
                || !context.chord_symbols.is_empty()
                || !context.tokens.is_empty()
        }
        Scope::Melodic => !context.melody.is_empty(),
        Scope::Scale => !context.scale_notes.is_empty(),
    })
}

/// The context array a pattern's sequence reads, as owned symbols
fn sequence_for(pattern: &Pattern, context: &AnalysisContext) -> Vec<String> {
    match pattern.kind {
        SequenceKind::Roman => {
            if !context.romans.is_empty() {
                context.romans.clone()
            } else {
                context.tokens.iter().map(|t| t.roman.clone()).collect()
            }
        }
        SequenceKind::Chord => context.chord_symbols.clone(),
        SequenceKind::Interval => context.melody.clone(),
        SequenceKind::ScaleDegree => context.scale_notes.clone(),
    }
}

/// Search all windows of a context for one pattern
///
/// Windows are exactly as long as the pattern's element sequence; a
/// pattern longer than the available sequence (or whose length falls
/// outside its own declared window bounds) yields no matches. All
/// matching windows are returned, overlaps included — selection policies
/// are applied by the caller.
///
/// Returns the evidence for every successful window and a structured
/// failure for every window that matched the bare sequence but was
/// rejected by a constraint.
pub fn match_pattern(
    pattern: &Pattern,
    context: &AnalysisContext,
    events: &LowLevelEvents,
    substitutions: Option<&SubstitutionTable>,
) -> (Vec<Evidence>, Vec<MatchFailure>) {
    let sequence = sequence_for(pattern, context);
    let len = pattern.elements.len();
    let total = sequence.len();

    if len == 0 || len > total || len < pattern.min_window || len > pattern.max_window {
        return (Vec::new(), Vec::new());
    }

    let mut evidence = Vec::new();
    let mut failures = Vec::new();

    for start in 0..=(total - len) {
        let end = start + len;
        let window = &sequence[start..end];
        let sequence_ok = if pattern.transposition_invariant {
            transposed_match(&pattern.elements, window)
        } else {
            pattern
                .elements
                .iter()
                .zip(window)
                .all(|(element, symbol)| element.matches(symbol, substitutions))
        };
        if !sequence_ok {
            continue;
        }

        if let Some(required) = pattern.mode {
            if let Some((reason, detail)) = check_mode(required, context, start, end) {
                failures.push(MatchFailure {
                    pattern_id: pattern.id.clone(),
                    start,
                    end,
                    reason,
                    detail,
                });
                continue;
            }
        }

        match constraints::evaluate(&pattern.constraints, context, events, start, end, total) {
            None => {
                let score =
                    pattern.weight * pattern.confidence_fn.evaluate(start, end, total);
                log::debug!(
                    "Pattern '{}' matched window [{}, {}) with score {:.3}",
                    pattern.id,
                    start,
                    end,
                    score
                );
                evidence.push(Evidence {
                    pattern_id: pattern.id.clone(),
                    family: pattern.family.clone(),
                    tracks: pattern.tracks.clone(),
                    start,
                    end,
                    raw_score: score,
                    features: pattern.features.clone(),
                    priority: pattern.priority,
                });
            }
            Some((reason, detail)) => {
                failures.push(MatchFailure {
                    pattern_id: pattern.id.clone(),
                    start,
                    end,
                    reason,
                    detail,
                });
            }
        }
    }

    (evidence, failures)
}

/// Compare a chord window against the pattern by root-interval shape
///
/// Both sides are reduced to bass pitch classes and their successive
/// intervals (mod 12) compared, so "G7 C" matches "A7 D". Load-time
/// validation restricts transposition-invariant patterns to exact chord
/// elements; anything else never matches.
fn transposed_match(elements: &[SequenceElement], window: &[String]) -> bool {
    let mut pattern_pcs = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            SequenceElement::Exact(symbol) => pattern_pcs.push(parse_bass_pitch_class(symbol)),
            _ => return false,
        }
    }
    let window_pcs: Vec<u8> = window.iter().map(|s| parse_bass_pitch_class(s)).collect();
    interval_shape(&pattern_pcs) == interval_shape(&window_pcs)
}

fn interval_shape(pcs: &[u8]) -> Vec<u8> {
    pcs.windows(2)
        .map(|w| (w[1] as i32 - w[0] as i32).rem_euclid(12) as u8)
        .collect()
}

/// Mode agreement over a window: every token with a known mode must match
/// the required one; a window with no mode information fails the check
/// (missing data degrades the match, never the call)
fn check_mode(
    required: Mode,
    context: &AnalysisContext,
    start: usize,
    end: usize,
) -> Option<(String, String)> {
    let tokens = context.tokens.get(start..end).unwrap_or(&[]);
    let mut known = tokens.iter().filter_map(|t| t.mode).peekable();
    if known.peek().is_none() {
        return Some((
            "mode".to_string(),
            format!("no mode information in window [{}, {})", start, end),
        ));
    }
    if known.any(|m| m != required) {
        return Some((
            "mode".to_string(),
            format!("window mode differs from required {:?}", required),
        ));
    }
    None
}
