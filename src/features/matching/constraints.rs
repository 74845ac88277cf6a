//! Constraint evaluation for candidate windows
//!
//! A constraint that references data the context does not carry fails the
//! constraint (with a structured reason) rather than raising: a missing
//! token attribute is an everyday condition in best-effort analysis, not
//! an exception.

use crate::context::AnalysisContext;
use crate::features::events::LowLevelEvents;

use super::{Constraints, KeyContext, PositionConstraint};

/// Outcome of evaluating one window's constraints: `None` means all
/// constraints passed, otherwise `(reason, detail)`
pub type ConstraintVerdict = Option<(String, String)>;

/// Evaluate a pattern's constraints against the window `[start, end)`
pub fn evaluate(
    constraints: &Constraints,
    context: &AnalysisContext,
    events: &LowLevelEvents,
    start: usize,
    end: usize,
    total: usize,
) -> ConstraintVerdict {
    if let Some(degrees) = &constraints.soprano_degrees {
        match context
            .tokens
            .get(end.wrapping_sub(1))
            .and_then(|t| t.soprano_degree.as_deref())
        {
            Some(degree) => {
                if !degrees.iter().any(|d| d == degree) {
                    return Some((
                        "soprano_degrees".to_string(),
                        format!("soprano degree '{}' not in {:?}", degree, degrees),
                    ));
                }
            }
            None => {
                // Missing attribute: constraint fails, match degrades
                return Some((
                    "soprano_degrees".to_string(),
                    format!("no soprano degree at position {}", end.saturating_sub(1)),
                ));
            }
        }
    }

    if let Some(expected) = &constraints.bass_motion {
        let motion = if end >= 2 {
            events.root_motion.get(end - 1).map(|s| s.as_str())
        } else {
            None
        };
        match motion {
            Some(label) if label == expected => {}
            Some(label) => {
                return Some((
                    "bass_motion".to_string(),
                    format!("bass motion '{}' != required '{}'", label, expected),
                ));
            }
            None => {
                return Some((
                    "bass_motion".to_string(),
                    "no bass motion available for window".to_string(),
                ));
            }
        }
    }

    if let Some(key_context) = constraints.key_context {
        if let Some((reason, detail)) = check_key_context(key_context, context, start, end) {
            return Some((reason, detail));
        }
    }

    if let Some(position) = constraints.position {
        let ok = match position {
            PositionConstraint::Start => start == 0,
            PositionConstraint::End => end == total,
        };
        if !ok {
            return Some((
                "position".to_string(),
                format!("window [{}, {}) is not at the required {:?}", start, end, position),
            ));
        }
    }

    None
}

/// True when a roman numeral carries a chromatic alteration or the token
/// is flagged as borrowed
pub(crate) fn is_chromatic_at(context: &AnalysisContext, index: usize) -> bool {
    if let Some(token) = context.tokens.get(index) {
        if token.flags.contains("borrowed") || token.flags.contains("chromatic") {
            return true;
        }
        return roman_is_chromatic(&token.roman);
    }
    context
        .romans
        .get(index)
        .map(|r| roman_is_chromatic(r))
        .unwrap_or(false)
}

fn roman_is_chromatic(roman: &str) -> bool {
    roman.starts_with('b')
        || roman.starts_with('#')
        || roman.starts_with('♭')
        || roman.starts_with('♯')
        || roman.starts_with("It")
        || roman.starts_with("Ger")
        || roman.starts_with("Fr")
        || roman.starts_with("N6")
}

fn check_key_context(
    requirement: KeyContext,
    context: &AnalysisContext,
    start: usize,
    end: usize,
) -> ConstraintVerdict {
    match requirement {
        KeyContext::Diatonic => {
            if context.key_center.is_none() {
                return Some((
                    "key_context".to_string(),
                    "diatonic constraint without a key context".to_string(),
                ));
            }
            for i in start..end {
                if is_chromatic_at(context, i) {
                    return Some((
                        "key_context".to_string(),
                        format!("chromatic unit at position {} in a diatonic window", i),
                    ));
                }
            }
            None
        }
        KeyContext::Chromatic => {
            if (start..end).any(|i| is_chromatic_at(context, i)) {
                None
            } else {
                Some((
                    "key_context".to_string(),
                    "no chromatic unit in window".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AnalysisContext, Token};
    use crate::features::events::extract_events;

    fn ctx(romans: &[&str]) -> AnalysisContext {
        AnalysisContext::from_romans("C", romans)
    }

    #[test]
    fn test_empty_constraints_pass() {
        let context = ctx(&["V", "I"]);
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        assert!(evaluate(&Constraints::default(), &context, &events, 0, 2, 2).is_none());
    }

    #[test]
    fn test_position_end() {
        let context = ctx(&["I", "IV", "V", "I"]);
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        let constraints = Constraints {
            position: Some(PositionConstraint::End),
            ..Constraints::default()
        };
        assert!(evaluate(&constraints, &context, &events, 2, 4, 4).is_none());
        let verdict = evaluate(&constraints, &context, &events, 1, 3, 4);
        assert_eq!(verdict.unwrap().0, "position");
    }

    #[test]
    fn test_missing_soprano_fails_constraint_not_call() {
        let context = ctx(&["V", "I"]);
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        let constraints = Constraints {
            soprano_degrees: Some(vec!["1".to_string()]),
            ..Constraints::default()
        };
        let verdict = evaluate(&constraints, &context, &events, 0, 2, 2);
        assert_eq!(verdict.unwrap().0, "soprano_degrees");
    }

    #[test]
    fn test_soprano_membership() {
        let mut context = ctx(&["V", "I"]);
        context.tokens[1] = Token::new("I").with_soprano("1");
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        let constraints = Constraints {
            soprano_degrees: Some(vec!["1".to_string(), "3".to_string()]),
            ..Constraints::default()
        };
        assert!(evaluate(&constraints, &context, &events, 0, 2, 2).is_none());
    }

    #[test]
    fn test_bass_motion_constraint() {
        let context = AnalysisContext {
            chord_symbols: vec!["G".to_string(), "C".to_string()],
            ..ctx(&["V", "I"])
        };
        let events = extract_events(&context.tokens, &context.chord_symbols, Some("C"), 3);
        let constraints = Constraints {
            bass_motion: Some("-5".to_string()),
            ..Constraints::default()
        };
        assert!(evaluate(&constraints, &context, &events, 0, 2, 2).is_none());

        let wrong = Constraints {
            bass_motion: Some("+2".to_string()),
            ..Constraints::default()
        };
        let verdict = evaluate(&wrong, &context, &events, 0, 2, 2);
        assert_eq!(verdict.unwrap().0, "bass_motion");
    }

    #[test]
    fn test_diatonic_rejects_borrowed() {
        let context = ctx(&["I", "bVII", "I"]);
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        let constraints = Constraints {
            key_context: Some(KeyContext::Diatonic),
            ..Constraints::default()
        };
        let verdict = evaluate(&constraints, &context, &events, 0, 3, 3);
        assert_eq!(verdict.unwrap().0, "key_context");
        // A window avoiding the borrowed chord is fine
        assert!(evaluate(&constraints, &context, &events, 2, 3, 3).is_none());
    }

    #[test]
    fn test_chromatic_requires_alteration() {
        let context = ctx(&["I", "V", "I"]);
        let events = extract_events(&context.tokens, &[], Some("C"), 3);
        let constraints = Constraints {
            key_context: Some(KeyContext::Chromatic),
            ..Constraints::default()
        };
        assert!(evaluate(&constraints, &context, &events, 0, 3, 3).is_some());
    }
}
