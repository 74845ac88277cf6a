//! Style-aware confidence aggregation
//!
//! Aggregates a set of raw evidence into a single confidence for a given
//! style profile. The weighted score is normalized by total raw score so
//! confidence cannot rise merely because more patterns matched; the
//! diversity bonus rewards evidence spanning several pattern families.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::AnalysisConfig;
use crate::features::matching::Evidence;
use crate::library::{Profile, ProfileLibrary};

fn typicality(evidence: &Evidence, profile: Option<&Profile>, neutral: f32) -> f32 {
    match profile {
        Some(p) => p.typicality.lookup(&evidence.pattern_id, neutral),
        None => neutral,
    }
}

/// Aggregate evidence into one confidence for one style profile
///
/// 1. `weighted_score = Σ(score_i × typicality_i) / Σ(score_i)` — an
///    empty evidence list yields 0.0.
/// 2. `diversity = 1 + (families − 1) × diversity_bonus_rate`.
/// 3. `confidence = min(1.0, weighted_score × diversity)`.
pub fn calculate_confidence(
    evidence: &[Evidence],
    profile: Option<&Profile>,
    config: &AnalysisConfig,
) -> f32 {
    if evidence.is_empty() {
        return 0.0;
    }

    let total_score: f32 = evidence.iter().map(|e| e.raw_score).sum();
    if total_score <= 0.0 {
        return 0.0;
    }

    let weighted: f32 = evidence
        .iter()
        .map(|e| e.raw_score * typicality(e, profile, config.neutral_typicality))
        .sum::<f32>()
        / total_score;

    let families: BTreeSet<&str> = evidence.iter().map(|e| e.family.as_str()).collect();
    let diversity = 1.0 + (families.len().saturating_sub(1)) as f32 * config.diversity_bonus_rate;

    (weighted * diversity).min(1.0)
}

/// Confidence under every enabled profile
pub fn multi_style_confidence(
    evidence: &[Evidence],
    profiles: &ProfileLibrary,
    config: &AnalysisConfig,
) -> BTreeMap<String, f32> {
    profiles
        .enabled()
        .map(|p| (p.name.clone(), calculate_confidence(evidence, Some(p), config)))
        .collect()
}

/// Normalize a style→score map into probabilities
///
/// Scores are divided by their sum; if all scores are zero the mass is
/// split equally.
pub fn normalize_to_probabilities(scores: &BTreeMap<String, f32>) -> BTreeMap<String, f32> {
    if scores.is_empty() {
        return BTreeMap::new();
    }
    let total: f32 = scores.values().sum();
    if total <= 0.0 {
        let uniform = 1.0 / scores.len() as f32;
        return scores.keys().map(|k| (k.clone(), uniform)).collect();
    }
    scores.iter().map(|(k, v)| (k.clone(), v / total)).collect()
}

/// Pick the dominant style, optionally boosting a focus profile
///
/// The focus profile's score is multiplied by `config.focus_multiplier`
/// before comparison. Returns the winning name and its (unboosted) score;
/// `None` for an empty map. Ties break lexicographically for determinism.
pub fn dominant_style(
    scores: &BTreeMap<String, f32>,
    focus: Option<&str>,
    config: &AnalysisConfig,
) -> Option<(String, f32)> {
    scores
        .iter()
        .max_by(|(name_a, a), (name_b, b)| {
            let boosted = |name: &str, score: f32| {
                if focus == Some(name) {
                    score * config.focus_multiplier
                } else {
                    score
                }
            };
            boosted(name_a, **a)
                .partial_cmp(&boosted(name_b, **b))
                .unwrap_or(std::cmp::Ordering::Equal)
                // BTreeMap iterates in key order; prefer the earlier key on
                // ties by reversing the name comparison
                .then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, score)| (name.clone(), *score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Track;

    fn ev(id: &str, score: f32) -> Evidence {
        Evidence {
            pattern_id: id.to_string(),
            family: id.split('.').next().unwrap_or(id).to_string(),
            tracks: vec![Track::Functional],
            start: 0,
            end: 2,
            raw_score: score,
            features: Vec::new(),
            priority: 0,
        }
    }

    #[test]
    fn test_empty_evidence_is_zero() {
        let config = AnalysisConfig::default();
        assert_eq!(calculate_confidence(&[], None, &config), 0.0);
    }

    #[test]
    fn test_neutral_typicality_without_profile() {
        let config = AnalysisConfig::default();
        // One family: no diversity bonus, confidence = neutral typicality
        let confidence = calculate_confidence(&[ev("cadence.authentic", 0.9)], None, &config);
        assert!((confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_diversity_bonus() {
        let config = AnalysisConfig::default();
        let one_family = vec![ev("cadence.authentic", 0.8), ev("cadence.plagal", 0.6)];
        let three_families = vec![
            ev("cadence.authentic", 0.8),
            ev("modal.flat_seven", 0.8),
            ev("chromatic.neapolitan", 0.8),
        ];
        // Same neutral typicality everywhere, so the ratio is exactly the
        // diversity multiplier: 1.0 vs 1.2
        let single = calculate_confidence(&one_family, None, &config);
        let triple = calculate_confidence(&three_families, None, &config);
        assert!((single - 0.5).abs() < 1e-6);
        assert!((triple - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_capped_at_one() {
        let config = AnalysisConfig {
            diversity_bonus_rate: 5.0,
            neutral_typicality: 1.0,
            ..AnalysisConfig::default()
        };
        let evidence = vec![
            ev("cadence.authentic", 0.9),
            ev("modal.flat_seven", 0.9),
            ev("chromatic.neapolitan", 0.9),
        ];
        assert_eq!(calculate_confidence(&evidence, None, &config), 1.0);
    }

    #[test]
    fn test_normalization_prevents_count_inflation() {
        let config = AnalysisConfig::default();
        // Many matches of the same family with identical typicality must
        // not beat a single match
        let one = calculate_confidence(&[ev("cadence.authentic", 0.9)], None, &config);
        let many = calculate_confidence(
            &[
                ev("cadence.authentic", 0.9),
                ev("cadence.authentic", 0.9),
                ev("cadence.authentic", 0.9),
            ],
            None,
            &config,
        );
        assert!((one - many).abs() < 1e-6);
    }

    #[test]
    fn test_probability_normalization() {
        let mut scores = BTreeMap::new();
        scores.insert("a".to_string(), 0.2);
        scores.insert("b".to_string(), 0.6);
        let probs = normalize_to_probabilities(&scores);
        assert!((probs["a"] - 0.25).abs() < 1e-6);
        assert!((probs["b"] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_probability_normalization_all_zero() {
        let mut scores = BTreeMap::new();
        scores.insert("a".to_string(), 0.0);
        scores.insert("b".to_string(), 0.0);
        let probs = normalize_to_probabilities(&scores);
        assert!((probs["a"] - 0.5).abs() < 1e-6);
        assert!((probs["b"] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dominant_style_focus_boost() {
        let config = AnalysisConfig::default();
        let mut scores = BTreeMap::new();
        scores.insert("baroque".to_string(), 0.55);
        scores.insert("jazz".to_string(), 0.5);
        // Without focus, baroque wins; a 1.2x focus flips it to jazz
        assert_eq!(dominant_style(&scores, None, &config).unwrap().0, "baroque");
        assert_eq!(
            dominant_style(&scores, Some("jazz"), &config).unwrap().0,
            "jazz"
        );
    }
}
