//! Match selection policies
//!
//! The default policy is existence: every matching window is evidence.
//! Best-cover greedily keeps the strongest non-overlapping matches, for
//! callers that want one reading per region instead of every reading.

use super::Evidence;

/// Greedily select non-overlapping, highest-scoring matches
///
/// Candidates are taken in descending score order (ties broken by higher
/// pattern priority, then longer window, then earlier start, for
/// determinism); a candidate is kept only if its window does not overlap
/// an already kept one. The result is re-sorted by window start.
pub fn best_cover(mut candidates: Vec<Evidence>) -> Vec<Evidence> {
    candidates.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut kept: Vec<Evidence> = Vec::new();
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|k| candidate.start < k.end && k.start < candidate.end);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|e| e.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, start: usize, end: usize, score: f32) -> Evidence {
        Evidence {
            pattern_id: id.to_string(),
            family: id.split('.').next().unwrap_or(id).to_string(),
            tracks: Vec::new(),
            start,
            end,
            raw_score: score,
            features: Vec::new(),
            priority: 0,
        }
    }

    #[test]
    fn test_best_cover_prefers_high_scores() {
        let selected = best_cover(vec![
            ev("a.weak", 0, 2, 0.3),
            ev("a.strong", 1, 3, 0.9),
            ev("a.tail", 3, 4, 0.5),
        ]);
        let ids: Vec<&str> = selected.iter().map(|e| e.pattern_id.as_str()).collect();
        assert_eq!(ids, vec!["a.strong", "a.tail"]);
    }

    #[test]
    fn test_best_cover_keeps_disjoint() {
        let selected = best_cover(vec![ev("a.x", 0, 2, 0.5), ev("a.y", 2, 4, 0.5)]);
        assert_eq!(selected.len(), 2);
        // Output ordered by window start
        assert!(selected[0].start < selected[1].start);
    }

    #[test]
    fn test_best_cover_priority_breaks_score_ties() {
        // Same score, same length, overlapping windows: the higher
        // priority pattern is kept
        let mut low = ev("a.low", 0, 2, 0.5);
        low.priority = 1;
        let mut high = ev("a.high", 1, 3, 0.5);
        high.priority = 9;
        let selected = best_cover(vec![low, high]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].pattern_id, "a.high");
    }

    #[test]
    fn test_best_cover_empty() {
        assert!(best_cover(Vec::new()).is_empty());
    }
}
