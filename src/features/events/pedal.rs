//! Pedal-point and circle-of-fifths chain detection

/// A maximal run of consecutive descending-fifth root motions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifthChain {
    /// Index of the first chord in the chain
    pub start: usize,
    /// Number of descending-fifth transitions (chords spanned minus one)
    pub transitions: usize,
}

/// Flag every position that participates in a pedal point
///
/// A pedal point is a maximal run of two or more consecutive identical
/// bass pitch classes. Runs of length one are never flagged. Output
/// length equals input length; single-element or empty input returns
/// `[false]` / `[]` without indexing errors.
pub fn pedal_flags(bass_pcs: &[u8]) -> Vec<bool> {
    let mut flags = vec![false; bass_pcs.len()];
    let mut run_start = 0;
    for i in 1..=bass_pcs.len() {
        let run_ended = i == bass_pcs.len() || bass_pcs[i] != bass_pcs[run_start];
        if run_ended {
            if i - run_start >= 2 {
                for flag in &mut flags[run_start..i] {
                    *flag = true;
                }
            }
            run_start = i;
        }
    }
    flags
}

/// Find maximal circle-of-fifths chains in a root-motion label array
///
/// Scans for maximal runs of the "-5" label. A chain is reported when it
/// spans at least `min_chords - 1` transitions. The reported start index
/// is the chord that begins the chain (one before its first "-5" label,
/// since label `i` describes the motion into chord `i`).
pub fn fifth_chains(root_motion: &[String], min_chords: usize) -> Vec<FifthChain> {
    let min_transitions = min_chords.saturating_sub(1).max(1);
    let mut chains = Vec::new();
    let mut run_len = 0usize;
    for i in 0..=root_motion.len() {
        let in_run = i < root_motion.len() && root_motion[i] == "-5";
        if in_run {
            run_len += 1;
        } else {
            if run_len >= min_transitions {
                // Label index 0 is always "" (no predecessor), so the run
                // starts at index >= 1 and this cannot underflow; saturate
                // anyway for labels built elsewhere.
                chains.push(FifthChain {
                    start: (i - run_len).saturating_sub(1),
                    transitions: run_len,
                });
            }
            run_len = 0;
        }
    }
    chains
}
