//! Low-level event extraction
//!
//! Derives structural events — bass motion, pedal points, circle-of-fifths
//! chains, voice-leading idioms — from a token stream and its chord
//! symbols. Pure function of its inputs: no configuration files, no shared
//! state, and a hard length contract (every output array is exactly as
//! long as the input; empty input yields empty arrays, never an error).

pub mod bass;
pub mod pedal;
pub mod voice_leading;

pub use bass::{bass_degree_labels, classify_root_motion, parse_bass_pitch_class, root_motion_labels};
pub use pedal::{fifth_chains, pedal_flags, FifthChain};
pub use voice_leading::{infer_voice_leading, VoiceLeading};

use crate::context::Token;

/// Per-token-index structural events for one analysis call
///
/// Transient: one instance per call, surfaced on the analysis result so
/// callers can introspect what the matcher saw (there is no hidden
/// "last computed" state anywhere in the engine).
#[derive(Debug, Clone, Default)]
pub struct LowLevelEvents {
    /// Bass scale-degree label per position ("1".."7" with accidentals,
    /// "?" without a key)
    pub bass_degrees: Vec<String>,
    /// Root-motion label per position; index 0 is always ""
    pub root_motion: Vec<String>,
    /// Voice-leading inference flags (includes the cadential 6/4 flag)
    pub voice_leading: VoiceLeading,
    /// Pedal-point participation per position
    pub pedal: Vec<bool>,
    /// Maximal descending-fifth chains found in the root motion
    pub fifth_chains: Vec<FifthChain>,
}

impl LowLevelEvents {
    /// Number of positions covered by the event arrays
    pub fn len(&self) -> usize {
        self.root_motion.len()
    }

    /// True when no positions were analyzed
    pub fn is_empty(&self) -> bool {
        self.root_motion.is_empty()
    }
}

/// Extract all low-level events for a progression
///
/// Bass-derived events come from `chord_symbols` when present; otherwise
/// root motion falls back to each token's `bass_motion_from_prev` field,
/// and bass degrees degrade to "?". Voice-leading inference works on the
/// tokens alone.
///
/// `min_fifth_chain` is the minimum chain length in chords (a chain of n
/// chords spans n-1 transitions).
pub fn extract_events(
    tokens: &[Token],
    chord_symbols: &[String],
    key_center: Option<&str>,
    min_fifth_chain: usize,
) -> LowLevelEvents {
    let n = tokens.len().max(chord_symbols.len());
    log::debug!(
        "Extracting events: {} tokens, {} chord symbols, key={:?}",
        tokens.len(),
        chord_symbols.len(),
        key_center
    );

    let (mut bass_degrees, mut root_motion, mut pedal) = if !chord_symbols.is_empty() {
        let pcs: Vec<u8> = chord_symbols
            .iter()
            .map(|s| parse_bass_pitch_class(s))
            .collect();
        (
            bass_degree_labels(&pcs, key_center),
            root_motion_labels(&pcs),
            pedal_flags(&pcs),
        )
    } else {
        // No chord symbols: derive root motion from tokenizer-supplied
        // bass intervals where available
        let motion = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i == 0 {
                    String::new()
                } else {
                    match t.bass_motion_from_prev {
                        // Token motion is ascending; the classifier takes
                        // the descending measure
                        Some(semis) => {
                            classify_root_motion((-(semis as i32)).rem_euclid(12) as u8)
                                .to_string()
                        }
                        None => String::new(),
                    }
                }
            })
            .collect();
        (vec!["?".to_string(); n], motion, vec![false; n])
    };

    // Length contract: chord symbols shorter than the token stream leave
    // the tail positions with no bass information, not shorter arrays
    if bass_degrees.len() < n {
        bass_degrees.resize(n, "?".to_string());
        root_motion.resize(n, String::new());
        pedal.resize(n, false);
    }

    let chains = fifth_chains(&root_motion, min_fifth_chain);
    if !chains.is_empty() {
        log::debug!("Found {} circle-of-fifths chain(s)", chains.len());
    }

    // Same contract for voice leading when only chord symbols were supplied
    let mut voice_leading = infer_voice_leading(tokens);
    if tokens.len() < n {
        voice_leading.cadential_64.resize(n, false);
        voice_leading.four_three.resize(n, false);
        voice_leading.seven_one.resize(n, false);
        voice_leading.sharp_four_five.resize(n, false);
        voice_leading.flat_six_five.resize(n, false);
    }

    LowLevelEvents {
        bass_degrees,
        root_motion,
        voice_leading,
        pedal,
        fifth_chains: chains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Token;

    #[test]
    fn test_extract_events_empty() {
        let events = extract_events(&[], &[], None, 3);
        assert!(events.is_empty());
        assert!(events.bass_degrees.is_empty());
        assert!(events.pedal.is_empty());
        assert!(events.fifth_chains.is_empty());
    }

    #[test]
    fn test_extract_events_length_contract() {
        let tokens: Vec<Token> = ["I", "IV", "V", "I"].iter().map(|r| Token::new(*r)).collect();
        let symbols: Vec<String> = ["C", "F", "G", "C"].iter().map(|s| s.to_string()).collect();
        let events = extract_events(&tokens, &symbols, Some("C"), 3);
        assert_eq!(events.len(), 4);
        assert_eq!(events.bass_degrees.len(), 4);
        assert_eq!(events.root_motion.len(), 4);
        assert_eq!(events.pedal.len(), 4);
        assert_eq!(events.voice_leading.seven_one.len(), 4);
    }

    #[test]
    fn test_length_contract_with_fewer_symbols_than_tokens() {
        // A single chord symbol against four tokens: the bass-derived
        // arrays still come out at full length, tail positions unknown
        let tokens: Vec<Token> = ["I", "IV", "V", "I"].iter().map(|r| Token::new(*r)).collect();
        let symbols = vec!["C".to_string()];
        let events = extract_events(&tokens, &symbols, Some("C"), 3);
        assert_eq!(events.root_motion.len(), 4);
        assert_eq!(events.bass_degrees, vec!["1", "?", "?", "?"]);
        assert_eq!(events.pedal, vec![false; 4]);
        assert_eq!(events.voice_leading.seven_one.len(), 4);
    }

    #[test]
    fn test_extract_events_without_symbols_uses_token_motion() {
        // V -> I with the bass rising a fourth (G up to C) is the falling
        // fifth of an authentic cadence
        let mut t2 = Token::new("I");
        t2.bass_motion_from_prev = Some(5);
        let tokens = vec![Token::new("V"), t2];
        let events = extract_events(&tokens, &[], Some("C"), 3);
        assert_eq!(events.root_motion, vec!["", "-5"]);
        assert_eq!(events.bass_degrees, vec!["?", "?"]);
    }

    #[test]
    fn test_extract_events_fifth_chain() {
        // Am -> Dm -> G -> C: descending fifths all the way
        let symbols: Vec<String> = ["Am", "Dm", "G", "C"].iter().map(|s| s.to_string()).collect();
        let events = extract_events(&[], &symbols, Some("C"), 3);
        assert_eq!(events.fifth_chains.len(), 1);
        assert_eq!(events.fifth_chains[0].start, 0);
        assert_eq!(events.fifth_chains[0].transitions, 3);
    }
}
