//! Voice-leading inference from roman-numeral adjacency
//!
//! True voicing data is unavailable at this layer, so the classical
//! resolution idioms are inferred heuristically from adjacent roman
//! numerals and functional roles. These are approximations by contract:
//! a flag means "this idiom is strongly implied here", not "these voices
//! were observed".

use crate::context::{FunctionalRole, Token};

/// Per-position voice-leading inference flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceLeading {
    /// Cadential 6/4 at this position (e.g. "I64" moving to a dominant)
    pub cadential_64: Vec<bool>,
    /// 4→3 suspension resolution implied (cadential 6/4 resolving over V)
    pub four_three: Vec<bool>,
    /// 7→1 leading-tone resolution implied (dominant seventh into tonic)
    pub seven_one: Vec<bool>,
    /// ♯4→5 resolution implied (augmented sixth into the dominant)
    pub sharp_four_five: Vec<bool>,
    /// ♭6→5 resolution implied (Phrygian approach to the dominant)
    pub flat_six_five: Vec<bool>,
}

fn is_dominant(token: &Token) -> bool {
    token.role == Some(FunctionalRole::Dominant)
        || (token.roman.starts_with('V') && !token.roman.starts_with("VI"))
        || token.roman.starts_with("vii")
}

fn is_tonic(token: &Token) -> bool {
    token.role == Some(FunctionalRole::Tonic)
        || ((token.roman.starts_with('I') || token.roman.starts_with('i'))
            && !token.roman.starts_with("IV")
            && !token.roman.starts_with("iv")
            && !token.roman.starts_with("II")
            && !token.roman.starts_with("ii"))
}

fn is_cadential_64(token: &Token) -> bool {
    token.flags.contains("cadential64")
        || ((token.roman.starts_with('I') || token.roman.starts_with('i'))
            && token.roman.contains("64"))
}

fn is_augmented_sixth(token: &Token) -> bool {
    let r = token.roman.as_str();
    r.starts_with("It") || r.starts_with("Ger") || r.starts_with("Fr") || r.contains("+6")
}

fn is_phrygian_approach(token: &Token) -> bool {
    let r = token.roman.as_str();
    r.starts_with("bII") || r.starts_with("♭II") || r.starts_with("N6") || r.starts_with("iv6")
}

/// Infer voice-leading idioms from token adjacency
///
/// Every output vector is exactly as long as the input; empty input
/// yields empty vectors.
pub fn infer_voice_leading(tokens: &[Token]) -> VoiceLeading {
    let n = tokens.len();
    let mut vl = VoiceLeading {
        cadential_64: vec![false; n],
        four_three: vec![false; n],
        seven_one: vec![false; n],
        sharp_four_five: vec![false; n],
        flat_six_five: vec![false; n],
    };

    for i in 0..n {
        let next = tokens.get(i + 1);

        if is_cadential_64(&tokens[i]) && next.is_some_and(is_dominant) {
            vl.cadential_64[i] = true;
            // The 6/4's fourth above the bass resolves down to the
            // dominant's third
            vl.four_three[i] = true;
        }

        if is_dominant(&tokens[i])
            && (tokens[i].roman.contains('7') || tokens[i].flags.contains("seventh"))
            && next.is_some_and(is_tonic)
        {
            vl.seven_one[i] = true;
        }

        if is_augmented_sixth(&tokens[i]) && next.is_some_and(is_dominant) {
            vl.sharp_four_five[i] = true;
        }

        if is_phrygian_approach(&tokens[i]) && next.is_some_and(is_dominant) {
            vl.flat_six_five[i] = true;
        }
    }

    vl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Token;

    fn tokens(romans: &[&str]) -> Vec<Token> {
        romans.iter().map(|r| Token::new(*r)).collect()
    }

    #[test]
    fn test_cadential_64_and_four_three() {
        let toks = tokens(&["IV", "I64", "V", "I"]);
        let vl = infer_voice_leading(&toks);
        assert_eq!(vl.cadential_64, vec![false, true, false, false]);
        assert_eq!(vl.four_three, vec![false, true, false, false]);
    }

    #[test]
    fn test_seven_one_needs_seventh() {
        let with_seventh = infer_voice_leading(&tokens(&["V7", "I"]));
        assert_eq!(with_seventh.seven_one, vec![true, false]);
        // A plain triad does not imply the 7->1 resolution
        let triad = infer_voice_leading(&tokens(&["V", "I"]));
        assert_eq!(triad.seven_one, vec![false, false]);
    }

    #[test]
    fn test_augmented_sixth() {
        let vl = infer_voice_leading(&tokens(&["Ger65", "V", "i"]));
        assert_eq!(vl.sharp_four_five, vec![true, false, false]);
    }

    #[test]
    fn test_phrygian_flat_six() {
        let vl = infer_voice_leading(&tokens(&["bII", "V", "i"]));
        assert_eq!(vl.flat_six_five, vec![true, false, false]);
        let n6 = infer_voice_leading(&tokens(&["N6", "V", "i"]));
        assert_eq!(n6.flat_six_five, vec![true, false, false]);
    }

    #[test]
    fn test_empty_input() {
        let vl = infer_voice_leading(&[]);
        assert!(vl.cadential_64.is_empty());
        assert!(vl.seven_one.is_empty());
    }

    #[test]
    fn test_vi_is_not_dominant() {
        // "VI" must not be mistaken for "V"
        let vl = infer_voice_leading(&tokens(&["I64", "VI"]));
        assert_eq!(vl.cadential_64, vec![false, false]);
    }
}
