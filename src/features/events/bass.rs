//! Bass pitch extraction and root-motion classification
//!
//! Chord symbols are reduced to a bass pitch class (the root, or the note
//! after "/" for slash chords), and consecutive bass pitch classes are
//! bucketed into a small set of root-motion labels.

/// Parse the bass note of a chord symbol to a pitch class (0-11)
///
/// The bass is the note after the last "/" for slash chords, otherwise the
/// leading root. Sharps and flats (ASCII `#`/`b` and Unicode `♯`/`♭`) are
/// applied cumulatively. An unparsable symbol defaults to pitch class 0 —
/// the engine favors best-effort analysis over failure.
///
/// # Example
///
/// ```
/// use cadenza::features::events::bass::parse_bass_pitch_class;
///
/// assert_eq!(parse_bass_pitch_class("C#"), 1);
/// assert_eq!(parse_bass_pitch_class("Bb/Db"), 1);
/// assert_eq!(parse_bass_pitch_class("F#m/A#"), 10);
/// ```
pub fn parse_bass_pitch_class(symbol: &str) -> u8 {
    let bass_part = match symbol.rsplit_once('/') {
        Some((_, bass)) => bass,
        None => symbol,
    };
    match parse_note(bass_part) {
        Some(pc) => pc,
        None => {
            log::warn!("Unparsable bass note in chord symbol '{}', defaulting to 0", symbol);
            0
        }
    }
}

/// Parse a leading note name ("C", "F#", "bb", "E♭") to a pitch class
fn parse_note(text: &str) -> Option<u8> {
    let mut chars = text.chars();
    let letter = chars.next()?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let mut pc = base;
    for c in chars {
        match c {
            '#' | '♯' => pc += 1,
            'b' | '♭' => pc -= 1,
            // First non-accidental ends the note name ("m", "7", "maj", ...)
            _ => break,
        }
    }
    Some(pc.rem_euclid(12) as u8)
}

/// Classify a bass interval (in ascending semitones mod 12) as a
/// root-motion label
///
/// Fixed table: 0 → "same", 7 → "-5" (descending fifth), 5 → "+4",
/// 2 → "+2", 10 → "-2", 1 and 11 → "chromatic". Thirds collapse to a
/// signed degree label ("+3"/"-3") and the tritone keeps its own label,
/// so generic labels never collide with the fixed table.
pub fn classify_root_motion(semitones: u8) -> &'static str {
    match semitones % 12 {
        0 => "same",
        7 => "-5",
        5 => "+4",
        2 => "+2",
        10 => "-2",
        1 | 11 => "chromatic",
        3 | 4 => "+3",
        8 | 9 => "-3",
        _ => "tritone",
    }
}

/// Label each motion between consecutive bass pitch classes
///
/// The interval is measured descending (`prev - curr` mod 12) so that the
/// falling-fifth motions of functional harmony land on "-5": V→I (G to C)
/// is 7 → "-5", and a vi→ii→V→I circle-of-fifths run yields a "-5" run
/// the chain detector can find.
///
/// The first position always gets the empty label (no predecessor).
/// Output length equals input length; empty input yields an empty vector.
pub fn root_motion_labels(bass_pcs: &[u8]) -> Vec<String> {
    let mut labels = Vec::with_capacity(bass_pcs.len());
    for (i, &pc) in bass_pcs.iter().enumerate() {
        if i == 0 {
            labels.push(String::new());
        } else {
            let interval = (bass_pcs[i - 1] as i32 - pc as i32).rem_euclid(12) as u8;
            labels.push(classify_root_motion(interval).to_string());
        }
    }
    labels
}

const DEGREE_NAMES: [&str; 12] = [
    "1", "b2", "2", "b3", "3", "4", "b5", "5", "b6", "6", "b7", "7",
];

/// Label each bass pitch class as a scale degree relative to the key center
///
/// Without a parsable key center every entry is "?".
pub fn bass_degree_labels(bass_pcs: &[u8], key_center: Option<&str>) -> Vec<String> {
    let key_pc = key_center.and_then(parse_note);
    bass_pcs
        .iter()
        .map(|&pc| match key_pc {
            Some(k) => DEGREE_NAMES[((pc as i32 - k as i32).rem_euclid(12)) as usize].to_string(),
            None => "?".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bass_extraction_table() {
        // Slash-chord bass wins over the root
        let symbols = ["C#", "Bb/Db", "F#m/A#"];
        let pcs: Vec<u8> = symbols.iter().map(|s| parse_bass_pitch_class(s)).collect();
        assert_eq!(pcs, vec![1, 1, 10]);
    }

    #[test]
    fn test_bass_extraction_plain_roots() {
        assert_eq!(parse_bass_pitch_class("C"), 0);
        assert_eq!(parse_bass_pitch_class("Am7"), 9);
        assert_eq!(parse_bass_pitch_class("Ebmaj7"), 3);
        assert_eq!(parse_bass_pitch_class("G7/B"), 11);
    }

    #[test]
    fn test_bass_extraction_unparsable_defaults_to_zero() {
        assert_eq!(parse_bass_pitch_class("?!"), 0);
        assert_eq!(parse_bass_pitch_class(""), 0);
    }

    #[test]
    fn test_root_motion_table() {
        assert_eq!(classify_root_motion(0), "same");
        assert_eq!(classify_root_motion(7), "-5");
        assert_eq!(classify_root_motion(5), "+4");
        assert_eq!(classify_root_motion(2), "+2");
        assert_eq!(classify_root_motion(10), "-2");
        assert_eq!(classify_root_motion(1), "chromatic");
        assert_eq!(classify_root_motion(11), "chromatic");
        assert_eq!(classify_root_motion(3), "+3");
        assert_eq!(classify_root_motion(9), "-3");
        assert_eq!(classify_root_motion(6), "tritone");
    }

    #[test]
    fn test_root_motion_first_label_empty() {
        // C -> G -> C: I -> V gets "+4", the V -> I resolution is the
        // falling fifth "-5"
        let labels = root_motion_labels(&[0, 7, 0]);
        assert_eq!(labels, vec!["", "+4", "-5"]);
    }

    #[test]
    fn test_root_motion_descending_fifths_run() {
        // A -> D -> G -> C, the classic vi-ii-V-I bass line
        let labels = root_motion_labels(&[9, 2, 7, 0]);
        assert_eq!(labels, vec!["", "-5", "-5", "-5"]);
    }

    #[test]
    fn test_root_motion_empty_input() {
        assert!(root_motion_labels(&[]).is_empty());
    }

    #[test]
    fn test_bass_degrees() {
        let degrees = bass_degree_labels(&[0, 5, 7, 10], Some("C"));
        assert_eq!(degrees, vec!["1", "4", "5", "b7"]);
        let unknown = bass_degree_labels(&[0, 5], None);
        assert_eq!(unknown, vec!["?", "?"]);
    }
}
