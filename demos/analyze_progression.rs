//! Example: analyze two contrasting progressions
//!
//! Prints the full interpretation of an authentic cadence phrase and an
//! Andalusian cadence, side by side.

use cadenza::{AnalysisConfig, AnalysisContext, Analyzer, Track};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let analyzer = Analyzer::new(AnalysisConfig::default());

    for (label, key, romans) in [
        ("Authentic cadence phrase", "C", vec!["I", "IV", "V7", "I"]),
        ("Andalusian cadence", "A", vec!["i", "bVII", "bVI", "V"]),
    ] {
        let context = AnalysisContext::from_romans(key, &romans);
        let result = analyzer.analyze(&context)?;

        println!("{} ({}: {})", label, key, romans.join(" - "));
        for track in [Track::Functional, Track::Modal, Track::Chromatic] {
            let score = result.track(track);
            println!(
                "  {:<10} raw {:.2}  calibrated {:.2}",
                track.as_str(),
                score.raw,
                score.calibrated
            );
        }
        println!("  Primary: {:?}", result.arbitration.primary);
        println!("  Reasoning: {}", result.arbitration.reasoning);
        for evidence in &result.evidence {
            println!(
                "  Evidence: {} [{}..{}) score {:.2}",
                evidence.pattern_id, evidence.start, evidence.end, evidence.raw_score
            );
        }
        println!();
    }

    Ok(())
}
