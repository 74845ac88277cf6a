//! Example: the same progression under different style profiles

use cadenza::{AnalysisConfig, AnalysisContext, Analyzer, ProfileLibrary, Track};

const PROFILES: &str = r#"{
  "profiles": [
    {
      "name": "common_practice",
      "display_name": "Common practice",
      "enabled": true,
      "typicality_weights": {"cadence.*": 0.85, "modal.*": 0.2, "chromatic.*": 0.5}
    },
    {
      "name": "modal_folk",
      "display_name": "Modal / folk",
      "enabled": true,
      "typicality_weights": {"cadence.*": 0.35, "modal.*": 0.9}
    }
  ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let profiles = ProfileLibrary::from_json(PROFILES)?;
    let analyzer = Analyzer::new(AnalysisConfig::default()).with_profiles(profiles);

    let romans = ["i", "bVII", "bVI", "V"];
    println!("Progression: {}", romans.join(" - "));

    for profile in ["common_practice", "modal_folk"] {
        let mut context = AnalysisContext::from_romans("A", &romans);
        context
            .metadata
            .insert("profile".to_string(), profile.to_string());
        let result = analyzer.analyze(&context)?;

        println!(
            "  {:<16} functional {:.2}  modal {:.2}  -> {:?}",
            profile,
            result.track(Track::Functional).calibrated,
            result.track(Track::Modal).calibrated,
            result.arbitration.primary
        );
    }

    Ok(())
}
