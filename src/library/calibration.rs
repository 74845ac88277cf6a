//! Calibration mapping loading and validation
//!
//! The mapping file stores, per interpretation track, a GLOBAL bucket and
//! optional named buckets, each holding the three calibration stages:
//! Platt parameters, an isotonic lookup table, and an uncertainty factor.
//! The file may be entirely absent — the service then runs in
//! pass-through mode. Malformed isotonic tables are rejected here, at
//! load, never mid-calibration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AnalysisError;

/// Shape of the Platt stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlattKind {
    /// `y = sigmoid(a·x + b)` (the default)
    #[default]
    Logistic,
    /// `y = a·x + b`, clamped to [0, 1]
    Linear,
}

#[derive(Debug, Deserialize)]
struct CalibrationFile {
    tracks: BTreeMap<String, TrackSpec>,
}

#[derive(Debug, Deserialize)]
struct TrackSpec {
    #[serde(rename = "GLOBAL", default)]
    global: Option<BucketSpec>,
    #[serde(default)]
    buckets: BTreeMap<String, BucketSpec>,
}

#[derive(Debug, Deserialize)]
struct BucketSpec {
    platt: PlattSpec,
    isotonic: IsotonicSpec,
    uncertainty: UncertaintySpec,
}

#[derive(Debug, Deserialize)]
struct PlattSpec {
    a: f32,
    b: f32,
    #[serde(default)]
    kind: PlattKind,
}

#[derive(Debug, Deserialize)]
struct IsotonicSpec {
    x: Vec<f32>,
    y: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct UncertaintySpec {
    factor: f32,
}

/// One validated calibration bucket
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Platt slope
    pub a: f32,
    /// Platt intercept
    pub b: f32,
    /// Platt transform shape
    pub kind: PlattKind,
    /// Isotonic lookup abscissae, non-decreasing
    pub isotonic_x: Vec<f32>,
    /// Isotonic lookup ordinates, non-decreasing, in [0, 1]
    pub isotonic_y: Vec<f32>,
    /// Uncertainty shrink factor in [0, 1]
    pub uncertainty: f32,
}

/// Calibration parameters for one track
#[derive(Debug, Clone, Default)]
pub struct TrackCalibration {
    /// Fallback bucket used when no named bucket applies
    pub global: Option<Bucket>,
    /// Named buckets keyed by the routing function's output
    pub buckets: BTreeMap<String, Bucket>,
}

/// The loaded, immutable calibration mapping
#[derive(Debug, Clone, Default)]
pub struct CalibrationMapping {
    /// Per-track calibration, keyed by lowercase track name
    pub tracks: BTreeMap<String, TrackCalibration>,
}

const KNOWN_TRACKS: [&str; 3] = ["functional", "modal", "chromatic"];

impl CalibrationMapping {
    /// Load and validate a calibration mapping file
    ///
    /// # Errors
    ///
    /// `AnalysisError::Io` if the file cannot be read,
    /// `AnalysisError::SchemaValidation` on malformed content (unknown
    /// track name, mismatched or non-monotonic isotonic table, non-finite
    /// or out-of-range parameters).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading calibration mapping from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Parse and validate a calibration mapping from JSON text
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        let file: CalibrationFile = serde_json::from_str(text)?;
        let mut tracks = BTreeMap::new();
        for (track_name, spec) in &file.tracks {
            if !KNOWN_TRACKS.contains(&track_name.as_str()) {
                return Err(AnalysisError::SchemaValidation(format!(
                    "tracks.{}: unknown track (expected one of {:?})",
                    track_name, KNOWN_TRACKS
                )));
            }
            let mut calibration = TrackCalibration::default();
            if let Some(bucket) = &spec.global {
                calibration.global = Some(validate_bucket(
                    bucket,
                    &format!("tracks.{}.GLOBAL", track_name),
                )?);
            }
            for (bucket_name, bucket) in &spec.buckets {
                calibration.buckets.insert(
                    bucket_name.clone(),
                    validate_bucket(
                        bucket,
                        &format!("tracks.{}.buckets.{}", track_name, bucket_name),
                    )?,
                );
            }
            tracks.insert(track_name.clone(), calibration);
        }
        log::debug!("Loaded calibration mapping for {} track(s)", tracks.len());
        Ok(Self { tracks })
    }
}

fn validate_bucket(spec: &BucketSpec, field_path: &str) -> Result<Bucket, AnalysisError> {
    if !spec.platt.a.is_finite() || !spec.platt.b.is_finite() {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}.platt: non-finite parameter (a={}, b={})",
            field_path, spec.platt.a, spec.platt.b
        )));
    }
    if spec.isotonic.x.len() != spec.isotonic.y.len() {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}.isotonic: x has {} entries, y has {}",
            field_path,
            spec.isotonic.x.len(),
            spec.isotonic.y.len()
        )));
    }
    for (name, values) in [("x", &spec.isotonic.x), ("y", &spec.isotonic.y)] {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}.isotonic.{}: non-finite entry",
                field_path, name
            )));
        }
        if values.windows(2).any(|w| w[0] > w[1]) {
            return Err(AnalysisError::SchemaValidation(format!(
                "{}.isotonic.{}: entries must be non-decreasing",
                field_path, name
            )));
        }
    }
    if spec.isotonic.y.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}.isotonic.y: entries must be within [0, 1]",
            field_path
        )));
    }
    if !spec.uncertainty.factor.is_finite()
        || !(0.0..=1.0).contains(&spec.uncertainty.factor)
    {
        return Err(AnalysisError::SchemaValidation(format!(
            "{}.uncertainty.factor: {} outside [0, 1]",
            field_path, spec.uncertainty.factor
        )));
    }
    Ok(Bucket {
        a: spec.platt.a,
        b: spec.platt.b,
        kind: spec.platt.kind,
        isotonic_x: spec.isotonic.x.clone(),
        isotonic_y: spec.isotonic.y.clone(),
        uncertainty: spec.uncertainty.factor,
    })
}
