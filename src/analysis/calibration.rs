//! Confidence calibration service
//!
//! Maps a raw confidence to a calibrated probability via three stages:
//! Platt scaling, isotonic interpolation, and uncertainty shrinkage
//! toward 0.5. Bucket routing is an externally configurable policy (the
//! authoritative thresholds are a deployment concern, not a contract of
//! this engine); the fallback chain is named bucket → GLOBAL →
//! pass-through. Every call is pure: identical inputs produce identical
//! outputs, and there is no shared mutable state.

use crate::error::AnalysisError;
use crate::context::Track;
use crate::library::{Bucket, CalibrationMapping, PlattKind};

/// Feature summary used to route a calibration call to a bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoutingFeatures {
    /// Number of modal evidence markers in the analysis
    pub modal_marker_count: usize,
    /// Fraction of chromatic (borrowed / altered) units in the progression
    pub chromatic_ratio: f32,
    /// Progression length in harmonic units
    pub token_count: usize,
}

/// Deterministic feature → bucket-key routing policy
pub trait BucketRouter {
    /// Compute the bucket key for a set of routing features
    fn route(&self, features: &RoutingFeatures) -> String;
}

/// Default threshold-based router
///
/// Distinguishes chromatic/borrowed progressions from modal-marked from
/// plain functional ones. The thresholds are an implementation choice;
/// construct with different values to move the boundaries.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRouter {
    /// Minimum chromatic ratio for the "chromatic" bucket (default: 0.25)
    pub chromatic_ratio_min: f32,
    /// Minimum modal marker count for the "modal_marked" bucket (default: 1)
    pub modal_marker_min: usize,
}

impl Default for ThresholdRouter {
    fn default() -> Self {
        Self {
            chromatic_ratio_min: 0.25,
            modal_marker_min: 1,
        }
    }
}

impl BucketRouter for ThresholdRouter {
    fn route(&self, features: &RoutingFeatures) -> String {
        if features.chromatic_ratio >= self.chromatic_ratio_min {
            "chromatic".to_string()
        } else if features.modal_marker_count >= self.modal_marker_min {
            "modal_marked".to_string()
        } else {
            "simple_functional".to_string()
        }
    }
}

/// The calibration service: immutable mapping plus routing policy
pub struct CalibrationService {
    mapping: Option<CalibrationMapping>,
    router: Box<dyn BucketRouter + Send + Sync>,
}

impl std::fmt::Debug for CalibrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationService")
            .field("mapping", &self.mapping)
            .field("router", &"<policy>")
            .finish()
    }
}

impl Default for CalibrationService {
    fn default() -> Self {
        Self::pass_through()
    }
}

impl CalibrationService {
    /// Service with no mapping: `calibrate` is `clamp(x, 0, 1)`
    pub fn pass_through() -> Self {
        Self {
            mapping: None,
            router: Box::new(ThresholdRouter::default()),
        }
    }

    /// Service backed by a loaded mapping and the default router
    pub fn new(mapping: CalibrationMapping) -> Self {
        Self {
            mapping: Some(mapping),
            router: Box::new(ThresholdRouter::default()),
        }
    }

    /// Replace the routing policy
    pub fn with_router(mut self, router: impl BucketRouter + Send + Sync + 'static) -> Self {
        self.router = Box::new(router);
        self
    }

    /// Calibrate a raw confidence for one track
    ///
    /// Resolution order: no mapping, or track absent from it → clamp
    /// pass-through. Otherwise route to a named bucket, falling back to
    /// the track's GLOBAL bucket, falling back to pass-through.
    ///
    /// # Errors
    ///
    /// `AnalysisError::InvalidInput` for a non-finite raw confidence.
    /// Finite out-of-[0,1] inputs are clamped. The result is always
    /// finite and within [0, 1].
    pub fn calibrate(
        &self,
        raw: f32,
        track: Track,
        features: &RoutingFeatures,
    ) -> Result<f32, AnalysisError> {
        if !raw.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "non-finite raw confidence {} for track {}",
                raw,
                track.as_str()
            )));
        }
        let x = raw.clamp(0.0, 1.0);

        let Some(mapping) = &self.mapping else {
            return Ok(x);
        };
        let Some(track_cal) = mapping.tracks.get(track.as_str()) else {
            log::debug!("No calibration for track '{}', passing through", track.as_str());
            return Ok(x);
        };

        let bucket_key = self.router.route(features);
        let bucket = match track_cal.buckets.get(&bucket_key) {
            Some(bucket) => bucket,
            None => match &track_cal.global {
                Some(global) => global,
                None => {
                    log::debug!(
                        "Track '{}' has neither bucket '{}' nor GLOBAL, passing through",
                        track.as_str(),
                        bucket_key
                    );
                    return Ok(x);
                }
            },
        };

        Ok(apply_bucket(bucket, x))
    }
}

fn apply_bucket(bucket: &Bucket, x: f32) -> f32 {
    // Stage 1: Platt scaling
    let z = bucket.a * x + bucket.b;
    let y1 = match bucket.kind {
        PlattKind::Logistic => 1.0 / (1.0 + (-z).exp()),
        PlattKind::Linear => z.clamp(0.0, 1.0),
    };

    // Stage 2: isotonic interpolation, clamped at the table's endpoints.
    // An empty table passes y1 through unchanged.
    let y2 = interpolate(&bucket.isotonic_x, &bucket.isotonic_y, y1);

    // Stage 3: shrink toward 0.5 by the bucket's uncertainty factor
    let y3 = 0.5 + (y2 - 0.5) * bucket.uncertainty;

    y3.clamp(0.0, 1.0)
}

/// Piecewise-linear interpolation through a non-decreasing table
fn interpolate(xs: &[f32], ys: &[f32], value: f32) -> f32 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return value;
    }
    if value <= xs[0] {
        return ys[0];
    }
    if value >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    for i in 1..xs.len() {
        if value <= xs[i] {
            let dx = xs[i] - xs[i - 1];
            if dx <= 0.0 {
                // Repeated abscissa: step straight to its ordinate
                return ys[i];
            }
            let t = (value - xs[i - 1]) / dx;
            return ys[i - 1] + t * (ys[i] - ys[i - 1]);
        }
    }
    ys[ys.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::CalibrationMapping;

    const MAPPING: &str = r#"{
        "tracks": {
            "functional": {
                "GLOBAL": {
                    "platt": {"a": 2.0, "b": -1.0},
                    "isotonic": {"x": [0.0, 0.5, 1.0], "y": [0.0, 0.45, 1.0]},
                    "uncertainty": {"factor": 0.9}
                },
                "buckets": {
                    "simple_functional": {
                        "platt": {"a": 1.0, "b": 0.0, "kind": "linear"},
                        "isotonic": {"x": [0.0, 1.0], "y": [0.0, 1.0]},
                        "uncertainty": {"factor": 1.0}
                    }
                }
            }
        }
    }"#;

    fn service() -> CalibrationService {
        CalibrationService::new(CalibrationMapping::from_json(MAPPING).unwrap())
    }

    #[test]
    fn test_pass_through_identity() {
        let service = CalibrationService::pass_through();
        let features = RoutingFeatures::default();
        for x in [-1.0, 0.0, 0.25, 0.8, 1.0, 7.5] {
            let y = service.calibrate(x, Track::Functional, &features).unwrap();
            assert_eq!(y, x.clamp(0.0, 1.0));
        }
    }

    #[test]
    fn test_non_finite_raises_typed_error() {
        let service = service();
        let features = RoutingFeatures::default();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = service.calibrate(bad, Track::Functional, &features);
            assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_output_always_in_unit_interval() {
        let service = service();
        let features = RoutingFeatures::default();
        for x in [-5.0, -0.1, 0.0, 0.3, 0.6, 0.99, 1.0, 2.0, 100.0] {
            for track in [Track::Functional, Track::Modal, Track::Chromatic] {
                let y = service.calibrate(x, track, &features).unwrap();
                assert!(y.is_finite());
                assert!((0.0..=1.0).contains(&y), "calibrate({}, {:?}) = {}", x, track, y);
            }
        }
    }

    #[test]
    fn test_deterministic_across_instances() {
        let features = RoutingFeatures {
            modal_marker_count: 2,
            chromatic_ratio: 0.1,
            token_count: 6,
        };
        let a = service().calibrate(0.6, Track::Functional, &features).unwrap();
        let b = service().calibrate(0.6, Track::Functional, &features).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_track_passes_through() {
        // Mapping only covers functional; modal must clamp-pass-through
        let service = service();
        let y = service
            .calibrate(0.7, Track::Modal, &RoutingFeatures::default())
            .unwrap();
        assert_eq!(y, 0.7);
    }

    #[test]
    fn test_bucket_beats_global() {
        let service = service();
        // Routes to "simple_functional": linear identity platt, identity
        // isotonic, factor 1.0 — calibrated equals raw
        let y = service
            .calibrate(0.6, Track::Functional, &RoutingFeatures::default())
            .unwrap();
        assert!((y - 0.6).abs() < 1e-6);

        // Routing features that miss the named bucket hit GLOBAL instead
        let features = RoutingFeatures {
            chromatic_ratio: 0.5,
            ..RoutingFeatures::default()
        };
        let global = service.calibrate(0.6, Track::Functional, &features).unwrap();
        assert!((global - y).abs() > 1e-3);
    }

    #[test]
    fn test_uncertainty_shrinks_toward_half() {
        let text = r#"{"tracks": {"modal": {"GLOBAL": {
            "platt": {"a": 1.0, "b": 0.0, "kind": "linear"},
            "isotonic": {"x": [0.0, 1.0], "y": [0.0, 1.0]},
            "uncertainty": {"factor": 0.5}
        }}}}"#;
        let service = CalibrationService::new(CalibrationMapping::from_json(text).unwrap());
        let y = service
            .calibrate(0.9, Track::Modal, &RoutingFeatures::default())
            .unwrap();
        // 0.5 + (0.9 - 0.5) * 0.5
        assert!((y - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_interpolation_endpoints_clamp() {
        assert_eq!(interpolate(&[0.2, 0.8], &[0.1, 0.9], 0.0), 0.1);
        assert_eq!(interpolate(&[0.2, 0.8], &[0.1, 0.9], 1.0), 0.9);
        let mid = interpolate(&[0.2, 0.8], &[0.1, 0.9], 0.5);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}
