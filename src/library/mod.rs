//! Load-time parsing and validation of external configuration
//!
//! Three files drive the engine: the pattern library, the style profile
//! library, and the calibration mapping. All three are parsed with serde,
//! then checked by an explicit validation pass that reports
//! field-path-qualified `SchemaValidation` errors. Validation failures
//! are fatal at load; after a successful load everything here is
//! immutable and the hot path performs no further I/O.

pub mod calibration;
pub mod patterns;
pub mod profiles;

pub use calibration::{Bucket, CalibrationMapping, PlattKind, TrackCalibration};
pub use patterns::{PatternLibrary, DEFAULT_MAX_WINDOW};
pub use profiles::{Profile, ProfileLibrary, TypicalityTable};
