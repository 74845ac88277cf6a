//! Analysis and result aggregation modules
//!
//! Combines pattern evidence into the final interpretation:
//! - Style-aware confidence aggregation
//! - Statistical calibration
//! - Functional-vs-modal arbitration
//! - Result types

pub mod arbitration;
pub mod calibration;
pub mod confidence;
pub mod result;
