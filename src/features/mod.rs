//! Feature extraction modules
//!
//! Derives structural features from the token stream:
//! - Low-level events (bass motion, pedal points, voice-leading idioms)
//! - Declarative pattern matching (sequence + constraint search)

pub mod events;
pub mod matching;
