//! `blinkmorse` - Decode Morse code from eye blinks
//!
//! A face source streams face-bounding-box observations; blinks are inferred
//! from the face disappearing (or appearing), timed on a fixed sampling tick,
//! classified into dots and dashes, and resolved into letters.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod decoder;
pub mod detector;
pub mod error;
pub mod logging;
pub mod morse;
pub mod source;

pub use config::Config;
pub use decoder::{Decoder, DecoderConfig, DecoderEvent, DecoderState, Snapshot};
pub use detector::{BlinkDetector, DetectorConfig, DetectorHandle};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use morse::{Glyph, Symbol, SymbolSequence};
pub use source::{Calibration, FaceObservation, FaceSource, TraceSource};
