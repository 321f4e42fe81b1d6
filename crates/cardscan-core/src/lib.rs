//! Core library for card scanning.
//!
//! This crate provides:
//! - A capture session turning a live video source into a single still frame
//! - An OCR seam with a pure Rust PaddleOCR-based recognizer
//! - Field extraction profiles for contact cards and SPID/contact code pairs
//! - A scan pipeline running recognition as a cancellable, time-bounded task

pub mod capture;
pub mod display;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use capture::{
    CaptureSession, Frame, PreviewSurface, SessionState, StillImageSource, StreamConstraints,
    StreamInfo, VideoSource, VideoStream,
};
pub use display::DetailsTable;
pub use error::{CaptureError, CardscanError, OcrError, Result};
pub use extract::{ExtractionProfile, Field, FieldExtractor, MatchPolicy};
pub use models::config::CardscanConfig;
pub use models::record::ExtractedRecord;
pub use ocr::{EngineMode, RecognitionProgress, RecognizeOptions, RecognizedText, Recognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{ScanOutcome, ScanTask, Scanner};
