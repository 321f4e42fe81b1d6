//! Error types for the cardscan-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the cardscan library.
#[derive(Error, Debug)]
pub enum CardscanError {
    /// Camera capture error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scan was aborted or superseded before it completed.
    #[error("scan was cancelled")]
    Cancelled,
}

/// Errors related to the camera capture session.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// No camera could be acquired, or access was denied.
    #[error("video device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A frame was requested while no stream is bound.
    #[error("capture session is not active")]
    NotActive,

    /// `start` was called on a session that already holds a stream.
    #[error("capture session is already active")]
    AlreadyActive,

    /// The stream is bound but has not produced a frame yet.
    #[error("no video frame is ready: {0}")]
    FrameNotReady(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The recognizer failed on the submitted frame.
    #[error("text recognition failed: {0}")]
    RecognitionFailed(String),

    /// The recognizer did not answer within the configured timeout.
    #[error("text recognition timed out after {}ms", .0.as_millis())]
    RecognitionTimedOut(Duration),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the cardscan library.
pub type Result<T> = std::result::Result<T, CardscanError>;
