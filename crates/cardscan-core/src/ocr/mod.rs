//! OCR seam.
//!
//! The pipeline talks to text recognition only through the [`Recognizer`]
//! trait: a frame goes in, the full recognized text comes out. The bundled
//! [`PureOcrEngine`] runs PaddleOCR models through `pure-onnx-ocr`.

mod layout;
mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use layout::{TextBox, assemble_text};
pub use preprocessing::binarize;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::Frame;
use crate::error::OcrError;

/// Text recognizer used by the scan pipeline.
pub trait Recognizer: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognize all text on the frame.
    fn recognize(
        &self,
        frame: &Frame,
        options: &RecognizeOptions,
    ) -> Result<RecognizedText, OcrError>;
}

/// How the recognizer arranges detected text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Emit each detected text region on its own line.
    #[default]
    NoLayoutAnalysis,
    /// Merge regions sharing a visual row into one line.
    ReadingOrder,
}

/// A progress event reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionProgress {
    /// What the recognizer is doing.
    pub status: String,
    /// Completion in the range 0.0 - 1.0.
    pub progress: f32,
}

/// Callback receiving progress events.
pub type ProgressLogger = Arc<dyn Fn(&RecognitionProgress) + Send + Sync>;

/// Options for a single recognition call.
#[derive(Clone)]
pub struct RecognizeOptions {
    /// Target language code (e.g. "eng").
    pub language: String,
    /// Engine mode.
    pub engine_mode: EngineMode,
    progress: Option<ProgressLogger>,
}

impl RecognizeOptions {
    /// Options for a language with the default engine mode and no logger.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            engine_mode: EngineMode::default(),
            progress: None,
        }
    }

    /// Set the engine mode.
    pub fn with_engine_mode(mut self, mode: EngineMode) -> Self {
        self.engine_mode = mode;
        self
    }

    /// Set a progress logger.
    pub fn with_progress(
        mut self,
        logger: impl Fn(&RecognitionProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(logger));
        self
    }

    /// Log progress events at debug level.
    pub fn with_tracing_progress(self) -> Self {
        self.with_progress(|event| {
            debug!("OCR {}: {:.0}%", event.status, event.progress * 100.0);
        })
    }

    /// Report progress to the logger, if any.
    pub fn report(&self, status: &str, progress: f32) {
        if let Some(logger) = &self.progress {
            logger(&RecognitionProgress {
                status: status.to_string(),
                progress: progress.clamp(0.0, 1.0),
            });
        }
    }
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl fmt::Debug for RecognizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizeOptions")
            .field("language", &self.language)
            .field("engine_mode", &self.engine_mode)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Full-document OCR output for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognizedText(String);

impl RecognizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lines split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.split('\n')
    }

    /// Lines that are not empty.
    pub fn non_empty_lines(&self) -> impl Iterator<Item = &str> {
        self.lines().filter(|l| !l.is_empty())
    }

    /// Whether the text contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RecognizedText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RecognizedText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for RecognizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecognizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_progress_is_reported_and_clamped() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let options = RecognizeOptions::new("eng")
            .with_progress(move |e| sink.lock().unwrap().push(e.progress));

        options.report("loading", -1.0);
        options.report("recognizing", 0.5);
        options.report("done", 3.0);

        assert_eq!(*events.lock().unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_report_without_logger_is_silent() {
        RecognizeOptions::default().report("noop", 0.5);
    }

    #[test]
    fn test_non_empty_lines() {
        let text = RecognizedText::from("ACME\n\nJohn Smith\n");
        assert_eq!(text.non_empty_lines().collect::<Vec<_>>(), vec!["ACME", "John Smith"]);
        assert!(!text.is_blank());
        assert!(RecognizedText::from(" \n\t").is_blank());
    }
}
