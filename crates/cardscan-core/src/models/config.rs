//! Configuration structures for the scan pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::StreamConstraints;
use crate::error::{CardscanError, Result};
use crate::extract::{ExtractionProfile, FieldExtractor, MatchPolicy};
use crate::ocr::{EngineMode, RecognizeOptions};

/// Main configuration for cardscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardscanConfig {
    /// Camera capture configuration.
    pub capture: CaptureConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// Camera capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Requested resolution (width, height); `None` keeps the device default.
    pub resolution: Option<(u32, u32)>,

    /// Release the camera as soon as a frame has been captured.
    pub stop_after_capture: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            stop_after_capture: true,
        }
    }
}

/// OCR configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Target language code.
    pub language: String,

    /// Engine mode passed to the recognizer.
    pub engine_mode: EngineMode,

    /// Give up on recognition after this many milliseconds.
    pub timeout_ms: u64,

    /// Binarize frames (grayscale + Otsu threshold) before recognition.
    pub binarize: bool,

    /// Keep `[UNK]` tokens in recognized text instead of replacing them with spaces.
    pub keep_unk: bool,

    /// Log recognizer progress events.
    pub log_progress: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            engine_mode: EngineMode::NoLayoutAnalysis,
            timeout_ms: 30_000,
            binarize: false,
            keep_unk: false,
            log_progress: false,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extraction profile.
    pub profile: ExtractionProfile,

    /// Matching policy override; `None` uses the profile default.
    pub policy: Option<MatchPolicy>,

    /// Keep the previous record when a scan fails instead of clearing it.
    pub retain_on_failure: bool,
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl CardscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CardscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CardscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }

    /// Stream constraints for the capture session.
    pub fn stream_constraints(&self) -> StreamConstraints {
        StreamConstraints {
            audio: false,
            resolution: self.capture.resolution,
        }
    }

    /// Recognition timeout.
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr.timeout_ms)
    }

    /// Options passed to the recognizer.
    pub fn recognize_options(&self) -> RecognizeOptions {
        let options = RecognizeOptions::new(&self.ocr.language).with_engine_mode(self.ocr.engine_mode);
        if self.ocr.log_progress {
            options.with_tracing_progress()
        } else {
            options
        }
    }

    /// Field extractor for the configured profile and policy.
    pub fn extractor(&self) -> FieldExtractor {
        let extractor = FieldExtractor::new(self.extraction.profile);
        match self.extraction.policy {
            Some(policy) => extractor.with_policy(policy),
            None => extractor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CardscanConfig::default();

        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.engine_mode, EngineMode::NoLayoutAnalysis);
        assert_eq!(config.ocr_timeout(), Duration::from_secs(30));
        assert!(config.capture.stop_after_capture);
        assert_eq!(config.stream_constraints(), StreamConstraints::default());
        assert_eq!(config.extractor(), FieldExtractor::new(ExtractionProfile::ContactCard));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "extraction": { "profile": "code_pair", "policy": "first" }, "ocr": { "timeout_ms": 500 } }"#,
        )
        .unwrap();

        let config = CardscanConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.profile, ExtractionProfile::CodePair);
        assert_eq!(config.extractor().policy(), MatchPolicy::First);
        assert_eq!(config.ocr_timeout(), Duration::from_millis(500));
        assert_eq!(config.ocr.language, "eng");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CardscanConfig::default();
        config.capture.resolution = Some((1280, 720));
        config.save(&path).unwrap();

        let loaded = CardscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.capture.resolution, Some((1280, 720)));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            CardscanConfig::from_file(&path),
            Err(CardscanError::Config(_))
        ));
    }
}
