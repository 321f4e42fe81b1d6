//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::capture::Frame;
use crate::error::OcrError;
use crate::models::config::CardscanConfig;

use super::{RecognizeOptions, RecognizedText, Recognizer, TextBox, assemble_text};

/// Language codes the bundled Latin recognition model can read.
const LATIN_LANGUAGES: &[&str] = &[
    "eng", "deu", "fra", "spa", "ita", "por", "nld", "pol", "ces", "swe", "nor", "dan", "fin",
    "lat",
];

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(
        model_dir: &Path,
        detection_model: &str,
        recognition_model: &str,
        dictionary: &str,
    ) -> Result<Self, OcrError> {
        Self::from_paths(
            &model_dir.join(detection_model),
            &model_dir.join(recognition_model),
            &model_dir.join(dictionary),
        )
    }

    /// Create an engine from explicit detection, recognition, and dictionary paths.
    pub fn from_paths(det_path: &Path, rec_path: &Path, dict_path: &Path) -> Result<Self, OcrError> {
        for path in [det_path, rec_path, dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_path)
            .rec_model_path(rec_path)
            .dictionary_path(dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", rec_path.display());

        Ok(Self {
            engine,
            keep_unk: false,
        })
    }

    /// Create an engine from the model and OCR sections of a configuration.
    pub fn from_config(config: &CardscanConfig) -> Result<Self, OcrError> {
        let engine = Self::from_paths(
            &config.model_path(&config.models.detection_model),
            &config.model_path(&config.models.recognition_model),
            &config.model_path(&config.models.dictionary),
        )?;
        Ok(engine.with_keep_unk(config.ocr.keep_unk))
    }

    /// Keep `[UNK]` tokens in the output.
    pub fn with_keep_unk(mut self, keep_unk: bool) -> Self {
        self.keep_unk = keep_unk;
        self
    }
}

impl Recognizer for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(
        &self,
        frame: &Frame,
        options: &RecognizeOptions,
    ) -> Result<RecognizedText, OcrError> {
        if !LATIN_LANGUAGES.contains(&options.language.as_str()) {
            return Err(OcrError::RecognitionFailed(format!(
                "language '{}' is not supported by the Latin recognition model",
                options.language
            )));
        }

        let start = Instant::now();
        options.report("initializing", 0.0);

        let image = frame.to_image()?;
        options.report("recognizing text", 0.1);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::RecognitionFailed(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());
        options.report("recognizing text", 0.9);

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox::new(text, polygon_to_rect(&r.bounding_box), r.confidence)
            })
            .collect();

        let text = assemble_text(boxes, options.engine_mode);
        options.report("done", 1.0);

        info!(
            "OCR complete: {} regions, {} chars in {}ms",
            results.len(),
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(RecognizedText::new(text))
    }
}

/// Convert a `Polygon<f64>` to axis-aligned (min_x, min_y, max_x, max_y) bounds.
fn polygon_to_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    let mut rect = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for coord in polygon.exterior().coords() {
        rect.0 = rect.0.min(coord.x as f32);
        rect.1 = rect.1.min(coord.y as f32);
        rect.2 = rect.2.max(coord.x as f32);
        rect.3 = rect.3.max(coord.y as f32);
    }
    rect
}
