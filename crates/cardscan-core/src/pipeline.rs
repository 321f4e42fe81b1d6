//! Capture-to-record scan pipeline.
//!
//! [`Scanner`] freezes a frame from its [`CaptureSession`], hands it to the
//! recognizer on the blocking pool, and maps the recognized text to a record.
//! Recognition runs as a spawned task bounded by a timeout; the returned
//! [`ScanTask`] can be awaited or aborted. Starting a new capture aborts the
//! one in flight, and a result from an older capture never replaces the
//! record of a newer one.
//!
//! A recognizer that ignores the timeout keeps its blocking thread until it
//! returns; its result is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::capture::{CaptureSession, StreamInfo};
use crate::error::{CardscanError, OcrError, Result};
use crate::extract::FieldExtractor;
use crate::models::config::CardscanConfig;
use crate::models::record::ExtractedRecord;
use crate::ocr::{self, RecognizeOptions, RecognizedText, Recognizer};

/// Result of one successful scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    /// Capture counter value this outcome belongs to.
    pub generation: u64,
    /// Full recognized text.
    pub text: RecognizedText,
    /// Fields extracted from the text.
    pub record: ExtractedRecord,
    /// Size of the captured frame (width, height).
    pub frame_size: (u32, u32),
    /// Time spent in recognition and extraction.
    pub processing_time_ms: u64,
    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ScanState {
    generation: u64,
    busy: bool,
    latest: Option<ScanOutcome>,
}

fn lock(state: &Mutex<ScanState>) -> MutexGuard<'_, ScanState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the busy flag when a scan task finishes or is dropped mid-flight.
struct BusyGuard {
    state: Arc<Mutex<ScanState>>,
    generation: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if state.generation == self.generation {
            state.busy = false;
        }
    }
}

/// Store the outcome of a scan unless a newer capture has started since.
fn publish(
    state: &Mutex<ScanState>,
    generation: u64,
    outcome: &Result<ScanOutcome>,
    retain_on_failure: bool,
) {
    let mut state = lock(state);
    if state.generation != generation {
        warn!(
            "Discarding stale scan result (generation {} superseded by {})",
            generation, state.generation
        );
        return;
    }

    match outcome {
        Ok(outcome) => state.latest = Some(outcome.clone()),
        Err(e) => {
            warn!("Scan {} failed: {}", generation, e);
            if !retain_on_failure {
                state.latest = None;
            }
        }
    }
}

/// Handle to an in-flight scan.
pub struct ScanTask {
    generation: u64,
    handle: JoinHandle<Result<ScanOutcome>>,
}

impl ScanTask {
    /// Capture counter value of this scan.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Abort the scan. Awaiting it afterwards yields `Cancelled`.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether the scan has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the scan to finish.
    pub async fn wait(self) -> Result<ScanOutcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(CardscanError::Cancelled),
            Err(e) => Err(OcrError::RecognitionFailed(format!("scan task panicked: {}", e)).into()),
        }
    }
}

/// Drives capture, recognition, and extraction for one camera.
pub struct Scanner {
    session: CaptureSession,
    recognizer: Arc<dyn Recognizer>,
    extractor: FieldExtractor,
    options: RecognizeOptions,
    timeout: Duration,
    binarize: bool,
    stop_after_capture: bool,
    retain_on_failure: bool,
    state: Arc<Mutex<ScanState>>,
    in_flight: Option<AbortHandle>,
}

impl Scanner {
    /// Create a scanner with default options.
    pub fn new(session: CaptureSession, recognizer: Arc<dyn Recognizer>) -> Self {
        Self::from_config(session, recognizer, &CardscanConfig::default())
    }

    /// Create a scanner configured from the OCR, capture, and extraction sections.
    pub fn from_config(
        session: CaptureSession,
        recognizer: Arc<dyn Recognizer>,
        config: &CardscanConfig,
    ) -> Self {
        Self {
            session,
            recognizer,
            extractor: config.extractor(),
            options: config.recognize_options(),
            timeout: config.ocr_timeout(),
            binarize: config.ocr.binarize,
            stop_after_capture: config.capture.stop_after_capture,
            retain_on_failure: config.extraction.retain_on_failure,
            state: Arc::new(Mutex::new(ScanState::default())),
            in_flight: None,
        }
    }

    /// Set the field extractor.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set the recognition options.
    pub fn with_options(mut self, options: RecognizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the recognition timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Binarize frames before recognition.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Release the camera right after each capture.
    pub fn with_stop_after_capture(mut self, stop: bool) -> Self {
        self.stop_after_capture = stop;
        self
    }

    /// Keep the previous record when a scan fails.
    pub fn with_retain_on_failure(mut self, retain: bool) -> Self {
        self.retain_on_failure = retain;
        self
    }

    /// The capture session.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// The field extractor.
    pub fn extractor(&self) -> FieldExtractor {
        self.extractor
    }

    /// Start the camera.
    pub fn start(&mut self) -> Result<StreamInfo> {
        Ok(self.session.start()?)
    }

    /// Release the camera. Does not affect a scan already in flight.
    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Whether a scan of the current generation is running.
    pub fn is_busy(&self) -> bool {
        lock(&self.state).busy
    }

    /// Current capture counter.
    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    /// Outcome of the latest successful scan still on display.
    pub fn latest(&self) -> Option<ScanOutcome> {
        lock(&self.state).latest.clone()
    }

    /// Abort the scan in flight, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            lock(&self.state).busy = false;
            debug!("Cancelled in-flight scan");
        }
    }

    /// Capture a frame and start recognizing it.
    ///
    /// Must be called from within a tokio runtime. Aborts the previous scan
    /// if it is still running.
    pub fn capture(&mut self) -> Result<ScanTask> {
        let frame = self.session.capture_frame()?;
        if self.stop_after_capture {
            self.session.stop();
        }

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
            debug!("Superseding in-flight scan");
        }

        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.busy = true;
            state.generation
        };

        let recognizer = Arc::clone(&self.recognizer);
        let options = self.options.clone();
        let extractor = self.extractor;
        let timeout = self.timeout;
        let binarize = self.binarize;
        let retain_on_failure = self.retain_on_failure;
        let state = Arc::clone(&self.state);

        info!(
            "Scan {} started: {}x{} frame, {} recognizer",
            generation,
            frame.width(),
            frame.height(),
            recognizer.name()
        );

        // Owned by the task so an abort clears the flag even before the first poll.
        let guard = BusyGuard {
            state: Arc::clone(&state),
            generation,
        };

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let start = Instant::now();
            let frame_size = frame.dimensions();

            let job = tokio::task::spawn_blocking(move || {
                let frame = if binarize { ocr::binarize(&frame)? } else { frame };
                recognizer.recognize(&frame, &options)
            });

            let recognized = match tokio::time::timeout(timeout, job).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(OcrError::RecognitionFailed(format!(
                    "recognizer panicked: {}",
                    e
                ))),
                Err(_) => Err(OcrError::RecognitionTimedOut(timeout)),
            };

            let outcome = recognized
                .map(|text| {
                    let record = extractor.extract(text.as_str());
                    let processing_time_ms = start.elapsed().as_millis() as u64;
                    info!(
                        "Scan {} complete: {} of {} fields in {}ms",
                        generation,
                        record.filled(),
                        extractor.profile().fields().len(),
                        processing_time_ms
                    );
                    ScanOutcome {
                        generation,
                        text,
                        record,
                        frame_size,
                        processing_time_ms,
                        scanned_at: Utc::now(),
                    }
                })
                .map_err(CardscanError::from);

            publish(&state, generation, &outcome, retain_on_failure);
            outcome
        });

        self.in_flight = Some(handle.abort_handle());

        Ok(ScanTask { generation, handle })
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.cancel();
    }
}
