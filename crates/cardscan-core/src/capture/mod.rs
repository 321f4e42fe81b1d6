//! Camera capture layer.
//!
//! A [`CaptureSession`] owns one video device for as long as it is active and
//! freezes the current frame of its live stream on demand. Devices are reached
//! through the [`VideoSource`] trait so the session can be driven by a real
//! camera backend, a directory of frames, or a test double.

mod frame;
mod still;

pub use frame::Frame;
pub use still::StillImageSource;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// Constraints passed to a video source when the stream is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConstraints {
    /// Request an audio track alongside video.
    pub audio: bool,

    /// Requested resolution (width, height); `None` uses the device default.
    pub resolution: Option<(u32, u32)>,
}

/// Description of an open stream, handed to the preview surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Human readable device label.
    pub label: String,
    /// Native width of the stream in pixels.
    pub width: u32,
    /// Native height of the stream in pixels.
    pub height: u32,
}

/// A video input device that can be opened into a live stream.
pub trait VideoSource: Send {
    /// Acquire the device and open its live stream.
    fn open(&mut self, constraints: &StreamConstraints)
        -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// A live stream from an acquired video device.
pub trait VideoStream: Send {
    /// Describe the stream.
    fn info(&self) -> StreamInfo;

    /// Read the frame the stream is currently showing.
    fn current_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Release every track of the stream.
    fn stop(&mut self);
}

/// Surface showing the live stream to the user while the session is active.
pub trait PreviewSurface: Send {
    /// Bind a newly opened stream.
    fn attach(&mut self, stream: &StreamInfo);

    /// Unbind the stream.
    fn detach(&mut self);
}

/// Capture session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No stream is bound.
    Idle,
    /// A stream is bound and frames can be captured.
    Active,
}

/// Bridges a live video source to single still frames.
pub struct CaptureSession {
    source: Box<dyn VideoSource>,
    constraints: StreamConstraints,
    stream: Option<Box<dyn VideoStream>>,
    preview: Option<Box<dyn PreviewSurface>>,
}

impl CaptureSession {
    /// Create an idle session over a video source, requesting video only.
    pub fn new(source: impl VideoSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            constraints: StreamConstraints::default(),
            stream: None,
            preview: None,
        }
    }

    /// Set the stream constraints used by `start`.
    pub fn with_constraints(mut self, constraints: StreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Attach a preview surface that is bound on `start` and unbound on `stop`.
    pub fn with_preview(mut self, preview: impl PreviewSurface + 'static) -> Self {
        self.preview = Some(Box::new(preview));
        self
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        if self.stream.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    /// Whether a stream is bound.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Info of the bound stream, if any.
    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.stream.as_ref().map(|s| s.info())
    }

    /// Acquire the video device and bind its stream to the preview.
    pub fn start(&mut self) -> Result<StreamInfo, CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::AlreadyActive);
        }

        let stream = self.source.open(&self.constraints).map_err(|e| {
            warn!("Failed to acquire video device: {}", e);
            e
        })?;

        let info = stream.info();
        info!(
            "Video stream started: {} ({}x{})",
            info.label, info.width, info.height
        );

        if let Some(preview) = self.preview.as_mut() {
            preview.attach(&info);
        }
        self.stream = Some(stream);

        Ok(info)
    }

    /// Freeze the current frame of the bound stream.
    pub fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NotActive)?;
        let frame = stream.current_frame()?;

        debug!("Captured frame: {}x{}", frame.width(), frame.height());

        Ok(frame)
    }

    /// Release the stream. Does nothing when the session is already idle.
    pub fn stop(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            debug!("Capture session already idle");
            return;
        };

        stream.stop();
        if let Some(preview) = self.preview.as_mut() {
            preview.detach();
        }

        info!("Video stream stopped");
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
