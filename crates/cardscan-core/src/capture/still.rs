//! Video source backed by still images on disk.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use super::{Frame, StreamConstraints, StreamInfo, VideoSource, VideoStream};
use crate::error::CaptureError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

/// A video device emulated by an image file or a directory of frames.
///
/// A directory is replayed as a live feed: frames are read in file-name order,
/// one per capture, wrapping around after the last one.
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    /// Create a source for an image file or a directory of images.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// List the frame files behind this source.
    fn frame_paths(&self) -> Result<Vec<PathBuf>, CaptureError> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        if !self.path.is_dir() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no such device: {}",
                self.path.display()
            )));
        }

        let entries = fs::read_dir(&self.path).map_err(|e| {
            CaptureError::DeviceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no frames in {}",
                self.path.display()
            )));
        }

        Ok(paths)
    }
}

impl VideoSource for StillImageSource {
    fn open(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, CaptureError> {
        if constraints.audio {
            return Err(CaptureError::DeviceUnavailable(
                "still image source has no audio track".to_string(),
            ));
        }

        let frames = self.frame_paths()?;
        let first = load(&frames[0], constraints.resolution).map_err(|e| match e {
            CaptureError::FrameNotReady(msg) => CaptureError::DeviceUnavailable(msg),
            other => other,
        })?;
        let (width, height) = first.dimensions();

        debug!(
            "Opened still image source {} with {} frame(s)",
            self.path.display(),
            frames.len()
        );

        Ok(Box::new(StillImageStream {
            label: self.path.display().to_string(),
            frames,
            cursor: 0,
            resolution: constraints.resolution,
            size: (width, height),
            stopped: false,
        }))
    }
}

struct StillImageStream {
    label: String,
    frames: Vec<PathBuf>,
    cursor: usize,
    resolution: Option<(u32, u32)>,
    size: (u32, u32),
    stopped: bool,
}

impl VideoStream for StillImageStream {
    fn info(&self) -> StreamInfo {
        StreamInfo {
            label: self.label.clone(),
            width: self.size.0,
            height: self.size.1,
        }
    }

    fn current_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.stopped {
            return Err(CaptureError::FrameNotReady("stream stopped".to_string()));
        }

        let path = &self.frames[self.cursor];
        let image = load(path, self.resolution)?;
        self.cursor = (self.cursor + 1) % self.frames.len();

        Ok(Frame::from_image(&image))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load(path: &Path, resolution: Option<(u32, u32)>) -> Result<DynamicImage, CaptureError> {
    let image = image::open(path)
        .map_err(|e| CaptureError::FrameNotReady(format!("{}: {}", path.display(), e)))?;

    Ok(match resolution {
        Some((w, h)) if image.dimensions() != (w, h) => {
            image.resize_exact(w, h, image::imageops::FilterType::Triangle)
        }
        _ => image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureSession, SessionState};
    use crate::error::CaptureError;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        DynamicImage::new_rgb8(width, height)
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_missing_path_is_unavailable() {
        let mut session = CaptureSession::new(StillImageSource::new("/nonexistent/camera0"));
        assert!(matches!(
            session.start(),
            Err(CaptureError::DeviceUnavailable(_))
        ));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut session = CaptureSession::new(StillImageSource::new(dir.path()));
        assert!(matches!(
            session.start(),
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_undecodable_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        fs::write(&path, b"not a png").unwrap();

        let mut session = CaptureSession::new(StillImageSource::new(&path));
        assert!(matches!(
            session.start(),
            Err(CaptureError::DeviceUnavailable(_))
        ));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_audio_request_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 4, 4);

        let mut session = CaptureSession::new(StillImageSource::new(dir.path()))
            .with_constraints(StreamConstraints {
                audio: true,
                resolution: None,
            });
        assert!(matches!(
            session.start(),
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_directory_replays_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 20, 10);
        write_png(dir.path(), "a.png", 10, 5);

        let mut session = CaptureSession::new(StillImageSource::new(dir.path()));
        let info = session.start().unwrap();
        assert_eq!((info.width, info.height), (10, 5));

        assert_eq!(session.capture_frame().unwrap().dimensions(), (10, 5));
        assert_eq!(session.capture_frame().unwrap().dimensions(), (20, 10));
        assert_eq!(session.capture_frame().unwrap().dimensions(), (10, 5));
    }

    #[test]
    fn test_resolution_constraint_resizes() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "card.png", 64, 48);

        let mut session = CaptureSession::new(StillImageSource::new(dir.path().join("card.png")))
            .with_constraints(StreamConstraints {
                audio: false,
                resolution: Some((32, 24)),
            });
        session.start().unwrap();

        assert_eq!(session.capture_frame().unwrap().dimensions(), (32, 24));
    }
}
