//! Webcam capture, cascade nose detection, and the camera-to-background
//! transform.
//!
//! Detection runs on the raw captured frame, so the flap threshold is
//! measured in camera pixels and does not depend on the terminal size. The
//! display path is one fixed pipeline: resize to the buffer dimensions,
//! BGR→RGB, horizontal mirror. Both `Mat` and the pixel buffer are
//! row-major, so no further orientation step is needed.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use opencv::{
    core::{self, Mat, Rect, Scalar, Size, Vector},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::render::{PixelBuf, Rgb};

const SCALE_FACTOR: f64 = 1.3;
const MIN_NEIGHBORS: i32 = 5;

pub struct Camera {
    cap: VideoCapture,
}

impl Camera {
    pub fn open(index: i32) -> Result<Self> {
        let cap = VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("opening camera {index}"))?;
        if !cap.is_opened().context("querying camera state")? {
            bail!("camera {index} is not available");
        }
        info!("opened camera {index}");
        Ok(Self { cap })
    }

    /// Read the next frame. Returns false for a failed or empty read; the
    /// caller skips the tick and tries again.
    pub fn grab(&mut self, frame: &mut Mat) -> opencv::Result<bool> {
        Ok(self.cap.read(frame)? && !frame.empty())
    }

    pub fn release(&mut self) -> opencv::Result<()> {
        self.cap.release()
    }
}

pub struct NoseFinder {
    cascade: CascadeClassifier,
}

impl NoseFinder {
    pub fn load(path: &Path) -> Result<Self> {
        let mut cascade = CascadeClassifier::default().context("creating cascade classifier")?;
        let loaded = cascade
            .load(&path.to_string_lossy())
            .with_context(|| format!("reading cascade model {}", path.display()))?;
        if !loaded {
            bail!("cascade model {} failed to load", path.display());
        }
        info!("loaded cascade model {}", path.display());
        Ok(Self { cascade })
    }

    /// Run the cascade over a grayscale copy of the frame and return the
    /// first box, if any. Detections are per-frame; there is no matching or
    /// smoothing across frames.
    pub fn detect(&mut self, frame: &Mat) -> opencv::Result<Option<Rect>> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        let mut noses = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            &gray,
            &mut noses,
            SCALE_FACTOR,
            MIN_NEIGHBORS,
            0,
            Size::default(),
            Size::default(),
        )?;
        Ok(noses.iter().next())
    }
}

/// Vertical center of a detection, in camera pixels.
pub fn nose_center_y(nose: Rect) -> i32 {
    nose.y + nose.height / 2
}

/// Outline the detection on the raw frame, before the background transform,
/// so the overlay is scaled and mirrored together with the feed.
pub fn draw_nose_box(frame: &mut Mat, nose: Rect) -> opencv::Result<()> {
    let blue = Scalar::new(255.0, 0.0, 0.0, 0.0); // BGR
    imgproc::rectangle(frame, nose, blue, 2, imgproc::LINE_8, 0)
}

/// Fixed transform pipeline from a captured BGR frame into the render
/// buffer: resize to the buffer dimensions, convert BGR→RGB, mirror
/// horizontally, copy row-major.
pub fn background_into(frame: &Mat, buf: &mut PixelBuf) -> Result<()> {
    if buf.w == 0 || buf.h == 0 {
        return Ok(());
    }
    let mut scaled = Mat::default();
    imgproc::resize_def(frame, &mut scaled, Size::new(buf.w as i32, buf.h as i32))?;
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(&scaled, &mut rgb, imgproc::COLOR_BGR2RGB)?;
    let mut mirrored = Mat::default();
    core::flip(&rgb, &mut mirrored, 1)?;

    let data = mirrored.data_bytes().context("reading frame pixels")?;
    for (px, rgb) in buf.pixels_mut().iter_mut().zip(data.chunks_exact(3)) {
        *px = Rgb(rgb[0], rgb[1], rgb[2]);
    }
    Ok(())
}
