use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::surface::FrameRgba8;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    /// Display time of every frame.
    pub frame_delay_ms: u32,
    pub frame_count: usize,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing indices between one `begin` and one `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> CanvasResult<()>;
    fn push_frame(&mut self, idx: usize, frame: &FrameRgba8) -> CanvasResult<()>;
    fn end(&mut self) -> CanvasResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(usize, FrameRgba8)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(usize, FrameRgba8)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CanvasResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &FrameRgba8) -> CanvasResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CanvasResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Encode straight RGBA8 pixels as PNG bytes.
pub fn encode_png_rgba8(width: u32, height: u32, rgba8: &[u8]) -> CanvasResult<Vec<u8>> {
    use image::ImageEncoder;

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(rgba8, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| CanvasError::encode(format!("png encode failed: {e}")))?;
    Ok(out)
}

/// Writes frames as PNG files: frame 0 to `path`, later frames to `<stem>-<idx>.png` beside it.
#[derive(Debug)]
pub struct PngFileSink {
    path: PathBuf,
    written: Vec<PathBuf>,
}

impl PngFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, idx: usize) -> PathBuf {
        if idx == 0 {
            return self.path.clone();
        }
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        parent.join(format!("{stem}-{idx}.png"))
    }
}

impl FrameSink for PngFileSink {
    fn begin(&mut self, _cfg: SinkConfig) -> CanvasResult<()> {
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &FrameRgba8) -> CanvasResult<()> {
        let path = self.path_for(idx);
        let (w, h) = (frame.width, frame.height);
        let bytes = encode_png_rgba8(w, h, &frame.clone().into_straight())?;
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote png frame");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> CanvasResult<()> {
        Ok(())
    }
}

/// Streams frames into an infinitely looping GIF.
///
/// The GIF trailer is written and the writer flushed by [`FrameSink::end`]; failures there are
/// reported. Frames pushed after that are rejected.
pub struct GifSink<W: Write> {
    writer: Option<W>,
    encoder: Option<gif::Encoder<W>>,
    delay_cs: u16,
}

impl<W: Write> GifSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            encoder: None,
            delay_cs: 10,
        }
    }
}

fn gif_dim(v: u32) -> CanvasResult<u16> {
    u16::try_from(v).map_err(|_| CanvasError::encode(format!("gif dimension {v} exceeds 65535")))
}

impl<W: Write> FrameSink for GifSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> CanvasResult<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| CanvasError::encode("gif sink can only be used once"))?;
        let mut encoder = gif::Encoder::new(writer, gif_dim(cfg.width)?, gif_dim(cfg.height)?, &[])
            .map_err(|e| CanvasError::encode(format!("gif header failed: {e}")))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| CanvasError::encode(format!("gif header failed: {e}")))?;
        self.encoder = Some(encoder);
        // GIF delays are centiseconds.
        self.delay_cs = u16::try_from(cfg.frame_delay_ms.div_ceil(10)).unwrap_or(u16::MAX);
        Ok(())
    }

    fn push_frame(&mut self, _idx: usize, frame: &FrameRgba8) -> CanvasResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| CanvasError::encode("gif sink is not open"))?;
        let (w, h) = (gif_dim(frame.width)?, gif_dim(frame.height)?);
        let mut rgba = frame.clone().into_straight();
        if rgba.len() != usize::from(w) * usize::from(h) * 4 {
            return Err(CanvasError::encode("frame byte length does not match its size"));
        }
        let mut out = gif::Frame::from_rgba_speed(w, h, &mut rgba, 10);
        out.delay = self.delay_cs;
        out.dispose = gif::DisposalMethod::Background;
        encoder
            .write_frame(&out)
            .map_err(|e| CanvasError::encode(format!("gif frame encode failed: {e}")))
    }

    fn end(&mut self) -> CanvasResult<()> {
        let Some(encoder) = self.encoder.take() else {
            return Ok(());
        };
        let mut writer = encoder
            .into_inner()
            .map_err(|e| CanvasError::encode(format!("gif trailer failed: {e}")))?;
        writer
            .flush()
            .map_err(|e| CanvasError::encode(format!("gif flush failed: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
