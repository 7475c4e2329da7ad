use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Decoded raster in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Raster {
    /// Wrap premultiplied bytes; returns `None` if the length does not match `width * height * 4`.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba8_premul.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// A raster filled with a single premultiplied pixel value.
    pub fn solid(width: u32, height: u32, px: [u8; 4]) -> Self {
        let n = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px.repeat(n)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Image reference whose pixels may still be loading.
///
/// Only `src` is persisted; `raster` is attached once decoding completes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub src: String,
    #[serde(skip)]
    pub raster: Option<Arc<Raster>>,
}

impl ImageSource {
    pub fn pending(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            raster: None,
        }
    }

    pub fn loaded(src: impl Into<String>, raster: Raster) -> Self {
        Self {
            src: src.into(),
            raster: Some(Arc::new(raster)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.raster.is_some()
    }
}

/// One decoded GIF frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GifFrame {
    pub raster: Raster,
    pub delay_ms: u32,
}

/// Decoded GIF: full-canvas frames in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GifAnimation {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<GifFrame>,
}

impl GifAnimation {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Mean frame rate implied by the frame delays, if any delay is set.
    pub fn natural_frame_rate(&self) -> Option<f64> {
        if self.frames.is_empty() {
            return None;
        }
        let total: u64 = self.frames.iter().map(|f| u64::from(f.delay_ms)).sum();
        if total == 0 {
            return None;
        }
        Some(1000.0 * self.frames.len() as f64 / total as f64)
    }
}
