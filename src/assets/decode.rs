use std::io::Cursor;

use anyhow::Context;
use image::{AnimationDecoder, ImageDecoder};

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::model::raster::{GifAnimation, GifFrame, Raster};

/// Frame delay used when a GIF frame declares none.
pub const DEFAULT_GIF_DELAY_MS: u32 = 100;

/// Decode PNG/JPEG/WebP (or the first GIF frame) into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> CanvasResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Raster::from_premul(width, height, rgba8_premul)
        .ok_or_else(|| CanvasError::asset("decoded image has an unexpected byte length"))
}

/// Decode every frame of a GIF, composed to full-canvas RGBA.
pub fn decode_gif(bytes: &[u8]) -> CanvasResult<GifAnimation> {
    let decoder =
        image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).context("parse gif header")?;
    let (width, height) = decoder.dimensions();
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;
    if frames.is_empty() {
        return Err(CanvasError::asset("gif contains no frames"));
    }

    let frames = frames
        .into_iter()
        .map(|frame| {
            let (num, den) = frame.delay().numer_denom_ms();
            let delay_ms = if den == 0 { 0 } else { num / den };
            let buffer = frame.into_buffer();
            let (w, h) = buffer.dimensions();
            let mut rgba8_premul = buffer.into_raw();
            premultiply_rgba8_in_place(&mut rgba8_premul);
            let raster = Raster::from_premul(w, h, rgba8_premul)
                .ok_or_else(|| CanvasError::asset("gif frame has an unexpected byte length"))?;
            Ok(GifFrame {
                raster,
                delay_ms: if delay_ms == 0 {
                    DEFAULT_GIF_DELAY_MS
                } else {
                    delay_ms
                },
            })
        })
        .collect::<CanvasResult<Vec<_>>>()?;

    tracing::debug!(width, height, frames = frames.len(), "decoded gif");
    Ok(GifAnimation {
        width,
        height,
        frames,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
