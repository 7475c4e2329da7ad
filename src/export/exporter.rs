use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;

use crate::config::EditorConfig;
use crate::export::sink::{FrameSink, GifSink, SinkConfig, encode_png_rgba8};
use crate::foundation::error::CanvasResult;
use crate::model::element::Element;
use crate::model::layer::Layer;
use crate::render::compositor::{Compositor, CompositorOpts};
use crate::render::surface::Surface;
use crate::store::state::CanvasState;

/// `<configured default name>.<ext>`
pub fn default_file_name(config: &EditorConfig, ext: &str) -> String {
    config.default_file_name(ext)
}

/// PNG bytes of a rendered surface.
pub fn encode_png(surface: &Surface) -> CanvasResult<Vec<u8>> {
    encode_png_rgba8(surface.width(), surface.height(), &surface.to_straight_rgba8())
}

fn snapshot(layers: &[Layer], width: u32, height: u32) -> CanvasState {
    let mut state = CanvasState::with_size(width, height);
    state.layers = layers.to_vec();
    state
}

/// Render `layers` once off-screen and encode as PNG.
#[tracing::instrument(skip(compositor, layers), fields(layers = layers.len()))]
pub fn export_static(
    compositor: &mut Compositor,
    layers: &[Layer],
    width: u32,
    height: u32,
) -> CanvasResult<Vec<u8>> {
    let mut surface = Surface::new(width, height)?;
    compositor.render_with(&mut surface, &snapshot(layers, width, height), CompositorOpts::export())?;
    encode_png(&surface)
}

pub fn export_static_file(
    compositor: &mut Compositor,
    layers: &[Layer],
    width: u32,
    height: u32,
    path: &Path,
) -> CanvasResult<()> {
    let bytes = export_static(compositor, layers, width, height)?;
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "exported png");
    Ok(())
}

/// Render `frame_count` frames into `sink`.
///
/// Frame `i` shows every animated element at `i % its frame count`. The caller's layers are not
/// modified.
#[tracing::instrument(skip(compositor, layers, sink), fields(layers = layers.len()))]
pub fn export_gif(
    compositor: &mut Compositor,
    layers: &[Layer],
    width: u32,
    height: u32,
    frame_count: usize,
    frame_delay_ms: u32,
    sink: &mut dyn FrameSink,
) -> CanvasResult<()> {
    let mut state = snapshot(layers, width, height);
    let mut surface = Surface::new(width, height)?;

    sink.begin(SinkConfig {
        width,
        height,
        frame_delay_ms,
        frame_count,
    })?;
    for frame in 0..frame_count {
        set_animation_frame(&mut state.layers, frame);
        compositor.render_with(&mut surface, &state, CompositorOpts::export())?;
        sink.push_frame(frame, &surface.to_frame())?;
    }
    sink.end()
}

pub fn export_gif_file(
    compositor: &mut Compositor,
    layers: &[Layer],
    width: u32,
    height: u32,
    frame_count: usize,
    frame_delay_ms: u32,
    path: &Path,
) -> CanvasResult<()> {
    let file = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut sink = GifSink::new(BufWriter::new(file));
    export_gif(
        compositor,
        layers,
        width,
        height,
        frame_count,
        frame_delay_ms,
        &mut sink,
    )?;
    tracing::info!(path = %path.display(), frame_count, "exported gif");
    Ok(())
}

fn set_animation_frame(layers: &mut [Layer], frame: usize) {
    for a in layers
        .iter_mut()
        .flat_map(|l| l.elements.iter_mut())
        .filter_map(Element::as_animated_mut)
    {
        let count = a.frames.len();
        if count > 0 {
            a.current_frame = frame % count;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
