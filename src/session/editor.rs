use std::path::Path;

use crate::animation::clock::AnimationClock;
use crate::assets::decode::{decode_gif, decode_image};
use crate::assets::manifest::ManifestEntry;
use crate::assets::upload::UploadKind;
use crate::config::EditorConfig;
use crate::export::exporter::{export_gif, export_gif_file, export_static, export_static_file};
use crate::export::sink::FrameSink;
use crate::foundation::core::Point;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::model::element::{Element, TextElement};
use crate::model::ids::ElementId;
use crate::model::layer::paint_order;
use crate::model::raster::{GifAnimation, ImageSource, Raster};
use crate::persist::storage::{StateStorage, hydrate, persist_listener};
use crate::render::compositor::{Compositor, CompositorOpts};
use crate::render::hit_test::{contains_inclusive, is_point_in_text, resize_handle_rect};
use crate::render::surface::Surface;
use crate::store::canvas_store::CanvasStore;
use crate::store::state::CanvasState;

/// Keys the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Undo,
    Redo,
}

/// One editing session: owns the store, the animation clock and the compositor.
pub struct Editor {
    config: EditorConfig,
    store: CanvasStore,
    clock: AnimationClock,
    compositor: Compositor,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let store = CanvasStore::new(&config);
        Self::assemble(config, store)
    }

    /// Hydrate from `storage` and persist every subsequent change back to it.
    pub fn with_storage<S: StateStorage + 'static>(config: EditorConfig, storage: S) -> Self {
        let initial = hydrate(&storage, &config);
        let mut store = CanvasStore::with_state(initial, &config);
        store.subscribe(persist_listener(storage));
        Self::assemble(config, store)
    }

    /// Start from an existing document, e.g. one read from a state file.
    pub fn with_state(config: EditorConfig, state: CanvasState) -> Self {
        let store = CanvasStore::with_state(state, &config);
        Self::assemble(config, store)
    }

    fn assemble(config: EditorConfig, store: CanvasStore) -> Self {
        let opts = CompositorOpts::default().with_selection_padding(config.selection_padding_px);
        Self {
            config,
            store,
            clock: AnimationClock::new(),
            compositor: Compositor::new(opts),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CanvasStore {
        &mut self.store
    }

    pub fn clock_mut(&mut self) -> &mut AnimationClock {
        &mut self.clock
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn register_font(&mut self, bytes: Vec<u8>) -> CanvasResult<String> {
        self.compositor.text_engine().register_font(bytes)
    }

    /// Load an uploaded file: GIFs replace the animated layer, images replace the base image.
    ///
    /// A rejected upload leaves the canvas untouched.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> CanvasResult<ElementId> {
        let result = self.try_upload(file_name, bytes);
        if let Err(err) = &result {
            tracing::warn!(file = file_name, error = %err, "upload rejected");
        }
        result
    }

    fn try_upload(&mut self, file_name: &str, bytes: &[u8]) -> CanvasResult<ElementId> {
        match UploadKind::from_file_name(file_name)? {
            UploadKind::Gif => {
                let anim = decode_gif(bytes).map_err(|e| CanvasError::asset(format!("{e:#}")))?;
                tracing::info!(file = file_name, frames = anim.frame_count(), "gif uploaded");
                self.store
                    .set_animation(Some((file_name.to_owned(), anim)))
                    .ok_or_else(|| CanvasError::asset("animated layer was not created"))
            }
            UploadKind::Image => {
                let raster = decode_image(bytes).map_err(|e| CanvasError::asset(format!("{e:#}")))?;
                let aspect = f64::from(raster.width) / f64::from(raster.height);
                tracing::info!(file = file_name, width = raster.width, height = raster.height, "image uploaded");
                let id = self
                    .store
                    .set_canvas_image(Some(ImageSource::loaded(file_name, raster)))
                    .ok_or_else(|| CanvasError::asset("image layer was not created"))?;
                self.store.set_canvas_aspect_ratio(Some(aspect));
                Ok(id)
            }
        }
    }

    /// Decode every image or GIF whose pixels are missing, resolving `src` against `root`.
    ///
    /// Unreadable or undecodable files are logged and skipped. Returns the number attached.
    pub fn load_pending_assets(&mut self, root: &Path) -> usize {
        let pending: Vec<(ElementId, String, bool)> = self
            .store
            .layers()
            .iter()
            .flat_map(|l| l.elements.iter())
            .filter_map(|e| {
                if let Some(a) = e.as_animated() {
                    return (a.frames.is_empty() && !a.src.is_empty()).then(|| (a.id, a.src.clone(), true));
                }
                let img = e.image_source()?;
                (!img.is_loaded() && !img.src.is_empty()).then(|| (e.id(), img.src.clone(), false))
            })
            .collect();

        let mut attached = 0;
        for (id, src, animated) in pending {
            let path = root.join(&src);
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "asset unreadable; skipped");
                    continue;
                }
            };
            let ok = if animated {
                decode_gif(&bytes).map(|anim| self.store.attach_gif_frames(id, anim))
            } else {
                decode_image(&bytes).map(|raster| self.store.attach_raster(id, raster))
            };
            match ok {
                Ok(true) => attached += 1,
                Ok(false) => {}
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "asset undecodable; skipped"),
            }
        }
        attached
    }

    /// Add a manifest asset as a new top layer; `bytes`, when given, are decoded and attached.
    pub fn add_asset(&mut self, entry: &ManifestEntry, bytes: Option<&[u8]>) -> CanvasResult<ElementId> {
        enum Decoded {
            Raster(Raster),
            Gif(GifAnimation),
        }

        let decoded = match bytes {
            Some(b) if entry.is_animation() => Some(Decoded::Gif(decode_gif(b)?)),
            Some(b) => Some(Decoded::Raster(decode_image(b)?)),
            None => None,
        };
        let layer = entry.to_layer(self.store.state().next_z_index())?;
        let id = layer
            .elements
            .first()
            .map(Element::id)
            .ok_or_else(|| CanvasError::asset("asset produced an empty layer"))?;
        self.store.add_layer(layer);

        match decoded {
            Some(Decoded::Gif(anim)) => {
                self.store.attach_gif_frames(id, anim);
            }
            Some(Decoded::Raster(raster)) => {
                self.store.attach_raster(id, raster);
            }
            None => {}
        }
        Ok(id)
    }

    /// Add a text label with the configured default style.
    pub fn add_text(&mut self, text: &str, x: f64, y: f64) -> ElementId {
        let element = TextElement::new(text, x, y, self.config.text.clone());
        let id = element.id;
        self.store.add_text_element(element);
        id
    }

    /// Advance animations by `dt_seconds`. Returns whether a redraw is needed.
    pub fn tick(&mut self, dt_seconds: f64) -> bool {
        self.store.advance_animation(&mut self.clock, dt_seconds)
    }

    pub fn render(&mut self, surface: &mut Surface) -> CanvasResult<()> {
        self.compositor.render(surface, self.store.state())
    }

    /// Surface sized to the current canvas.
    pub fn new_surface(&self) -> CanvasResult<Surface> {
        let s = self.store.state();
        Surface::new(s.width, s.height)
    }

    /// Topmost text element under `pt` as `(layer_index, elem_index)`.
    pub fn text_at(&mut self, pt: Point) -> Option<(usize, usize)> {
        let state = self.store.state();
        let engine = self.compositor.text_engine();
        for li in paint_order(&state.layers).into_iter().rev() {
            let hit = state.layers[li]
                .elements
                .iter()
                .enumerate()
                .rev()
                .filter_map(|(ei, e)| e.as_text().map(|t| (ei, t)))
                .find(|(_, t)| is_point_in_text(engine, pt, t));
            if let Some((ei, _)) = hit {
                return Some((li, ei));
            }
        }
        None
    }

    /// Whether `pt` grabs the resize handle of the text element at the given indices.
    pub fn is_on_resize_handle(&mut self, layer_index: usize, elem_index: usize, pt: Point) -> bool {
        let Some(t) = self
            .store
            .layers()
            .get(layer_index)
            .and_then(|l| l.elements.get(elem_index))
            .and_then(Element::as_text)
        else {
            return false;
        };
        let handle = resize_handle_rect(self.compositor.text_engine(), t, self.config.resize_handle_px);
        contains_inclusive(handle, pt)
    }

    /// Handle drag: the new size is the size at grab time plus the vertical pointer travel.
    pub fn resize_text_from_handle(
        &mut self,
        layer_index: usize,
        elem_index: usize,
        initial_font_size: f64,
        delta_y: f64,
    ) -> bool {
        self.store
            .resize_text_element(layer_index, elem_index, initial_font_size + delta_y)
    }

    /// Returns whether the key changed the canvas.
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        match key {
            EditorKey::Delete => self.store.delete_selected_text(),
            EditorKey::Undo => self.store.undo(),
            EditorKey::Redo => self.store.redo(),
        }
    }

    pub fn export_png_bytes(&mut self) -> CanvasResult<Vec<u8>> {
        let s = self.store.state();
        export_static(&mut self.compositor, &s.layers, s.width, s.height)
    }

    pub fn export_png(&mut self, path: &Path) -> CanvasResult<()> {
        let s = self.store.state();
        export_static_file(&mut self.compositor, &s.layers, s.width, s.height, path)
    }

    /// Export `frame_count` frames (configured default when `None`).
    pub fn export_gif(&mut self, path: &Path, frame_count: Option<usize>) -> CanvasResult<()> {
        let frames = frame_count.unwrap_or(self.config.animation_frame_count);
        let s = self.store.state();
        export_gif_file(
            &mut self.compositor,
            &s.layers,
            s.width,
            s.height,
            frames,
            self.config.export_frame_delay_ms,
            path,
        )
    }

    pub fn export_gif_to(&mut self, frame_count: Option<usize>, sink: &mut dyn FrameSink) -> CanvasResult<()> {
        let frames = frame_count.unwrap_or(self.config.animation_frame_count);
        let s = self.store.state();
        export_gif(
            &mut self.compositor,
            &s.layers,
            s.width,
            s.height,
            frames,
            self.config.export_frame_delay_ms,
            sink,
        )
    }

    /// `<configured default name>.<ext>`
    pub fn default_file_name(&self, ext: &str) -> String {
        self.config.default_file_name(ext)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
