use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::clock::AnimationClock;
use crate::config::EditorConfig;
use crate::foundation::core::Position;
use crate::model::element::{
    AnimatedImageElement, BackgroundElement, Element, ElementKind, TextElement,
};
use crate::model::ids::{ElementId, LayerId};
use crate::model::layer::{Layer, create_layer};
use crate::model::raster::{GifAnimation, ImageSource, Raster};
use crate::store::history::History;
use crate::store::state::CanvasState;

/// Callback invoked with the current state after every change.
pub type Listener = Box<dyn FnMut(&CanvasState)>;

/// Handle returned by [`CanvasStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Selection expressed by identity so it survives reordering.
#[derive(Clone, Copy)]
struct SelectionAnchor {
    layer: Option<LayerId>,
    element: Option<ElementId>,
}

impl SelectionAnchor {
    const NONE: Self = Self {
        layer: None,
        element: None,
    };
}

/// Owner of the [`CanvasState`], its undo history and its subscribers.
///
/// Every public mutation is synchronous: it records history (unless noted), applies the change,
/// and notifies listeners in registration order before returning. Stale indices are no-ops.
/// Listeners only see `&CanvasState`, so they cannot re-enter the store.
pub struct CanvasStore {
    state: CanvasState,
    history: History,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    default_size: (u32, u32),
    gif_frame_rate: f64,
    min_font_size: f64,
    dragging: bool,
}

impl CanvasStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_state(
            CanvasState::with_size(config.canvas_width, config.canvas_height),
            config,
        )
    }

    /// Start from an existing (e.g. hydrated) state.
    pub fn with_state(initial: CanvasState, config: &EditorConfig) -> Self {
        Self {
            state: initial,
            history: History::new(config.history_limit),
            listeners: Vec::new(),
            next_subscription: 0,
            default_size: (config.canvas_width, config.canvas_height),
            gif_frame_rate: config.gif_frame_rate,
            min_font_size: config.min_font_size,
            dragging: false,
        }
    }

    /// Snapshot of the current state. Mutating it never affects the store.
    pub fn get(&self) -> CanvasState {
        self.state.clone()
    }

    /// Borrowed read-only view of the current state.
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn layers(&self) -> &[Layer] {
        &self.state.layers
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn layer_index_by_id(&self, id: LayerId) -> Option<usize> {
        self.state.layer_index_by_id(id)
    }

    pub fn find_element(&self, id: ElementId) -> Option<(usize, usize)> {
        self.state.find_element(id)
    }

    // ---- subscriptions ----

    /// Register `listener`; it is called once immediately with the current state.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&CanvasState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        listener(&self.state);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(state);
        }
    }

    // ---- mutation plumbing ----

    fn anchor(&self) -> SelectionAnchor {
        let layer = self.state.selected_layer();
        SelectionAnchor {
            layer: layer.map(|l| l.id),
            element: layer
                .zip(self.state.selected_element)
                .and_then(|(l, ei)| l.elements.get(ei))
                .map(Element::id),
        }
    }

    /// Re-resolve selection indices after a structural change; drops references to removed items.
    fn reanchor(&mut self, anchor: SelectionAnchor) {
        let layer_index = anchor
            .layer
            .and_then(|id| self.state.layer_index_by_id(id));
        let element_index = match (layer_index, anchor.element) {
            (Some(li), Some(eid)) => self.state.layers[li].element_index(eid),
            _ => None,
        };
        self.state.selected_layer_index = layer_index;
        self.state.selected_element = element_index;
    }

    /// Apply `edit`; when it reports a change, record the pre-edit state and notify.
    fn apply(&mut self, record: bool, edit: impl FnOnce(&mut CanvasState) -> bool) -> bool {
        let anchor = self.anchor();
        self.commit(record, anchor, edit)
    }

    /// Like [`Self::apply`], but the selection afterwards resolves from `anchor`.
    fn commit(
        &mut self,
        record: bool,
        anchor: SelectionAnchor,
        edit: impl FnOnce(&mut CanvasState) -> bool,
    ) -> bool {
        let before = record.then(|| self.state.clone());
        if !edit(&mut self.state) {
            return false;
        }
        if let Some(before) = before {
            self.history.push(before);
        }
        self.reanchor(anchor);
        self.notify();
        true
    }

    fn edit(&mut self, edit: impl FnOnce(&mut CanvasState) -> bool) -> bool {
        self.apply(true, edit)
    }

    // ---- layer operations ----

    pub fn add_layer(&mut self, layer: Layer) {
        tracing::debug!(layer = %layer.id, name = %layer.name, "add layer");
        self.edit(|s| {
            s.layers.push(layer);
            true
        });
    }

    pub fn remove_layer(&mut self, index: usize) -> bool {
        self.edit(|s| {
            if index >= s.layers.len() {
                return false;
            }
            s.layers.remove(index);
            true
        })
    }

    /// Move the layer at `from` to `to` and renumber every `z_index` to its new array index, so
    /// array order and paint order agree.
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        self.edit(|s| {
            let len = s.layers.len();
            if from >= len || to >= len {
                return false;
            }
            let moved = s.layers.remove(from);
            s.layers.insert(to, moved);
            s.renumber_z();
            true
        })
    }

    pub fn update_layer(&mut self, index: usize, layer: Layer) -> bool {
        self.edit(|s| match s.layers.get_mut(index) {
            Some(slot) => {
                *slot = layer;
                true
            }
            None => false,
        })
    }

    pub fn add_element_to_layer(&mut self, layer_id: LayerId, element: Element) -> bool {
        self.edit(|s| match s.layer_index_by_id(layer_id) {
            Some(li) => {
                s.layers[li].elements.push(element);
                true
            }
            None => false,
        })
    }

    /// Remove an element; the (possibly empty) layer is kept.
    pub fn remove_element(&mut self, layer_id: LayerId, element_id: ElementId) -> bool {
        self.edit(|s| {
            let Some(li) = s.layer_index_by_id(layer_id) else {
                return false;
            };
            let Some(ei) = s.layers[li].element_index(element_id) else {
                return false;
            };
            s.layers[li].elements.remove(ei);
            true
        })
    }

    pub fn clear_all(&mut self) {
        self.edit(|s| {
            s.layers.clear();
            true
        });
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.edit(|s| {
            s.width = width;
            s.height = height;
            true
        });
    }

    /// Restore the configured canvas size and drop all layers.
    pub fn reset(&mut self) {
        let (width, height) = self.default_size;
        self.edit(|s| {
            s.width = width;
            s.height = height;
            s.layers.clear();
            s.aspect_ratio = None;
            true
        });
    }

    // ---- text operations ----

    /// Append to the first layer that already holds text, or create a text layer on top.
    pub fn add_text_element(&mut self, element: TextElement) {
        self.edit(|s| {
            if let Some(layer) = s.layers.iter_mut().find(|l| l.has_text()) {
                layer.elements.push(Element::Text(element));
            } else {
                let layer =
                    create_layer("Text Layer", s.next_z_index()).with_element(Element::Text(element));
                s.layers.push(layer);
            }
            true
        });
    }

    /// Reposition a text element. Inside a drag, history was already recorded by
    /// [`CanvasStore::begin_drag`].
    pub fn move_text_element(&mut self, layer_index: usize, elem_index: usize, x: f64, y: f64) -> bool {
        let record = !self.dragging;
        self.apply(record, |s| {
            match s
                .layers
                .get_mut(layer_index)
                .and_then(|l| l.elements.get_mut(elem_index))
                .and_then(Element::as_text_mut)
            {
                Some(t) => {
                    t.position = Position::new(x, y);
                    true
                }
                None => false,
            }
        })
    }

    pub fn replace_text_element(
        &mut self,
        layer_index: usize,
        elem_index: usize,
        element: TextElement,
    ) -> bool {
        self.edit(|s| {
            match s
                .layers
                .get_mut(layer_index)
                .and_then(|l| l.elements.get_mut(elem_index))
            {
                Some(slot @ Element::Text(_)) => {
                    *slot = Element::Text(element);
                    true
                }
                _ => false,
            }
        })
    }

    /// Replace the `ordinal`-th text element counted across all layers.
    pub fn update_text_element(&mut self, ordinal: usize, element: TextElement) -> bool {
        match self.state.find_nth_text(ordinal) {
            Some((li, ei)) => self.replace_text_element(li, ei, element),
            None => false,
        }
    }

    pub fn remove_text_element(&mut self, layer_index: usize, elem_index: usize) -> bool {
        if !self.is_text_at(layer_index, elem_index) {
            return false;
        }
        self.edit(|s| {
            s.layers[layer_index].elements.remove(elem_index);
            true
        })
    }

    /// Delete the selected text element (Delete key) and clear the selection in the same change.
    pub fn delete_selected_text(&mut self) -> bool {
        let (Some(li), Some(ei)) = (self.state.selected_layer_index, self.state.selected_element)
        else {
            return false;
        };
        if !self.is_text_at(li, ei) {
            return false;
        }
        self.commit(true, SelectionAnchor::NONE, |s| {
            s.layers[li].elements.remove(ei);
            true
        })
    }

    fn is_text_at(&self, layer_index: usize, elem_index: usize) -> bool {
        let is_text = self
            .state
            .layers
            .get(layer_index)
            .and_then(|l| l.elements.get(elem_index))
            .is_some_and(Element::is_text);
        if !is_text {
            tracing::warn!(layer_index, elem_index, "no text element at that position");
        }
        is_text
    }

    /// Set a text element's font size, clamped to the configured minimum. Inside a drag, history
    /// was already recorded by [`CanvasStore::begin_drag`].
    pub fn resize_text_element(&mut self, layer_index: usize, elem_index: usize, font_size: f64) -> bool {
        if !font_size.is_finite() {
            return false;
        }
        let size = font_size.max(self.min_font_size);
        let record = !self.dragging;
        self.apply(record, |s| {
            match s
                .layers
                .get_mut(layer_index)
                .and_then(|l| l.elements.get_mut(elem_index))
                .and_then(Element::as_text_mut)
            {
                Some(t) => {
                    t.style.font_size = size;
                    true
                }
                None => false,
            }
        })
    }

    /// Start a continuous edit; the pre-drag state is recorded exactly once.
    pub fn begin_drag(&mut self) {
        if self.dragging {
            return;
        }
        self.history.push(self.state.clone());
        self.dragging = true;
    }

    /// Finish a continuous edit. A drag that changed nothing leaves no history entry.
    pub fn end_drag(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.history.discard_if_unchanged(&self.state);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // ---- selection ----

    /// Select a layer (or clear with `None`). Out-of-range indices are ignored. Selection is not
    /// recorded in history.
    pub fn set_selected_layer_index(&mut self, index: Option<usize>) -> bool {
        if index.is_some_and(|i| i >= self.state.layers.len()) {
            return false;
        }
        self.state.selected_layer_index = index;
        self.state.selected_element = None;
        self.notify();
        true
    }

    pub fn select_element(&mut self, layer_index: usize, elem_index: usize) -> bool {
        let exists = self
            .state
            .layers
            .get(layer_index)
            .is_some_and(|l| elem_index < l.elements.len());
        if !exists {
            return false;
        }
        self.state.selected_layer_index = Some(layer_index);
        self.state.selected_element = Some(elem_index);
        self.notify();
        true
    }

    // ---- animation / base image ----

    /// Replace any animated-image layer with one built from `anim`, or remove it for `None`.
    pub fn set_animation(&mut self, anim: Option<(String, GifAnimation)>) -> Option<ElementId> {
        let rate = self.gif_frame_rate;
        let element = anim.map(|(src, anim)| AnimatedImageElement::new(src, anim, rate));
        self.set_animation_element(element)
    }

    pub fn set_animation_element(&mut self, element: Option<AnimatedImageElement>) -> Option<ElementId> {
        let id = element.as_ref().map(|e| e.id);
        let had_animation = self.state.layers.iter().any(Layer::has_animation);
        if element.is_none() && !had_animation {
            return None;
        }
        self.edit(|s| {
            s.layers.retain(|l| !l.has_animation());
            if let Some(element) = element {
                let layer = create_layer("GIF Layer", s.next_z_index())
                    .with_element(Element::AnimatedImage(element));
                s.layers.push(layer);
            }
            true
        });
        id
    }

    /// Replace the base image layer (drawn beneath everything else), or remove it for `None`.
    pub fn set_canvas_image(&mut self, image: Option<ImageSource>) -> Option<ElementId> {
        let is_background =
            |l: &Layer| l.elements.iter().any(|e| e.kind() == ElementKind::Background);
        let had_background = self.state.layers.iter().any(is_background);
        if image.is_none() && !had_background {
            return None;
        }
        let element = image.map(BackgroundElement::new);
        let id = element.as_ref().map(|e| e.id);
        self.edit(|s| {
            s.layers.retain(|l| !is_background(l));
            if let Some(element) = element {
                let layer = create_layer("Image Layer", s.bottom_z_index())
                    .with_element(Element::Background(element));
                s.layers.insert(0, layer);
            }
            true
        });
        id
    }

    pub fn set_canvas_aspect_ratio(&mut self, aspect: Option<f64>) {
        self.edit(|s| {
            s.aspect_ratio = aspect;
            true
        });
    }

    // ---- asset completion (no history) ----

    /// Attach decoded pixels to the element with `element_id`, wherever it still exists.
    ///
    /// Returns `false` (and changes nothing) when the element was removed while decoding, so a
    /// late load never resurrects deleted content. Undo/redo snapshots are patched too.
    pub fn attach_raster(&mut self, element_id: ElementId, raster: Raster) -> bool {
        let raster = Arc::new(raster);
        let patch = |s: &mut CanvasState| -> bool {
            match s.element_mut(element_id).and_then(Element::image_source_mut) {
                Some(img) => {
                    img.raster = Some(Arc::clone(&raster));
                    true
                }
                None => false,
            }
        };
        if !patch(&mut self.state) {
            tracing::debug!(element = %element_id, "raster arrived for a removed element; dropped");
            return false;
        }
        self.history.for_each_state_mut(|s| {
            patch(s);
        });
        self.notify();
        true
    }

    /// Attach decoded GIF frames to an existing animated element (see [`Self::attach_raster`]).
    pub fn attach_gif_frames(&mut self, element_id: ElementId, anim: GifAnimation) -> bool {
        let frames = Arc::new(anim.frames);
        let patch = |s: &mut CanvasState| -> bool {
            match s.element_mut(element_id).and_then(Element::as_animated_mut) {
                Some(a) => {
                    a.frames = Arc::clone(&frames);
                    if a.current_frame >= a.frames.len() {
                        a.current_frame = 0;
                    }
                    true
                }
                None => false,
            }
        };
        if !patch(&mut self.state) {
            tracing::debug!(element = %element_id, "gif frames arrived for a removed element; dropped");
            return false;
        }
        self.history.for_each_state_mut(|s| {
            patch(s);
        });
        self.notify();
        true
    }

    /// Advance per-element animation progress in place. Not recorded in history and not
    /// broadcast: the frame loop re-renders on its own cadence.
    pub fn advance_animation(&mut self, clock: &mut AnimationClock, dt_seconds: f64) -> bool {
        clock.update(&mut self.state.layers, dt_seconds)
    }

    // ---- history ----

    pub fn undo(&mut self) -> bool {
        self.dragging = false;
        let progress = collect_progress(&self.state);
        if !self.history.undo(&mut self.state) {
            return false;
        }
        restore_progress(&mut self.state, &progress);
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.dragging = false;
        let progress = collect_progress(&self.state);
        if !self.history.redo(&mut self.state) {
            return false;
        }
        restore_progress(&mut self.state, &progress);
        self.notify();
        true
    }
}

#[derive(Clone, Copy)]
struct Progress {
    current_frame: usize,
    frame_elapsed: f64,
    angle: Option<f64>,
}

/// Playback progress is not undoable; carry it across history swaps by element id.
fn collect_progress(state: &CanvasState) -> HashMap<ElementId, Progress> {
    state
        .layers
        .iter()
        .flat_map(|l| l.elements.iter())
        .filter_map(Element::as_animated)
        .map(|a| {
            (
                a.id,
                Progress {
                    current_frame: a.current_frame,
                    frame_elapsed: a.frame_elapsed,
                    angle: a.spin.map(|s| s.current_angle),
                },
            )
        })
        .collect()
}

fn restore_progress(state: &mut CanvasState, progress: &HashMap<ElementId, Progress>) {
    for a in state
        .layers
        .iter_mut()
        .flat_map(|l| l.elements.iter_mut())
        .filter_map(Element::as_animated_mut)
    {
        let Some(p) = progress.get(&a.id) else {
            continue;
        };
        if p.current_frame < a.frames.len() {
            a.current_frame = p.current_frame;
        }
        a.frame_elapsed = p.frame_elapsed;
        if let (Some(spin), Some(angle)) = (a.spin.as_mut(), p.angle) {
            spin.current_angle = angle;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/canvas_store.rs"]
mod tests;
