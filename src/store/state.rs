use serde::{Deserialize, Serialize};

use crate::model::element::{Element, TextElement};
use crate::model::ids::{ElementId, LayerId};
use crate::model::layer::Layer;

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Complete editable document: canvas size, layers and selection.
///
/// Missing fields deserialize to defaults and unknown fields are ignored, so state persisted by
/// older sessions always loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Layer>,
    /// Index into `layers`; cleared whenever that layer goes away.
    pub selected_layer_index: Option<usize>,
    /// Element index within the selected layer.
    pub selected_element: Option<usize>,
    pub aspect_ratio: Option<f64>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::with_size(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl CanvasState {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            selected_layer_index: None,
            selected_element: None,
            aspect_ratio: None,
        }
    }

    pub fn layer_index_by_id(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// `(layer_index, element_index)` of the element with `id`.
    pub fn find_element(&self, id: ElementId) -> Option<(usize, usize)> {
        self.layers
            .iter()
            .enumerate()
            .find_map(|(li, l)| l.element_index(id).map(|ei| (li, ei)))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let (li, ei) = self.find_element(id)?;
        self.layers.get_mut(li)?.elements.get_mut(ei)
    }

    /// All text elements in layer order, then element order.
    pub fn text_elements(&self) -> impl Iterator<Item = &TextElement> + '_ {
        self.layers
            .iter()
            .flat_map(|l| l.elements.iter())
            .filter_map(Element::as_text)
    }

    /// Location of the `ordinal`-th text element across all layers.
    pub fn find_nth_text(&self, ordinal: usize) -> Option<(usize, usize)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(li, l)| {
                l.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.is_text())
                    .map(move |(ei, _)| (li, ei))
            })
            .nth(ordinal)
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.layers.get(self.selected_layer_index?)
    }

    pub fn selected_text(&self) -> Option<&TextElement> {
        let layer = self.selected_layer()?;
        layer.elements.get(self.selected_element?)?.as_text()
    }

    /// Z-index one above the current top layer.
    pub fn next_z_index(&self) -> i32 {
        self.layers
            .iter()
            .map(|l| l.z_index)
            .max()
            .map_or(0, |z| z.saturating_add(1))
    }

    /// Z-index one below the current bottom layer.
    pub fn bottom_z_index(&self) -> i32 {
        self.layers
            .iter()
            .map(|l| l.z_index)
            .min()
            .map_or(0, |z| z.saturating_sub(1))
    }

    /// Renumber `z_index` to match array order.
    pub fn renumber_z(&mut self) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = i32::try_from(i).unwrap_or(i32::MAX);
        }
    }
}
