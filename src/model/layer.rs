use serde::{Deserialize, Serialize};

use crate::model::element::Element;
use crate::model::ids::{ElementId, LayerId};

/// Pixel-combination operator used when a layer or overlay is painted onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    /// Canvas-2D style composite operation name (`source-over` for [`BlendMode::Normal`]).
    pub fn composite_op(self) -> &'static str {
        match self {
            Self::Normal => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
        }
    }

    /// Parse a blend mode name; `None`/empty and `source-over` map to [`BlendMode::Normal`].
    pub fn from_name(name: Option<&str>) -> Option<Self> {
        let Some(name) = name.map(str::trim).filter(|s| !s.is_empty()) else {
            return Some(Self::Normal);
        };
        let mode = match name.to_ascii_lowercase().as_str() {
            "normal" | "source-over" => Self::Normal,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color-dodge" | "dodge" => Self::ColorDodge,
            "color-burn" | "burn" => Self::ColorBurn,
            "hard-light" => Self::HardLight,
            "soft-light" | "light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            _ => return None,
        };
        Some(mode)
    }
}

/// Ordered compositing unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Expected in `[0, 1]`; callers clamp, the model stores what it is given.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Create an empty, visible, fully-opaque layer with `blend_mode = normal`.
pub fn create_layer(name: impl Into<String>, z_index: i32) -> Layer {
    Layer {
        id: LayerId::new(),
        name: name.into(),
        visible: true,
        opacity: 1.0,
        z_index,
        blend_mode: BlendMode::Normal,
        elements: Vec::new(),
    }
}

impl Layer {
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn has_text(&self) -> bool {
        self.elements.iter().any(Element::is_text)
    }

    pub fn has_animation(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::AnimatedImage(_)))
    }

    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }
}

/// Indices of visible layers in paint order: ascending `z_index`, ties by array order.
pub fn paint_order(layers: &[Layer]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..layers.len()).filter(|&i| layers[i].visible).collect();
    // `sort_by_key` is stable, which keeps insertion order for equal z.
    order.sort_by_key(|&i| layers[i].z_index);
    order
}

#[cfg(test)]
#[path = "../../tests/unit/model/layer.rs"]
mod tests;
