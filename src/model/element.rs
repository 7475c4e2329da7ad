use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Position, Rgba8, Scale, Spin};
use crate::model::ids::ElementId;
use crate::model::layer::BlendMode;
use crate::model::raster::{GifAnimation, GifFrame, ImageSource};

/// Discriminant of [`Element`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    StaticImage,
    AnimatedImage,
    Overlay,
    Sticker,
    Text,
    Background,
}

/// Smallest drawable unit of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    StaticImage(ImageElement),
    AnimatedImage(AnimatedImageElement),
    Overlay(OverlayElement),
    Sticker(ImageElement),
    Text(TextElement),
    Background(BackgroundElement),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Self::StaticImage(e) | Self::Sticker(e) => e.id,
            Self::AnimatedImage(e) => e.id,
            Self::Overlay(e) => e.id,
            Self::Text(e) => e.id,
            Self::Background(e) => e.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::StaticImage(_) => ElementKind::StaticImage,
            Self::AnimatedImage(_) => ElementKind::AnimatedImage,
            Self::Overlay(_) => ElementKind::Overlay,
            Self::Sticker(_) => ElementKind::Sticker,
            Self::Text(_) => ElementKind::Text,
            Self::Background(_) => ElementKind::Background,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_animated(&self) -> Option<&AnimatedImageElement> {
        match self {
            Self::AnimatedImage(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_animated_mut(&mut self) -> Option<&mut AnimatedImageElement> {
        match self {
            Self::AnimatedImage(a) => Some(a),
            _ => None,
        }
    }

    pub fn image_source(&self) -> Option<&ImageSource> {
        match self {
            Self::StaticImage(e) | Self::Sticker(e) => Some(&e.image),
            Self::Overlay(e) => Some(&e.image),
            Self::Background(e) => Some(&e.image),
            Self::AnimatedImage(_) | Self::Text(_) => None,
        }
    }

    /// Image slot for raster-backed kinds.
    pub fn image_source_mut(&mut self) -> Option<&mut ImageSource> {
        match self {
            Self::StaticImage(e) | Self::Sticker(e) => Some(&mut e.image),
            Self::Overlay(e) => Some(&mut e.image),
            Self::Background(e) => Some(&mut e.image),
            Self::AnimatedImage(_) | Self::Text(_) => None,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::StaticImage(e) | Self::Sticker(e) => e.position,
            Self::AnimatedImage(e) => e.position,
            Self::Overlay(e) => e.position,
            Self::Text(e) => e.position,
            Self::Background(_) => Position::default(),
        }
    }

    /// Move the element; backgrounds are pinned to the canvas and ignore this.
    pub fn set_position(&mut self, position: Position) {
        match self {
            Self::StaticImage(e) | Self::Sticker(e) => e.position = position,
            Self::AnimatedImage(e) => e.position = position,
            Self::Overlay(e) => e.position = position,
            Self::Text(e) => e.position = position,
            Self::Background(_) => {}
        }
    }
}

/// Raster element used for static images and stickers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: ElementId,
    pub image: ImageSource,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub scale: Scale,
    /// Static rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl ImageElement {
    pub fn new(image: ImageSource) -> Self {
        Self {
            id: ElementId::new(),
            image,
            position: Position::default(),
            scale: Scale::default(),
            rotation: 0.0,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn scaled(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

/// GIF frame sequence with playback progress.
///
/// `frames` is runtime-only; persisted state keeps `src` so the GIF can be decoded again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedImageElement {
    pub id: ElementId,
    #[serde(default)]
    pub src: String,
    #[serde(skip)]
    pub frames: Arc<Vec<GifFrame>>,
    pub frame_rate: f64,
    #[serde(default)]
    pub current_frame: usize,
    /// Milliseconds accumulated since the last frame advance.
    #[serde(default)]
    pub frame_elapsed: f64,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub spin: Option<Spin>,
}

impl AnimatedImageElement {
    pub fn new(src: impl Into<String>, anim: GifAnimation, frame_rate: f64) -> Self {
        Self {
            id: ElementId::new(),
            src: src.into(),
            frames: Arc::new(anim.frames),
            frame_rate,
            current_frame: 0,
            frame_elapsed: 0.0,
            position: Position::default(),
            scale: Scale::default(),
            spin: None,
        }
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = Some(spin);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Milliseconds each frame stays on screen; `None` for a non-positive or non-finite rate.
    pub fn frame_duration_ms(&self) -> Option<f64> {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            Some(1000.0 / self.frame_rate)
        } else {
            None
        }
    }

    /// Current rotation in degrees (0 when not spinning).
    pub fn angle(&self) -> f64 {
        self.spin.map(|s| s.current_angle).unwrap_or(0.0)
    }

    pub fn current(&self) -> Option<&GifFrame> {
        self.frames.get(self.current_frame)
    }
}

/// Full-canvas raster painted with its own blend mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayElement {
    pub id: ElementId,
    pub image: ImageSource,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
}

impl OverlayElement {
    pub fn new(image: ImageSource, blend_mode: BlendMode) -> Self {
        Self {
            id: ElementId::new(),
            image,
            position: Position::default(),
            scale: Scale::default(),
            rotation: 0.0,
            blend_mode,
        }
    }
}

/// Base image fitted inside the canvas, preserving aspect ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundElement {
    pub id: ElementId,
    pub image: ImageSource,
}

impl BackgroundElement {
    pub fn new(image: ImageSource) -> Self {
        Self {
            id: ElementId::new(),
            image,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    #[default]
    Center,
    Start,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Hanging,
    #[default]
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// CSS-style numeric font weight. Deserializes from a number or `"normal"` / `"bold"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::BOLD
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u16),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(Self(n.clamp(1, 1000))),
            Repr::Name(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" => Ok(Self::NORMAL),
                "bold" => Ok(Self::BOLD),
                "lighter" => Ok(Self(300)),
                "bolder" => Ok(Self(900)),
                other => other
                    .parse::<u16>()
                    .map(|n| Self(n.clamp(1, 1000)))
                    .map_err(|_| serde::de::Error::custom(format!("invalid font weight \"{s}\""))),
            },
        }
    }
}

/// Font and paint settings of a text element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: Rgba8,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_owned(),
            font_size: 32.0,
            font_weight: FontWeight::BOLD,
            font_style: FontStyle::Normal,
            color: Rgba8::BLACK,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        }
    }
}

/// Editable text label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextElement {
    pub fn new(text: impl Into<String>, x: f64, y: f64, style: TextStyle) -> Self {
        Self {
            id: ElementId::new(),
            text: text.into(),
            position: Position::new(x, y),
            rotation: 0.0,
            scale: Scale::default(),
            style,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/element.rs"]
mod tests;
