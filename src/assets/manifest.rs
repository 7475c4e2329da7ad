use serde::{Deserialize, Serialize};

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::model::element::{AnimatedImageElement, Element, ImageElement, OverlayElement};
use crate::model::layer::{BlendMode, Layer, create_layer};
use crate::model::raster::{GifAnimation, ImageSource};

/// Playback rate used for manifest GIFs without an explicit rate.
pub const DEFAULT_MANIFEST_FRAME_RATE: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Animation,
    Image,
    Overlay,
    Sticker,
    Font,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub count: usize,
    pub rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationInfo {
    pub frames: FrameInfo,
}

/// One entry of the prebuilt asset manifest. Hashes and licensing are carried, not checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub src: String,
    #[serde(default)]
    pub size_kb: u64,
    #[serde(default)]
    pub hash_sha256: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    pub class: AssetClass,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(rename = "blendMode", default)]
    pub blend_mode: Option<String>,
    #[serde(default)]
    pub animation: Option<AnimationInfo>,
    #[serde(default)]
    pub font: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub credits: Option<serde_json::Value>,
    #[serde(default)]
    pub license: Option<serde_json::Value>,
}

/// Parse the manifest JSON array. Entries with unknown extra fields are accepted.
pub fn parse_manifest(json: &str) -> CanvasResult<Vec<ManifestEntry>> {
    Ok(serde_json::from_str(json)?)
}

impl ManifestEntry {
    /// Whether this asset lands on the canvas as a GIF.
    pub fn is_animation(&self) -> bool {
        self.class == AssetClass::Animation
            || self.asset_type.eq_ignore_ascii_case("gif")
            || self.ext.eq_ignore_ascii_case("gif")
    }

    pub fn frame_rate(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| a.frames.rate)
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_MANIFEST_FRAME_RATE)
    }

    /// Build the element for this entry. Pixels are pending until attached through the store.
    pub fn to_element(&self) -> CanvasResult<Element> {
        if self.is_animation() {
            let element =
                AnimatedImageElement::new(self.src.clone(), GifAnimation::default(), self.frame_rate());
            return Ok(Element::AnimatedImage(element));
        }
        let image = ImageSource::pending(self.src.clone());
        match self.class {
            AssetClass::Overlay => {
                let blend = BlendMode::from_name(self.blend_mode.as_deref()).unwrap_or_else(|| {
                    tracing::warn!(asset = %self.name, blend = ?self.blend_mode, "unknown blend mode; using normal");
                    BlendMode::Normal
                });
                Ok(Element::Overlay(OverlayElement::new(image, blend)))
            }
            AssetClass::Sticker => Ok(Element::Sticker(ImageElement::new(image))),
            AssetClass::Image => Ok(Element::StaticImage(ImageElement::new(image))),
            AssetClass::Font => Err(CanvasError::validation(format!(
                "font asset '{}' cannot be placed on the canvas",
                self.name
            ))),
            AssetClass::Other | AssetClass::Animation => {
                tracing::warn!(asset = %self.name, class = ?self.class, "unsupported asset class; adding as image");
                Ok(Element::StaticImage(ImageElement::new(image)))
            }
        }
    }

    /// Single-element layer named after the asset.
    pub fn to_layer(&self, z_index: i32) -> CanvasResult<Layer> {
        Ok(create_layer(self.name.clone(), z_index).with_element(self.to_element()?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
