use std::borrow::Cow;

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::model::element::{TextAlign, TextBaseline, TextElement};

/// Width used per character when no font is available, as a fraction of the font size.
const FALLBACK_ADVANCE_EM: f64 = 0.55;

/// Brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Measured extent of a text element, in canvas pixels before scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the box to the first baseline.
    pub baseline: f64,
}

struct RegisteredFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Shaped text ready for painting.
pub(crate) struct ShapedText {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) layout: parley::Layout<TextBrush>,
    pub(crate) metrics: TextMetrics,
}

/// Font registry plus Parley contexts used for measuring and painting text.
///
/// Families are matched case-insensitively. The first registered font is the fallback for
/// unknown families. Without any font, text is measured with a fixed per-character estimate and
/// not painted.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    fonts: Vec<RegisteredFont>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
        }
    }

    /// Register TTF/OTF bytes and return the family name they provide.
    pub fn register_font(&mut self, bytes: Vec<u8>) -> CanvasResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| CanvasError::asset("no font families found in font data"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CanvasError::asset("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        tracing::debug!(family = %family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            data,
        });
        Ok(family)
    }

    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> + '_ {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    fn resolve(&self, family: &str) -> Option<&RegisteredFont> {
        self.fonts
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family.trim()))
            .or_else(|| self.fonts.first())
    }

    /// Measure `text` with its own style.
    pub fn measure(&mut self, text: &TextElement) -> TextMetrics {
        match self.shape(text) {
            Some(shaped) => shaped.metrics,
            None => fallback_metrics(text),
        }
    }

    /// Shape `text`; `None` when no usable font is registered or the style is degenerate.
    pub(crate) fn shape(&mut self, text: &TextElement) -> Option<ShapedText> {
        let size = text.style.font_size as f32;
        if !size.is_finite() || size <= 0.0 {
            return None;
        }
        let font = self.resolve(&text.style.font_family)?;
        let family = font.family.clone();
        let data = font.data.clone();

        let c = text.style.color;
        let brush = TextBrush {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text.text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(&text.text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or(text.style.font_size * 0.8);
        let metrics = TextMetrics {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            baseline,
        };
        Some(ShapedText {
            font: data,
            layout,
            metrics,
        })
    }
}

fn fallback_metrics(text: &TextElement) -> TextMetrics {
    let size = text.style.font_size.max(0.0);
    TextMetrics {
        width: FALLBACK_ADVANCE_EM * size * text.text.chars().count() as f64,
        height: size,
        baseline: size * 0.8,
    }
}

/// Offset from the anchor position to the top-left of the text box, honoring align/baseline.
pub(crate) fn anchor_offset(
    align: TextAlign,
    baseline: TextBaseline,
    metrics: TextMetrics,
) -> (f64, f64) {
    let dx = match align {
        TextAlign::Left | TextAlign::Start => 0.0,
        TextAlign::Center => -metrics.width / 2.0,
        TextAlign::Right | TextAlign::End => -metrics.width,
    };
    let dy = match baseline {
        TextBaseline::Top | TextBaseline::Hanging => 0.0,
        TextBaseline::Middle => -metrics.height / 2.0,
        TextBaseline::Alphabetic | TextBaseline::Ideographic => -metrics.baseline,
        TextBaseline::Bottom => -metrics.height,
    };
    (dx, dy)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
