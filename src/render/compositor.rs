use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Rect, Rgba8, Vec2, element_transform};
use crate::foundation::error::CanvasResult;
use crate::model::element::{Element, TextElement};
use crate::model::layer::{BlendMode, Layer, paint_order};
use crate::model::raster::Raster;
use crate::render::blend::composite_in_place;
use crate::render::hit_test::text_bounds;
use crate::render::surface::{Surface, premul_to_image};
use crate::render::text::{TextEngine, anchor_offset};
use crate::store::state::CanvasState;

/// Where the selection indicator is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStyle {
    /// Around the whole canvas whenever a text layer is selected.
    CanvasBounds,
    /// Tightly around the selected text element, falling back to the canvas.
    #[default]
    TextBounds,
}

/// Cosmetic passes of [`Compositor::render`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompositorOpts {
    pub draw_boundary: bool,
    pub dev_overlay: bool,
    pub draw_selection: bool,
    pub selection_style: SelectionStyle,
    pub selection_padding: f64,
    pub clear_rgba: Option<Rgba8>,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            draw_boundary: true,
            dev_overlay: false,
            draw_selection: true,
            selection_style: SelectionStyle::TextBounds,
            selection_padding: 4.0,
            clear_rgba: None,
        }
    }
}

impl CompositorOpts {
    /// Content only: no boundary, overlay or selection.
    pub fn export() -> Self {
        Self {
            draw_boundary: false,
            dev_overlay: false,
            draw_selection: false,
            ..Self::default()
        }
    }

    pub fn with_boundary(mut self, on: bool) -> Self {
        self.draw_boundary = on;
        self
    }

    pub fn with_dev_overlay(mut self, on: bool) -> Self {
        self.dev_overlay = on;
        self
    }

    pub fn with_selection(mut self, on: bool) -> Self {
        self.draw_selection = on;
        self
    }

    pub fn with_selection_style(mut self, style: SelectionStyle) -> Self {
        self.selection_style = style;
        self
    }

    pub fn with_selection_padding(mut self, px: f64) -> Self {
        self.selection_padding = px;
        self
    }

    pub fn with_clear_rgba(mut self, color: Option<Rgba8>) -> Self {
        self.clear_rgba = color;
        self
    }
}

#[derive(Clone, Copy)]
struct DashStroke {
    color: Rgba8,
    width: f64,
    on: f64,
    off: f64,
}

const SELECTION_STROKE: DashStroke = DashStroke {
    color: Rgba8::rgba(0x00, 0x00, 0xff, 0x66),
    width: 2.0,
    on: 4.0,
    off: 2.0,
};

const BOUNDARY_STROKE: DashStroke = DashStroke {
    color: Rgba8::rgba(0xff, 0x80, 0xc5, 0xff),
    width: 8.0,
    on: 12.0,
    off: 10.0,
};

const DEV_STROKE: DashStroke = DashStroke {
    color: Rgba8::rgba(0xff, 0x00, 0x00, 0x40),
    width: 1.0,
    on: 4.0,
    off: 4.0,
};

/// Rasterizes a [`CanvasState`] onto a [`Surface`].
///
/// Output depends only on the state (including animation progress fields) and the registered
/// fonts, so two renders of the same state are pixel-identical.
pub struct Compositor {
    text: TextEngine,
    opts: CompositorOpts,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(CompositorOpts::default())
    }
}

impl Compositor {
    pub fn new(opts: CompositorOpts) -> Self {
        Self {
            text: TextEngine::new(),
            opts,
            ctx: None,
            scratch: None,
        }
    }

    pub fn with_text_engine(mut self, text: TextEngine) -> Self {
        self.text = text;
        self
    }

    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    pub fn set_opts(&mut self, opts: CompositorOpts) {
        self.opts = opts;
    }

    pub fn text_engine(&mut self) -> &mut TextEngine {
        &mut self.text
    }

    /// Render with a temporary set of options.
    pub fn render_with(
        &mut self,
        surface: &mut Surface,
        state: &CanvasState,
        opts: CompositorOpts,
    ) -> CanvasResult<()> {
        let saved = std::mem::replace(&mut self.opts, opts);
        let out = self.render(surface, state);
        self.opts = saved;
        out
    }

    #[tracing::instrument(skip_all, fields(width = surface.width(), height = surface.height(), layers = state.layers.len()))]
    pub fn render(&mut self, surface: &mut Surface, state: &CanvasState) -> CanvasResult<()> {
        self.prepare(surface);
        surface.clear(self.opts.clear_rgba);

        let canvas = Rect::new(0.0, 0.0, f64::from(surface.width()), f64::from(surface.height()));
        if self.opts.dev_overlay {
            self.draw_crosshair(surface, canvas);
        }
        if self.opts.draw_boundary {
            self.stroke_rect(surface, canvas, canvas, BOUNDARY_STROKE);
        }

        let order = paint_order(&state.layers);
        for &li in &order {
            let layer = &state.layers[li];
            for element in &layer.elements {
                self.paint_element(surface, canvas, layer, element);
            }
        }

        for &li in &order {
            let layer = &state.layers[li];
            for t in layer.elements.iter().filter_map(Element::as_text) {
                self.paint_text(surface, layer, t);
            }
        }

        if self.opts.draw_selection {
            self.draw_selection(surface, canvas, state);
        }
        Ok(())
    }

    fn prepare(&mut self, surface: &Surface) {
        let (w, h) = (surface.width_u16(), surface.height_u16());
        let fits = self
            .scratch
            .as_ref()
            .is_some_and(|p| p.width() == w && p.height() == h);
        if !fits {
            self.scratch = Some(vello_cpu::Pixmap::new(w, h));
            self.ctx = Some(vello_cpu::RenderContext::new(w, h));
        }
    }

    fn paint_element(&mut self, surface: &mut Surface, canvas: Rect, layer: &Layer, element: &Element) {
        let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
        match element {
            Element::StaticImage(e) | Element::Sticker(e) => {
                let Some(raster) = e.image.raster.as_deref() else {
                    return;
                };
                let t = element_transform(e.position, e.rotation, e.scale);
                self.paint_raster(surface, raster, t, opacity, layer.blend_mode);
            }
            Element::AnimatedImage(a) => {
                if a.frames.is_empty() {
                    return;
                }
                let Some(frame) = a.current() else {
                    tracing::warn!(
                        element = %a.id,
                        current_frame = a.current_frame,
                        frame_count = a.frames.len(),
                        "animated frame index out of range; skipped"
                    );
                    return;
                };
                let t = element_transform(a.position, a.angle(), a.scale);
                self.paint_raster(surface, &frame.raster, t, opacity, layer.blend_mode);
            }
            Element::Overlay(o) => {
                let Some(raster) = o.image.raster.as_deref() else {
                    return;
                };
                if raster.is_empty() {
                    return;
                }
                let fill = Affine::scale_non_uniform(
                    canvas.width() / f64::from(raster.width),
                    canvas.height() / f64::from(raster.height),
                );
                let t = element_transform(o.position, o.rotation, o.scale) * fill;
                self.paint_raster(surface, raster, t, opacity, o.blend_mode);
            }
            Element::Background(b) => {
                let Some(raster) = b.image.raster.as_deref() else {
                    return;
                };
                if raster.is_empty() {
                    return;
                }
                let t = aspect_fit(canvas, raster);
                self.paint_raster(surface, raster, t, opacity, layer.blend_mode);
            }
            // Painted in the text pass.
            Element::Text(_) => {}
        }
    }

    fn paint_raster(
        &mut self,
        surface: &mut Surface,
        raster: &Raster,
        transform: Affine,
        opacity: f32,
        blend: BlendMode,
    ) {
        if raster.is_empty() || opacity <= 0.0 {
            return;
        }
        let image = match premul_to_image(&raster.rgba8_premul, raster.width, raster.height) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(error = %err, "raster could not be painted; skipped");
                return;
            }
        };
        let (Some(ctx), Some(scratch)) = (self.ctx.as_mut(), self.scratch.as_mut()) else {
            return;
        };

        ctx.reset();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(image);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(raster.width),
            f64::from(raster.height),
        ));
        ctx.flush();
        ctx.render_to_pixmap(scratch);

        if let Err(err) =
            composite_in_place(surface.data_mut(), scratch.data_as_u8_slice(), opacity, blend)
        {
            tracing::warn!(error = %err, "composite failed; element skipped");
        }
    }

    fn paint_text(&mut self, surface: &mut Surface, layer: &Layer, t: &TextElement) {
        if t.text.is_empty() {
            return;
        }
        let Some(shaped) = self.text.shape(t) else {
            tracing::debug!(element = %t.id, family = %t.style.font_family, "no font available; text skipped");
            return;
        };
        let (Some(ctx), Some(scratch)) = (self.ctx.as_mut(), self.scratch.as_mut()) else {
            return;
        };

        let (dx, dy) = anchor_offset(t.style.align, t.style.baseline, shaped.metrics);
        let transform =
            element_transform(t.position, t.rotation, t.scale) * Affine::translate(Vec2::new(dx, dy));

        ctx.reset();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&shaped.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(scratch);

        let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
        if let Err(err) = composite_in_place(
            surface.data_mut(),
            scratch.data_as_u8_slice(),
            opacity,
            BlendMode::Normal,
        ) {
            tracing::warn!(error = %err, "text composite failed; element skipped");
        }
    }

    fn draw_selection(&mut self, surface: &mut Surface, canvas: Rect, state: &CanvasState) {
        let Some(layer) = state.selected_layer() else {
            return;
        };
        if !layer.has_text() {
            return;
        }
        let rect = match (self.opts.selection_style, state.selected_text()) {
            (SelectionStyle::TextBounds, Some(t)) => {
                text_bounds(&mut self.text, t).inflate(self.opts.selection_padding, self.opts.selection_padding)
            }
            _ => canvas,
        };
        self.stroke_rect(surface, canvas, rect, SELECTION_STROKE);
    }

    fn stroke_rect(&mut self, surface: &mut Surface, canvas: Rect, rect: Rect, stroke: DashStroke) {
        // Edges beyond the margin are invisible; clamping keeps the dash count bounded.
        let Some(rect) = visible_part(canvas, rect, stroke.width) else {
            return;
        };
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to((rect.x0, rect.y0));
        path.line_to((rect.x1, rect.y0));
        path.line_to((rect.x1, rect.y1));
        path.line_to((rect.x0, rect.y1));
        path.close_path();
        self.stroke_path(surface, &path, stroke);
    }

    fn draw_crosshair(&mut self, surface: &mut Surface, canvas: Rect) {
        let c = canvas.center();
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to((canvas.x0, c.y));
        path.line_to((canvas.x1, c.y));
        path.move_to((c.x, canvas.y0));
        path.line_to((c.x, canvas.y1));
        self.stroke_path(surface, &path, DEV_STROKE);
    }

    fn stroke_path(&mut self, surface: &mut Surface, path: &vello_cpu::kurbo::BezPath, stroke: DashStroke) {
        let (Some(ctx), Some(scratch)) = (self.ctx.as_mut(), self.scratch.as_mut()) else {
            return;
        };
        let c = stroke.color;
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(stroke.width).with_dashes(0.0, [stroke.on, stroke.off]),
        );
        ctx.stroke_path(path);
        ctx.flush();
        ctx.render_to_pixmap(scratch);

        if let Err(err) = composite_in_place(
            surface.data_mut(),
            scratch.data_as_u8_slice(),
            1.0,
            BlendMode::Normal,
        ) {
            tracing::warn!(error = %err, "stroke composite failed; skipped");
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// Scale `raster` to fit inside `canvas` preserving aspect ratio, centered.
fn aspect_fit(canvas: Rect, raster: &Raster) -> Affine {
    let (iw, ih) = (f64::from(raster.width), f64::from(raster.height));
    let s = (canvas.width() / iw).min(canvas.height() / ih);
    let offset = Vec2::new((canvas.width() - iw * s) / 2.0, (canvas.height() - ih * s) / 2.0);
    Affine::translate(offset) * Affine::scale(s)
}

/// `rect` clamped to the canvas grown by twice the stroke width; `None` when degenerate.
fn visible_part(canvas: Rect, rect: Rect, stroke_width: f64) -> Option<Rect> {
    if rect.is_nan() {
        return None;
    }
    let bounds = canvas.inflate(stroke_width * 2.0, stroke_width * 2.0);
    let r = rect.abs();
    let clamped = Rect::new(
        r.x0.clamp(bounds.x0, bounds.x1),
        r.y0.clamp(bounds.y0, bounds.y1),
        r.x1.clamp(bounds.x0, bounds.x1),
        r.y1.clamp(bounds.y0, bounds.y1),
    );
    (clamped.width() > 0.0 && clamped.height() > 0.0).then_some(clamped)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
