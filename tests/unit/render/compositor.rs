use super::*;
use crate::model::element::{AnimatedImageElement, BackgroundElement, ImageElement, OverlayElement, TextStyle};
use crate::model::layer::create_layer;
use crate::model::raster::{GifAnimation, GifFrame, ImageSource};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid_layer(name: &str, z: i32, px: [u8; 4], w: u32, h: u32) -> Layer {
    let img = ImageElement::new(ImageSource::loaded(name, Raster::solid(w, h, px)));
    create_layer(name, z).with_element(Element::StaticImage(img))
}

fn state(layers: Vec<Layer>) -> CanvasState {
    let mut s = CanvasState::with_size(8, 8);
    s.layers = layers;
    s
}

fn render(state: &CanvasState) -> Surface {
    let mut compositor = Compositor::new(CompositorOpts::export());
    let mut surface = Surface::new(state.width, state.height).unwrap();
    compositor.render(&mut surface, state).unwrap();
    surface
}

#[test]
fn rendering_is_deterministic() {
    let s = state(vec![
        solid_layer("a", 0, RED, 6, 6),
        solid_layer("b", 1, [0, 0, 128, 128], 4, 4),
    ]);
    assert_eq!(render(&s).data(), render(&s).data());
}

#[test]
fn higher_z_paints_on_top_and_swapping_z_swaps_order() {
    let mut s = state(vec![solid_layer("red", 0, RED, 8, 8), solid_layer("blue", 1, BLUE, 8, 8)]);
    assert_eq!(render(&s).pixel(3, 3), Some(BLUE));

    s.layers[0].z_index = 1;
    s.layers[1].z_index = 0;
    assert_eq!(render(&s).pixel(3, 3), Some(RED));
}

#[test]
fn hidden_layers_and_unloaded_images_are_skipped() {
    let mut hidden = solid_layer("hidden", 5, BLUE, 8, 8);
    hidden.visible = false;
    let pending = create_layer("pending", 6).with_element(Element::StaticImage(ImageElement::new(
        ImageSource::pending("later.png"),
    )));
    let s = state(vec![solid_layer("red", 0, RED, 8, 8), hidden, pending]);
    assert_eq!(render(&s).pixel(0, 0), Some(RED));
}

#[test]
fn image_is_drawn_at_its_position() {
    let img = ImageElement::new(ImageSource::loaded("dot", Raster::solid(2, 2, RED))).at(4.0, 4.0);
    let s = state(vec![create_layer("dot", 0).with_element(Element::StaticImage(img))]);
    let out = render(&s);
    assert_eq!(out.pixel(5, 5), Some(RED));
    assert_eq!(out.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn layer_opacity_scales_output() {
    let s = state(vec![solid_layer("red", 0, RED, 8, 8).with_opacity(0.5)]);
    assert_eq!(render(&s).pixel(2, 2), Some([128, 0, 0, 128]));
}

#[test]
fn overlay_fills_canvas_with_its_blend_mode() {
    let base = solid_layer("base", 0, [200, 200, 200, 255], 8, 8);
    let overlay = OverlayElement::new(
        ImageSource::loaded("ov", Raster::solid(2, 2, [0, 0, 0, 255])),
        BlendMode::Screen,
    );
    let s = state(vec![base, create_layer("ov", 1).with_element(Element::Overlay(overlay))]);
    // Screen with black leaves the base unchanged everywhere.
    let out = render(&s);
    assert_eq!(out.pixel(0, 0), Some([200, 200, 200, 255]));
    assert_eq!(out.pixel(7, 7), Some([200, 200, 200, 255]));
}

#[test]
fn background_is_letterboxed() {
    let mut s = CanvasState::with_size(8, 4);
    let bg = BackgroundElement::new(ImageSource::loaded("bg", Raster::solid(4, 4, RED)));
    s.layers = vec![create_layer("Image Layer", 0).with_element(Element::Background(bg))];
    let out = render(&s);
    assert_eq!(out.pixel(4, 2), Some(RED));
    assert_eq!(out.pixel(0, 2), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(7, 2), Some([0, 0, 0, 0]));
}

#[test]
fn animated_frame_out_of_range_is_skipped_without_error() {
    let anim = GifAnimation {
        width: 8,
        height: 8,
        frames: vec![
            GifFrame { raster: Raster::solid(8, 8, RED), delay_ms: 100 },
            GifFrame { raster: Raster::solid(8, 8, BLUE), delay_ms: 100 },
        ],
    };
    let mut el = AnimatedImageElement::new("a.gif", anim, 10.0);
    el.current_frame = 1;
    let mut s = state(vec![create_layer("GIF Layer", 0).with_element(Element::AnimatedImage(el))]);
    assert_eq!(render(&s).pixel(0, 0), Some(BLUE));

    if let Some(a) = s.layers[0].elements[0].as_animated_mut() {
        a.current_frame = 7;
    }
    assert_eq!(render(&s).pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn boundary_and_selection_only_with_cosmetic_opts() {
    let mut s = CanvasState::with_size(40, 40);
    s.layers = vec![create_layer("Text Layer", 0).with_element(Element::Text(TextElement::new(
        "hi",
        20.0,
        20.0,
        TextStyle::default(),
    )))];
    s.selected_layer_index = Some(0);

    let mut compositor = Compositor::new(CompositorOpts::export());
    let mut plain = Surface::new(40, 40).unwrap();
    compositor.render(&mut plain, &s).unwrap();
    assert!(plain.data().iter().all(|&b| b == 0));

    let opts = CompositorOpts::default().with_selection_style(SelectionStyle::CanvasBounds);
    let mut decorated = Surface::new(40, 40).unwrap();
    compositor.render_with(&mut decorated, &s, opts).unwrap();
    assert_ne!(decorated.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(compositor.opts(), &CompositorOpts::export());
}

#[test]
fn clear_color_fills_background() {
    let mut compositor = Compositor::new(CompositorOpts::export().with_clear_rgba(Some(Rgba8::WHITE)));
    let mut surface = Surface::new(4, 4).unwrap();
    compositor.render(&mut surface, &state(vec![])).unwrap();
    assert_eq!(surface.pixel(3, 3), Some([255, 255, 255, 255]));
}

fn selected_text_state(scale: crate::foundation::core::Scale) -> CanvasState {
    let mut text = TextElement::new("hi", 20.0, 20.0, TextStyle::default());
    text.scale = scale;
    let mut s = CanvasState::with_size(40, 40);
    s.layers = vec![create_layer("Text Layer", 0).with_element(Element::Text(text))];
    s.selected_layer_index = Some(0);
    s.selected_element = Some(0);
    s
}

#[test]
fn selection_around_huge_text_is_clamped_to_the_canvas() {
    use crate::foundation::core::Scale;

    let opts = CompositorOpts::default()
        .with_boundary(false)
        .with_selection_padding(0.0);
    let mut compositor = Compositor::new(opts);

    // Without fonts the box is 32 px tall around y = 20, so its edges sit on rows 4 and 36.
    let mut wide = Surface::new(40, 40).unwrap();
    compositor
        .render(&mut wide, &selected_text_state(Scale::new(1e12, 1.0)))
        .unwrap();
    let edge_painted = (0..40).any(|x| matches!(wide.pixel(x, 4), Some([_, _, _, a]) if a > 0));
    assert!(edge_painted);
    assert_eq!(wide.pixel(20, 20), Some([0, 0, 0, 0]));

    let mut unbounded = Surface::new(40, 40).unwrap();
    compositor
        .render(&mut unbounded, &selected_text_state(Scale::new(f64::INFINITY, f64::INFINITY)))
        .unwrap();
    assert_eq!(unbounded.pixel(20, 20), Some([0, 0, 0, 0]));
}
