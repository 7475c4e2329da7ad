use super::*;
use crate::export::sink::InMemorySink;
use crate::model::element::{AnimatedImageElement, ImageElement};
use crate::model::layer::create_layer;
use crate::model::raster::{GifAnimation, GifFrame, ImageSource, Raster};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn two_frame_gif_layer() -> Layer {
    let anim = GifAnimation {
        width: 4,
        height: 4,
        frames: vec![
            GifFrame { raster: Raster::solid(4, 4, RED), delay_ms: 100 },
            GifFrame { raster: Raster::solid(4, 4, BLUE), delay_ms: 100 },
        ],
    };
    create_layer("GIF Layer", 0).with_element(Element::AnimatedImage(AnimatedImageElement::new(
        "a.gif", anim, 24.0,
    )))
}

fn first_px(frame: &crate::render::surface::FrameRgba8) -> [u8; 4] {
    [frame.data[0], frame.data[1], frame.data[2], frame.data[3]]
}

#[test]
fn gif_export_steps_frames_modulo_count() {
    let mut compositor = Compositor::default();
    let mut layers = vec![two_frame_gif_layer()];
    if let Some(a) = layers[0].elements[0].as_animated_mut() {
        a.current_frame = 1;
    }
    let mut sink = InMemorySink::new();

    export_gif(&mut compositor, &layers, 4, 4, 3, 100, &mut sink).unwrap();

    let px: Vec<[u8; 4]> = sink.frames().iter().map(|(_, f)| first_px(f)).collect();
    assert_eq!(px, vec![RED, BLUE, RED]);
    assert_eq!(
        layers[0].elements[0].as_animated().map(|a| a.current_frame),
        Some(1),
        "live layers untouched"
    );
    assert_eq!(compositor.opts(), &CompositorOpts::default());
}

#[test]
fn static_export_is_png_without_cosmetics() {
    let mut compositor = Compositor::default();
    let img = ImageElement::new(ImageSource::loaded("r", Raster::solid(4, 4, RED)));
    let layers = vec![create_layer("Image Layer", 0).with_element(Element::StaticImage(img))];

    let bytes = export_static(&mut compositor, &layers, 4, 4).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 4));
    assert_eq!(decoded.get_pixel(0, 0).0, RED);
}

#[test]
fn export_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut compositor = Compositor::default();
    let layers = vec![two_frame_gif_layer()];

    let png = dir.path().join("still.png");
    export_static_file(&mut compositor, &layers, 4, 4, &png).unwrap();
    assert!(png.is_file());

    let gif = dir.path().join("anim.gif");
    export_gif_file(&mut compositor, &layers, 4, 4, 2, 100, &gif).unwrap();
    let bytes = std::fs::read(&gif).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
}

#[test]
fn zero_size_export_is_setup_error() {
    let mut compositor = Compositor::default();
    let err = export_static(&mut compositor, &[], 0, 10).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn default_name_uses_config() {
    let cfg = EditorConfig::default();
    assert_eq!(default_file_name(&cfg, "gif"), "something_broke.gif");
}
