use std::io::Cursor;

use super::*;
use crate::assets::manifest::parse_manifest;
use crate::export::sink::InMemorySink;
use crate::model::layer::Layer;
use crate::persist::storage::{APP_STATE_KEY, MemoryStorage};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn gif(frames: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        for i in 0..frames {
            let shade = (i * 100) as u8;
            let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([shade, 0, 0, 255]));
            enc.encode_frame(image::Frame::from_parts(
                img,
                0,
                0,
                image::Delay::from_numer_denom_ms(100, 1),
            ))
            .unwrap();
        }
    }
    buf
}

fn small() -> EditorConfig {
    EditorConfig::default().with_canvas_size(16, 8)
}

#[test]
fn image_upload_sets_base_image_and_aspect() {
    let mut editor = Editor::new(small());
    editor.upload("photo.png", &png(4, 2)).unwrap();
    let s = editor.store().state();
    assert_eq!(s.layers.len(), 1);
    assert_eq!(s.layers[0].name, "Image Layer");
    assert_eq!(s.aspect_ratio, Some(2.0));
}

#[test]
fn gif_upload_replaces_animation_layer() {
    let mut editor = Editor::new(small());
    editor.upload("a.gif", &gif(2)).unwrap();
    editor.upload("b.gif", &gif(3)).unwrap();
    let animated: Vec<&Layer> = editor
        .store()
        .layers()
        .iter()
        .filter(|l| l.has_animation())
        .collect();
    assert_eq!(animated.len(), 1);
    let a = animated[0].elements[0].as_animated().unwrap();
    assert_eq!(a.frame_count(), 3);
    assert_eq!(a.frame_rate, 24.0);
}

#[test]
fn rejected_upload_leaves_state_untouched() {
    let mut editor = Editor::new(small());
    let before = editor.store().get();
    let err = editor.upload("logo.svg", b"<svg/>").unwrap_err();
    assert!(matches!(err, CanvasError::UnsupportedExtension(_)));
    let err = editor.upload("broken.png", b"nope").unwrap_err();
    assert!(matches!(err, CanvasError::Asset(_)));
    assert_eq!(editor.store().get(), before);
}

#[test]
fn tick_advances_gif_frames() {
    let mut editor = Editor::new(small());
    editor.upload("a.gif", &gif(3)).unwrap();
    assert!(editor.tick(1.0 / 24.0 + 1e-6));
    let a = editor.store().layers()[0].elements[0].as_animated().unwrap();
    assert_eq!(a.current_frame, 1);
}

#[test]
fn delete_key_removes_selected_text() {
    let mut editor = Editor::new(small());
    editor.add_text("one", 1.0, 1.0);
    editor.add_text("two", 2.0, 2.0);
    editor.store_mut().select_element(0, 1);

    assert!(editor.handle_key(EditorKey::Delete));
    assert!(!editor.handle_key(EditorKey::Delete));
    assert_eq!(editor.store().layers()[0].elements.len(), 1);

    assert!(editor.handle_key(EditorKey::Undo));
    assert_eq!(editor.store().layers()[0].elements.len(), 2);
    assert!(editor.handle_key(EditorKey::Redo));
    assert_eq!(editor.store().layers()[0].elements.len(), 1);
}

#[test]
fn added_text_uses_configured_style() {
    let mut cfg = small();
    cfg.text.font_size = 48.0;
    let mut editor = Editor::new(cfg);
    editor.add_text("big", 0.0, 0.0);
    let t = editor.store().state().text_elements().next().unwrap();
    assert_eq!(t.style.font_size, 48.0);
    assert_eq!(t.style.font_family, "Arial");
}

#[test]
fn storage_is_hydrated_and_kept_in_sync() {
    let storage = MemoryStorage::new();
    {
        let mut editor = Editor::with_storage(small(), storage.clone());
        editor.add_text("persist me", 3.0, 4.0);
    }
    let saved = storage.get(APP_STATE_KEY).unwrap();
    assert!(saved.contains("persist me"));

    let editor = Editor::with_storage(small(), storage);
    let t = editor.store().state().text_elements().next().unwrap();
    assert_eq!(t.text, "persist me");
    assert!(!editor.store().can_undo());
}

#[test]
fn manifest_asset_is_added_with_pixels() {
    let entries = parse_manifest(
        r#"[{"name": "star", "src": "star.png", "type": "sticker", "class": "sticker", "ext": "png", "tags": []}]"#,
    )
    .unwrap();
    let mut editor = Editor::new(small());
    let id = editor.add_asset(&entries[0], Some(&png(2, 2))).unwrap();
    let (li, ei) = editor.store().find_element(id).unwrap();
    match &editor.store().layers()[li].elements[ei] {
        Element::Sticker(s) => assert!(s.image.is_loaded()),
        other => panic!("expected sticker, got {other:?}"),
    }
}

#[test]
fn gif_export_uses_configured_frame_count() {
    let mut editor = Editor::new(small().with_file_name("card"));
    editor.upload("a.gif", &gif(2)).unwrap();
    let mut sink = InMemorySink::new();
    editor.export_gif_to(None, &mut sink).unwrap();
    assert_eq!(sink.frames().len(), 60);
    assert_eq!(sink.config().map(|c| c.frame_delay_ms), Some(100));
    assert_eq!(editor.default_file_name("gif"), "card.gif");
}

#[test]
fn render_and_export_png() {
    let mut editor = Editor::new(small());
    editor.upload("photo.png", &png(16, 8)).unwrap();
    editor.compositor_mut().set_opts(CompositorOpts::export());
    let mut surface = editor.new_surface().unwrap();
    editor.render(&mut surface).unwrap();
    assert_eq!(surface.pixel(8, 4), Some([255, 0, 0, 255]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(editor.default_file_name("png"));
    editor.export_png(&path).unwrap();
    assert!(path.is_file());
    assert!(!editor.export_png_bytes().unwrap().is_empty());
}

#[test]
fn pending_assets_are_loaded_relative_to_root() {
    use crate::model::element::ImageElement;
    use crate::model::layer::create_layer;
    use crate::store::state::CanvasState;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dot.png"), png(2, 2)).unwrap();

    let mut state = CanvasState::with_size(16, 8);
    state.layers = vec![
        create_layer("found", 0).with_element(Element::StaticImage(ImageElement::new(
            ImageSource::pending("dot.png"),
        ))),
        create_layer("missing", 1).with_element(Element::StaticImage(ImageElement::new(
            ImageSource::pending("nowhere.png"),
        ))),
    ];
    let mut editor = Editor::with_state(small(), state);

    assert_eq!(editor.load_pending_assets(dir.path()), 1);
    let loaded: Vec<bool> = editor
        .store()
        .layers()
        .iter()
        .map(|l| l.elements[0].image_source().is_some_and(ImageSource::is_loaded))
        .collect();
    assert_eq!(loaded, vec![true, false]);
    assert!(!editor.store().can_undo());
}

#[test]
fn text_hit_testing_uses_measured_bounds() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_text("hi", 50.0, 50.0);

    assert_eq!(editor.text_at(Point::new(50.0, 50.0)), Some((0, 0)));
    assert_eq!(editor.text_at(Point::new(5.0, 5.0)), None);

    // No fonts: 0.55 * 32 * 2 wide, 32 tall, so the corner sits at (67.6, 66).
    assert!(editor.is_on_resize_handle(0, 0, Point::new(67.0, 65.0)));
    assert!(!editor.is_on_resize_handle(0, 0, Point::new(50.0, 50.0)));
    assert!(!editor.is_on_resize_handle(3, 0, Point::new(67.0, 65.0)));

    // Bottom edges are inclusive for both the box and the 10 px handle.
    assert_eq!(editor.text_at(Point::new(50.0, 66.0)), Some((0, 0)));
    assert!(editor.is_on_resize_handle(0, 0, Point::new(65.0, 71.0)));
    assert!(!editor.is_on_resize_handle(0, 0, Point::new(65.0, 71.5)));
}

#[test]
fn handle_drag_grows_and_floors_font_size() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_text("hi", 50.0, 50.0);
    let size = |e: &Editor| e.store().layers()[0].elements[0].as_text().map(|t| t.style.font_size);

    editor.store_mut().begin_drag();
    assert!(editor.resize_text_from_handle(0, 0, 32.0, 12.0));
    assert_eq!(size(&editor), Some(44.0));
    assert!(editor.resize_text_from_handle(0, 0, 32.0, -100.0));
    editor.store_mut().end_drag();
    assert_eq!(size(&editor), Some(10.0));

    assert!(editor.handle_key(EditorKey::Undo));
    assert_eq!(size(&editor), Some(32.0));
}
