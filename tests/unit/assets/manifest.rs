use super::*;

const MANIFEST: &str = r#"[
  {"name": "grain", "src": "/assets/user/overlays/grain_multiply.png", "size_kb": 12,
   "hash_sha256": "ab", "type": "overlay", "class": "overlay", "ext": "png",
   "blendMode": "multiply", "tags": ["texture"], "credits": null, "license": "CC0"},
  {"name": "dance", "src": "/assets/user/gif/dance.gif", "size_kb": 80, "hash_sha256": "cd",
   "type": "gif", "class": "animation", "ext": "gif",
   "animation": {"frames": {"count": 12, "rate": 15}}, "tags": [], "extra": true},
  {"name": "star", "src": "/assets/user/stickers/star.webp", "type": "sticker",
   "class": "sticker", "ext": "webp", "width": 64, "height": 64, "tags": []},
  {"name": "mono", "src": "/assets/user/fonts/mono.ttf", "type": "font", "class": "font",
   "ext": "ttf", "font": false, "tags": []},
  {"name": "frame", "src": "/assets/user/borders/frame.png", "type": "border",
   "class": "border", "ext": "png", "tags": []}
]"#;

#[test]
fn parses_all_entries() {
    let entries = parse_manifest(MANIFEST).unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[2].width, Some(64));
    assert_eq!(entries[4].class, AssetClass::Other);
}

#[test]
fn elements_follow_class() {
    let entries = parse_manifest(MANIFEST).unwrap();

    match entries[0].to_element().unwrap() {
        Element::Overlay(o) => assert_eq!(o.blend_mode, BlendMode::Multiply),
        other => panic!("expected overlay, got {other:?}"),
    }
    match entries[1].to_element().unwrap() {
        Element::AnimatedImage(a) => {
            assert_eq!(a.frame_rate, 15.0);
            assert_eq!(a.src, "/assets/user/gif/dance.gif");
            assert_eq!(a.frame_count(), 0);
        }
        other => panic!("expected animated image, got {other:?}"),
    }
    assert!(matches!(entries[2].to_element().unwrap(), Element::Sticker(_)));
    assert!(entries[3].to_element().is_err());
    assert!(matches!(entries[4].to_element().unwrap(), Element::StaticImage(_)));
}

#[test]
fn to_layer_names_layer_after_asset() {
    let entries = parse_manifest(MANIFEST).unwrap();
    let layer = entries[2].to_layer(7).unwrap();
    assert_eq!(layer.name, "star");
    assert_eq!(layer.z_index, 7);
    assert_eq!(layer.elements.len(), 1);
}

#[test]
fn malformed_manifest_is_serde_error() {
    let err = parse_manifest("{").unwrap_err();
    assert!(matches!(err, CanvasError::Serde(_)));
}
