use super::*;
use crate::model::element::{Element, TextElement, TextStyle};

#[test]
fn create_layer_defaults() {
    let l = create_layer("Text Layer", 3);
    assert_eq!(l.name, "Text Layer");
    assert_eq!(l.z_index, 3);
    assert!(l.visible);
    assert_eq!(l.opacity, 1.0);
    assert_eq!(l.blend_mode, BlendMode::Normal);
    assert!(l.elements.is_empty());
}

#[test]
fn layer_ids_are_unique() {
    let a = create_layer("a", 0);
    let b = create_layer("a", 0);
    assert_ne!(a.id, b.id);
}

#[test]
fn paint_order_is_stable_on_ties_and_skips_hidden() {
    let mut layers = vec![
        create_layer("a", 1),
        create_layer("b", 0),
        create_layer("c", 1),
        create_layer("d", -5),
    ];
    layers[3].visible = false;
    assert_eq!(paint_order(&layers), vec![1, 0, 2]);
}

#[test]
fn blend_mode_names_round_trip() {
    assert_eq!(BlendMode::Normal.composite_op(), "source-over");
    assert_eq!(BlendMode::from_name(None), Some(BlendMode::Normal));
    assert_eq!(BlendMode::from_name(Some("")), Some(BlendMode::Normal));
    assert_eq!(
        BlendMode::from_name(Some("color-dodge")),
        Some(BlendMode::ColorDodge)
    );
    assert_eq!(BlendMode::from_name(Some("plasma")), None);

    let json = serde_json::to_string(&BlendMode::HardLight).unwrap();
    assert_eq!(json, "\"hard-light\"");
    assert!(serde_json::from_str::<BlendMode>("\"plasma\"").is_err());
}

#[test]
fn element_lookup_by_id() {
    let text = TextElement::new("hi", 1.0, 2.0, TextStyle::default());
    let id = text.id;
    let layer = create_layer("t", 0).with_element(Element::Text(text));
    assert!(layer.has_text());
    assert!(!layer.has_animation());
    assert_eq!(layer.element_index(id), Some(0));
}
