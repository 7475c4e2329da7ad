use super::*;
use crate::foundation::core::{Spin, SpinDirection};
use crate::model::layer::create_layer;
use crate::model::raster::{GifAnimation, GifFrame, Raster};

fn gif_layer(frames: usize, fps: f64) -> Layer {
    let anim = GifAnimation {
        width: 1,
        height: 1,
        frames: (0..frames)
            .map(|_| GifFrame {
                raster: Raster::solid(1, 1, [0, 0, 0, 255]),
                delay_ms: 100,
            })
            .collect(),
    };
    create_layer("GIF Layer", 0).with_element(Element::AnimatedImage(
        AnimatedImageElement::new("a.gif", anim, fps),
    ))
}

fn spin_layer(speed: f64, direction: SpinDirection) -> Layer {
    let mut layer = gif_layer(1, 10.0);
    if let Some(a) = layer.elements[0].as_animated_mut() {
        a.spin = Some(Spin::new(speed, direction));
    }
    layer
}

fn anim(layer: &Layer) -> &AnimatedImageElement {
    layer.elements[0].as_animated().expect("animated element")
}

#[test]
fn one_second_at_10fps_cycles_five_frames_twice() {
    let clock = AnimationClock::new();
    let mut layers = vec![gif_layer(5, 10.0)];
    assert!(clock.update(&mut layers, 1.0));
    assert_eq!(anim(&layers[0]).current_frame, 0);
    assert!(anim(&layers[0]).frame_elapsed.abs() < 1e-9);
}

#[test]
fn frames_accumulate_across_small_ticks() {
    let clock = AnimationClock::new();
    let mut layers = vec![gif_layer(5, 10.0)];
    for _ in 0..3 {
        clock.update(&mut layers, 0.05);
    }
    // 150 ms elapsed: one advance, 50 ms carried.
    assert_eq!(anim(&layers[0]).current_frame, 1);
    assert!((anim(&layers[0]).frame_elapsed - 50.0).abs() < 1e-6);
}

#[test]
fn clockwise_rotation_wraps() {
    let clock = AnimationClock::new();
    let mut layers = vec![spin_layer(180.0, SpinDirection::Clockwise)];
    clock.update(&mut layers, 3.0);
    assert_eq!(anim(&layers[0]).angle(), 180.0);
}

#[test]
fn counter_clockwise_rotation_stays_positive() {
    let clock = AnimationClock::new();
    let mut layers = vec![spin_layer(90.0, SpinDirection::CounterClockwise)];
    clock.update(&mut layers, 1.0);
    assert_eq!(anim(&layers[0]).angle(), 270.0);
}

#[test]
fn no_direction_means_no_rotation() {
    let clock = AnimationClock::new();
    let mut layers = vec![spin_layer(90.0, SpinDirection::None)];
    clock.update(&mut layers, 1.0);
    assert_eq!(anim(&layers[0]).angle(), 0.0);
}

#[test]
fn paused_group_does_not_accumulate() {
    let mut clock = AnimationClock::new();
    let mut layers = vec![gif_layer(4, 10.0)];
    clock.add_group(AnimationGroup::new("clip", vec![layers[0].id]));
    assert!(clock.pause("clip"));

    assert!(!clock.update(&mut layers, 5.0));
    assert_eq!(anim(&layers[0]).current_frame, 0);
    assert_eq!(anim(&layers[0]).frame_elapsed, 0.0);

    clock.play("clip");
    clock.update(&mut layers, 0.1);
    assert_eq!(anim(&layers[0]).current_frame, 1);
}

#[test]
fn playback_rate_scales_time() {
    let mut clock = AnimationClock::new();
    let mut layers = vec![gif_layer(8, 10.0)];
    clock.add_group(AnimationGroup::new("fast", vec![layers[0].id]));
    assert!(clock.set_playback_rate("fast", 2.0));
    assert!(!clock.set_playback_rate("fast", f64::NAN));
    clock.update(&mut layers, 0.25);
    assert_eq!(anim(&layers[0]).current_frame, 5);
}

#[test]
fn invalid_delta_and_empty_frames_are_ignored() {
    let clock = AnimationClock::new();
    let mut layers = vec![gif_layer(0, 10.0), gif_layer(3, 0.0)];
    assert!(!clock.update(&mut layers, -1.0));
    assert!(!clock.update(&mut layers, f64::INFINITY));
    assert!(!clock.update(&mut layers, 1.0));
    assert_eq!(anim(&layers[1]).current_frame, 0);
}

#[test]
fn groups_are_replaced_by_id() {
    let mut clock = AnimationClock::new();
    clock.add_group(AnimationGroup::new("a", vec![]));
    clock.add_group(AnimationGroup::new("a", vec![LayerId::new()]));
    assert_eq!(clock.groups().len(), 1);
    assert_eq!(clock.groups()[0].layer_ids.len(), 1);
    assert!(clock.remove_group("a").is_some());
    assert!(!clock.pause("a"));
}

#[test]
fn long_gap_catches_up_in_one_step() {
    let clock = AnimationClock::new();
    let mut layers = vec![gif_layer(3, 10.0)];
    assert!(clock.update(&mut layers, 100.05));
    let a = anim(&layers[0]);
    assert_eq!(a.current_frame, 1000 % 3);
    assert!((a.frame_elapsed - 50.0).abs() < 1e-6);
}

#[test]
fn huge_delta_stays_bounded() {
    let clock = AnimationClock::new();
    let mut layers = vec![gif_layer(3, 24.0)];
    clock.update(&mut layers, 1e17);
    let a = anim(&layers[0]);
    assert!(a.current_frame < 3);
    assert!(a.frame_elapsed >= 0.0 && a.frame_elapsed < 1000.0 / 24.0);

    clock.update(&mut layers, f64::MAX);
    let a = anim(&layers[0]);
    assert!(a.current_frame < 3);
    assert!(a.frame_elapsed.is_finite());
}
