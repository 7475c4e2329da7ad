use serde::{Deserialize, Serialize};

use crate::foundation::math::wrap_degrees;
use crate::model::element::{AnimatedImageElement, Element};
use crate::model::ids::LayerId;
use crate::model::layer::Layer;

/// Named subset of layers that plays, pauses and scales time together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationGroup {
    pub id: String,
    pub layer_ids: Vec<LayerId>,
    pub is_playing: bool,
    pub playback_rate: f64,
}

impl AnimationGroup {
    pub fn new(id: impl Into<String>, layer_ids: Vec<LayerId>) -> Self {
        Self {
            id: id.into(),
            layer_ids,
            is_playing: true,
            playback_rate: 1.0,
        }
    }
}

/// Advances per-element animation progress. Performs no drawing.
///
/// Layers that belong to no group always play at rate 1. A layer listed in several groups uses
/// the first one.
#[derive(Clone, Debug, Default)]
pub struct AnimationClock {
    groups: Vec<AnimationGroup>,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }

    /// Add a group, replacing any existing group with the same id.
    pub fn add_group(&mut self, group: AnimationGroup) {
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(slot) => *slot = group,
            None => self.groups.push(group),
        }
    }

    pub fn remove_group(&mut self, id: &str) -> Option<AnimationGroup> {
        let i = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(i))
    }

    pub fn play(&mut self, id: &str) -> bool {
        self.with_group(id, |g| g.is_playing = true)
    }

    pub fn pause(&mut self, id: &str) -> bool {
        self.with_group(id, |g| g.is_playing = false)
    }

    pub fn set_playback_rate(&mut self, id: &str, rate: f64) -> bool {
        if !rate.is_finite() || rate < 0.0 {
            tracing::warn!(group = id, rate, "ignoring invalid playback rate");
            return false;
        }
        self.with_group(id, |g| g.playback_rate = rate)
    }

    fn with_group(&mut self, id: &str, f: impl FnOnce(&mut AnimationGroup)) -> bool {
        match self.groups.iter_mut().find(|g| g.id == id) {
            Some(g) => {
                f(g);
                true
            }
            None => false,
        }
    }

    /// Time multiplier for `layer`; 0 when its group is paused.
    fn rate_for(&self, layer: LayerId) -> f64 {
        match self.groups.iter().find(|g| g.layer_ids.contains(&layer)) {
            Some(g) if g.is_playing => g.playback_rate,
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    /// Advance rotation angles and GIF frame indices by `dt_seconds`.
    ///
    /// Returns whether any progress field changed. Negative or non-finite deltas are ignored.
    pub fn update(&self, layers: &mut [Layer], dt_seconds: f64) -> bool {
        if !dt_seconds.is_finite() || dt_seconds < 0.0 {
            tracing::warn!(dt_seconds, "ignoring invalid animation delta");
            return false;
        }
        let mut changed = false;
        for layer in layers.iter_mut() {
            let dt = dt_seconds * self.rate_for(layer.id);
            if dt <= 0.0 {
                continue;
            }
            for element in layer.elements.iter_mut() {
                if let Element::AnimatedImage(a) = element {
                    changed |= advance(a, dt);
                }
            }
        }
        changed
    }
}

fn advance(a: &mut AnimatedImageElement, dt: f64) -> bool {
    let mut changed = false;

    if let Some(spin) = a.spin.as_mut().filter(|s| s.is_active()) {
        let next = wrap_degrees(spin.current_angle + spin.direction.sign() * spin.speed * dt);
        if next.is_finite() {
            spin.current_angle = next;
            changed = true;
        }
    }

    let count = a.frames.len();
    let Some(duration) = a.frame_duration_ms() else {
        return changed;
    };
    if count == 0 {
        return changed;
    }

    a.frame_elapsed += dt * 1000.0;
    if !a.frame_elapsed.is_finite() {
        a.frame_elapsed = 0.0;
        return changed;
    }
    if a.frame_elapsed < duration {
        return changed;
    }
    // Catch up every whole frame in the gap at once.
    let steps = (a.frame_elapsed / duration).floor();
    a.frame_elapsed = (a.frame_elapsed - steps * duration).clamp(0.0, duration);
    if a.frame_elapsed >= duration {
        a.frame_elapsed = 0.0;
    }
    let skip = (steps % count as f64) as usize;
    a.current_frame = (a.current_frame % count + skip) % count;
    true
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
