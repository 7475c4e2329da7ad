use serde::{Deserialize, Serialize};

use crate::foundation::error::{CanvasError, CanvasResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Element anchor in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Non-uniform scale factors. Defaults to identity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Scale {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(s: f64) -> Self {
        Self { x: s, y: s }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpinDirection {
    Clockwise,
    CounterClockwise,
    #[default]
    #[serde(rename = "n/a")]
    None,
}

impl SpinDirection {
    /// +1 for clockwise, -1 for counter-clockwise, 0 when not spinning.
    pub fn sign(self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
            Self::None => 0.0,
        }
    }
}

/// Continuous rotation state for animated elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    /// Degrees per second.
    pub speed: f64,
    pub direction: SpinDirection,
    /// Degrees, kept in `[0, 360)` by the animation clock.
    #[serde(default)]
    pub current_angle: f64,
}

impl Spin {
    pub fn new(speed: f64, direction: SpinDirection) -> Self {
        Self {
            speed,
            direction,
            current_angle: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.direction != SpinDirection::None
    }
}

/// Straight (non-premultiplied) RGBA8 color. Serialized as a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (case-insensitive, `#` optional).
    pub fn from_hex(s: &str) -> CanvasResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        // `from_str_radix` alone would accept a leading `+` in each pair.
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CanvasError::validation(format!("invalid hex color \"{s}\"")));
        }

        fn hex_byte(pair: &str) -> CanvasResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| CanvasError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        fn hex_nibble(c: &str) -> CanvasResult<u8> {
            let v = u8::from_str_radix(c, 16)
                .map_err(|_| CanvasError::validation(format!("invalid hex digit \"{c}\"")))?;
            Ok(v * 17)
        }

        match s.len() {
            3 | 4 => {
                let r = hex_nibble(&s[0..1])?;
                let g = hex_nibble(&s[1..2])?;
                let b = hex_nibble(&s[2..3])?;
                let a = if s.len() == 4 {
                    hex_nibble(&s[3..4])?
                } else {
                    255
                };
                Ok(Self::rgba(r, g, b, a))
            }
            6 | 8 => {
                let r = hex_byte(&s[0..2])?;
                let g = hex_byte(&s[2..4])?;
                let b = hex_byte(&s[4..6])?;
                let a = if s.len() == 8 {
                    hex_byte(&s[6..8])?
                } else {
                    255
                };
                Ok(Self::rgba(r, g, b, a))
            }
            _ => Err(CanvasError::validation(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA",
            )),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_premul_array(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Element placement: translate to `position`, rotate by `angle_deg`, then scale.
pub fn element_transform(position: Position, angle_deg: f64, scale: Scale) -> Affine {
    let t_translate = Affine::translate(Vec2::new(position.x, position.y));
    let t_rotate = Affine::rotate(angle_deg.to_radians());
    let t_scale = Affine::scale_non_uniform(scale.x, scale.y);
    t_translate * t_rotate * t_scale
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
