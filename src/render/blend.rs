//! Premultiplied RGBA8 compositing kernels.
//!
//! Separable blend modes follow the W3C compositing formulas: the blend function sees
//! unpremultiplied channels and the result is combined with source-over.

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::mul_div255_u8;
use crate::model::layer::BlendMode;

/// Composite `src` over `dst` in place with `opacity` and `blend`.
pub fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    blend: BlendMode,
) -> CanvasResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CanvasError::validation(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }

    // Dispatch once per call; each arm gets its own monomorphized kernel.
    match blend {
        BlendMode::Normal => {
            over_in_place(dst, src, opacity);
            Ok(())
        }
        BlendMode::Multiply => blend_in_place(dst, src, opacity, |s, d| s * d),
        BlendMode::Screen => blend_in_place(dst, src, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => blend_in_place(dst, src, opacity, |s, d| hard_light(d, s)),
        BlendMode::Darken => blend_in_place(dst, src, opacity, f32::min),
        BlendMode::Lighten => blend_in_place(dst, src, opacity, f32::max),
        BlendMode::ColorDodge => blend_in_place(dst, src, opacity, |s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        BlendMode::ColorBurn => blend_in_place(dst, src, opacity, |s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        BlendMode::HardLight => blend_in_place(dst, src, opacity, hard_light),
        BlendMode::SoftLight => blend_in_place(dst, src, opacity, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::Difference => blend_in_place(dst, src, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => blend_in_place(dst, src, opacity, |s, d| d + s - 2.0 * d * s),
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

fn opacity_u16(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Source-over of a single premultiplied pixel.
pub(crate) fn over_px(d: &mut [u8], s: [u8; 4], op: u16) {
    let sa = mul_div255_u8(u16::from(s[3]), op);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - u16::from(sa);
    d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        let sc = mul_div255_u8(u16::from(s[c]), op);
        let dc = mul_div255_u8(u16::from(d[c]), inv);
        d[c] = sc.saturating_add(dc);
    }
}

fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) {
    let op = opacity_u16(opacity);
    if op == 0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, [s[0], s[1], s[2], s[3]], op);
    }
}

#[inline(always)]
fn blend_in_place<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F) -> CanvasResult<()>
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    let unpremul = |p: f32, a: f32| if a > 0.0 { (p / a).clamp(0.0, 1.0) } else { 0.0 };

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = f32::from(s[3]) / 255.0 * opacity;
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = f32::from(s[c]) / 255.0 * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let b = blend_fn(unpremul(sp, sa), unpremul(dp, da)).clamp(0.0, 1.0);
            let out_p = sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da;
            d[c] = (out_p.min(out_a) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
