use crate::foundation::core::Rgba8;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Owned drawing target: premultiplied RGBA8, row-major.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

/// Read-back frame handed to encoders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba8 {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl Surface {
    /// Allocate a transparent surface.
    ///
    /// Zero or oversized dimensions mean no drawing context can exist, which is a setup error.
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::setup(format!(
                "cannot create a {width}x{height} drawing surface"
            )));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| CanvasError::setup("surface width exceeds 65535"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| CanvasError::setup("surface height exceeds 65535"))?;
        Ok(Self {
            width: w,
            height: h,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub(crate) fn width_u16(&self) -> u16 {
        self.width
    }

    pub(crate) fn height_u16(&self) -> u16 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Fill with a straight color (transparent when `None`).
    pub fn clear(&mut self, color: Option<Rgba8>) {
        let px = color.map(Rgba8::to_premul_array).unwrap_or([0, 0, 0, 0]);
        for d in self.data_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    pub fn to_frame(&self) -> FrameRgba8 {
        FrameRgba8 {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }
}

impl FrameRgba8 {
    /// Straight-alpha pixels, converting if needed.
    pub fn into_straight(mut self) -> Vec<u8> {
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut self.data);
        }
        self.data
    }
}

/// Wrap premultiplied bytes as a `vello_cpu` image paint.
pub(crate) fn premul_to_image(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CanvasResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CanvasError::validation("image width exceeds 65535"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CanvasError::validation("image height exceeds 65535"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CanvasError::validation("raster byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
