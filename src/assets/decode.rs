use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::foundation::core::{PixelSize, Rect, premultiply_rgba8_in_place};
use crate::foundation::error::{CoverError, CoverResult};

/// Largest source width or height the scale pass can sample from.
pub const MAX_SOURCE_DIM_PX: u32 = u16::MAX as u32;

/// A decoded source bitmap.
///
/// Pixels are premultiplied RGBA8, row-major, tightly packed. Cloning is cheap;
/// the pixel buffer and the sampling paint built from it are shared.
///
/// Bitmaps wider or taller than [`MAX_SOURCE_DIM_PX`] can be held but not
/// drawn: drawing one fails with [`CoverError::DegenerateInput`].
#[derive(Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    paint: Arc<OnceLock<vello_cpu::Image>>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("paint_cached", &self.paint.get().is_some())
            .finish_non_exhaustive()
    }
}

impl SourceImage {
    /// Wrap an already premultiplied buffer.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> CoverResult<Self> {
        let expected = PixelSize::new(width, height).rgba8_len()?;
        if rgba8_premul.len() != expected {
            return Err(CoverError::validation(format!(
                "source buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            paint: Arc::new(OnceLock::new()),
        })
    }

    /// Wrap a straight-alpha buffer, premultiplying it.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CoverResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, rgba8)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Full extent of the bitmap; the default sampling rectangle.
    pub fn bounds(&self) -> Rect {
        self.size().to_rect()
    }

    pub fn rgba8_premul(&self) -> &[u8] {
        self.rgba8_premul.as_slice()
    }

    /// Image paint sampling this bitmap. Built on first use, then shared by
    /// every clone and every draw.
    pub(crate) fn image_paint(&self) -> CoverResult<vello_cpu::Image> {
        if let Some(paint) = self.paint.get() {
            return Ok(paint.clone());
        }
        let pixmap = premul_bytes_to_pixmap(self)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        Ok(self.paint.get_or_init(|| paint).clone())
    }
}

fn premul_bytes_to_pixmap(source: &SourceImage) -> CoverResult<vello_cpu::Pixmap> {
    let (Ok(w), Ok(h)) = (u16::try_from(source.width), u16::try_from(source.height)) else {
        return Err(CoverError::degenerate(format!(
            "source {}x{} exceeds {MAX_SOURCE_DIM_PX} px per side",
            source.width, source.height
        )));
    };
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(usize::from(w) * usize::from(h));
    for px in source.rgba8_premul().chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
///
/// Decoding does not enforce [`MAX_SOURCE_DIM_PX`]; oversized bitmaps are
/// rejected when drawn.
pub fn decode_image(bytes: &[u8]) -> CoverResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_straight_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
