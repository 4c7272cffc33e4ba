//! Scoped drawing against a [`RenderSurface`].
//!
//! A session borrows the surface exclusively for its lifetime and is closed by
//! `Drop`, so it ends on every exit path including `?` early returns.

use crate::effects::composite;
use crate::foundation::core::{PixelSize, Rect, Rgba8Premul};
use crate::foundation::error::{CoverError, CoverResult};
use crate::surface::allocator::RenderSurface;

pub struct DrawingSession<'s> {
    surface: &'s mut RenderSurface,
}

impl RenderSurface {
    /// Open a session, clearing the surface to `clear` first.
    pub fn begin_draw(&mut self, clear: Rgba8Premul) -> DrawingSession<'_> {
        self.sessions_opened += 1;
        tracing::trace!(surface = self.id().0, "drawing session opened");
        let mut session = DrawingSession { surface: self };
        session.clear(clear);
        session
    }
}

impl DrawingSession<'_> {
    pub fn size(&self) -> PixelSize {
        self.surface.pixel_size()
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        composite::fill(self.surface.data_mut(), color.to_array());
    }

    /// Composite a premultiplied image over the surface, stretched to `dest`.
    ///
    /// `dest` is in surface pixels and is clipped to the surface bounds.
    pub fn draw_image(
        &mut self,
        rgba8_premul: &[u8],
        src_size: PixelSize,
        dest: Rect,
    ) -> CoverResult<()> {
        if rgba8_premul.len() != src_size.rgba8_len()? {
            return Err(CoverError::draw(
                "draw_image expects a buffer matching width*height*4",
            ));
        }
        if src_size.is_empty() || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }

        let size = self.size();
        let x0 = dest.x0.round().max(0.0) as u32;
        let y0 = dest.y0.round().max(0.0) as u32;
        let x1 = (dest.x1.round().max(0.0) as u32).min(size.width);
        let y1 = (dest.y1.round().max(0.0) as u32).min(size.height);

        let sx = f64::from(src_size.width) / dest.width();
        let sy = f64::from(src_size.height) / dest.height();
        let stride = size.width as usize;
        let src_stride = src_size.width as usize;
        let data = self.surface.data_mut();

        for y in y0..y1 {
            let v = ((f64::from(y) + 0.5 - dest.y0) * sy).floor();
            let v = (v.max(0.0) as u32).min(src_size.height - 1) as usize;
            for x in x0..x1 {
                let u = ((f64::from(x) + 0.5 - dest.x0) * sx).floor();
                let u = (u.max(0.0) as u32).min(src_size.width - 1) as usize;

                let si = (v * src_stride + u) * 4;
                let di = ((y as usize) * stride + (x as usize)) * 4;
                let src = [
                    rgba8_premul[si],
                    rgba8_premul[si + 1],
                    rgba8_premul[si + 2],
                    rgba8_premul[si + 3],
                ];
                let dst = [data[di], data[di + 1], data[di + 2], data[di + 3]];
                data[di..di + 4].copy_from_slice(&composite::over(dst, src));
            }
        }
        Ok(())
    }
}

impl Drop for DrawingSession<'_> {
    fn drop(&mut self) {
        self.surface.sessions_closed += 1;
        tracing::trace!(surface = self.surface.id().0, "drawing session closed");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/session.rs"]
mod tests;
