//! The scale + blur filter node.
//!
//! A [`ScaleBlurEffect`] carries its own configuration (sampling rectangle,
//! destination rectangle, blur) and its own scratch storage, so two rendering
//! units never share mutable filter state. The render context and scratch
//! buffers survive across applications and are only rebuilt when the
//! destination size changes; the source paint is cached on the
//! [`SourceImage`] itself.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::assets::decode::SourceImage;
use crate::config::BlurParams;
use crate::effects::blur::{GaussianKernel, blur_rgba8_premul_into};
use crate::effects::composite;
use crate::foundation::core::{PixelSize, Rect};
use crate::foundation::error::{CoverError, CoverResult};

/// Result of one application: premultiplied RGBA8 sized to the destination rectangle.
#[derive(Debug)]
pub struct EffectOutput<'a> {
    pub size: PixelSize,
    pub rgba8_premul: &'a [u8],
}

pub struct ScaleBlurEffect {
    kernel: GaussianKernel,
    source_rect: Option<Rect>,
    dest_rect: Option<Rect>,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<(PixelSize, vello_cpu::Pixmap)>,
    tmp: Vec<u8>,
    out: Vec<u8>,
    applications: u64,
}

impl std::fmt::Debug for ScaleBlurEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleBlurEffect")
            .field("blur", &self.kernel.params())
            .field("source_rect", &self.source_rect)
            .field("dest_rect", &self.dest_rect)
            .field("applications", &self.applications)
            .finish_non_exhaustive()
    }
}

impl ScaleBlurEffect {
    pub fn new(blur: BlurParams) -> CoverResult<Self> {
        Ok(Self {
            kernel: GaussianKernel::new(blur)?,
            source_rect: None,
            dest_rect: None,
            ctx: None,
            scratch: None,
            tmp: Vec::new(),
            out: Vec::new(),
            applications: 0,
        })
    }

    pub fn blur(&self) -> BlurParams {
        self.kernel.params()
    }

    pub fn set_blur(&mut self, blur: BlurParams) -> CoverResult<()> {
        if blur != self.kernel.params() {
            self.kernel = GaussianKernel::new(blur)?;
        }
        Ok(())
    }

    /// Region of the source bitmap to sample.
    pub fn set_source_rect(&mut self, rect: Rect) {
        self.source_rect = Some(rect);
    }

    /// Region the scaled output is positioned in; its size is the output size.
    pub fn set_destination_rect(&mut self, rect: Rect) {
        self.dest_rect = Some(rect);
    }

    /// Forget the configured rectangles. Scratch storage is kept.
    pub fn reset(&mut self) {
        self.source_rect = None;
        self.dest_rect = None;
    }

    /// Times [`ScaleBlurEffect::apply`] has produced output.
    pub fn applications(&self) -> u64 {
        self.applications
    }

    /// Rescale the configured source region of `source` to the destination size and blur it.
    pub fn apply(&mut self, source: &SourceImage) -> CoverResult<EffectOutput<'_>> {
        let src_rect = self
            .source_rect
            .ok_or_else(|| CoverError::draw("scale-blur source rectangle is not set"))?;
        let dest_rect = self
            .dest_rect
            .ok_or_else(|| CoverError::draw("scale-blur destination rectangle is not set"))?;

        let bounds = source.bounds();
        let src_rect = src_rect.intersect(bounds);
        if src_rect.width() <= 0.0 || src_rect.height() <= 0.0 {
            return Err(CoverError::draw(
                "scale-blur source rectangle does not overlap the bitmap",
            ));
        }

        let size = PixelSize::new(
            dest_rect.width().round().max(0.0) as u32,
            dest_rect.height().round().max(0.0) as u32,
        );
        if size.is_empty() {
            return Err(CoverError::draw(
                "scale-blur destination rectangle has no pixels",
            ));
        }

        let paint = source.image_paint()?;
        let mut ctx = self.ctx_for(size)?;
        ctx.reset();
        let scratch = self.scratch_for(size)?;
        composite::fill(scratch.data_as_u8_slice_mut(), [0, 0, 0, 0]);
        scale_into(&mut ctx, scratch, paint, src_rect, size);
        self.ctx = Some(ctx);

        let len = size.rgba8_len()?;
        self.tmp.resize(len, 0);
        self.out.resize(len, 0);
        let scaled = self
            .scratch
            .as_ref()
            .map(|(_, p)| p.data_as_u8_slice())
            .ok_or_else(|| CoverError::draw("scale-blur scratch missing"))?;
        blur_rgba8_premul_into(scaled, &mut self.tmp, &mut self.out, size, &self.kernel)?;

        self.applications += 1;
        Ok(EffectOutput {
            size,
            rgba8_premul: &self.out,
        })
    }

    fn ctx_for(&mut self, size: PixelSize) -> CoverResult<vello_cpu::RenderContext> {
        let (w, h) = to_u16(size)?;
        Ok(match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        })
    }

    fn scratch_for(&mut self, size: PixelSize) -> CoverResult<&mut vello_cpu::Pixmap> {
        let reuse = matches!(&self.scratch, Some((s, _)) if *s == size);
        if !reuse {
            let (w, h) = to_u16(size)?;
            self.scratch = Some((size, vello_cpu::Pixmap::new(w, h)));
        }
        self.scratch
            .as_mut()
            .map(|(_, p)| p)
            .ok_or_else(|| CoverError::draw("scale-blur scratch missing"))
    }
}

fn scale_into(
    ctx: &mut vello_cpu::RenderContext,
    dst: &mut vello_cpu::Pixmap,
    paint: vello_cpu::Image,
    src_rect: Rect,
    size: PixelSize,
) {
    let sx = f64::from(size.width) / src_rect.width();
    let sy = f64::from(size.height) / src_rect.height();
    let transform = vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy)
        * vello_cpu::kurbo::Affine::translate((-src_rect.x0, -src_rect.y0));

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(transform);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        src_rect.x0,
        src_rect.y0,
        src_rect.x1,
        src_rect.y1,
    ));
    ctx.flush();
    ctx.render_to_pixmap(dst);
}

/// Destination extent; surfaces never exceed it.
fn to_u16(size: PixelSize) -> CoverResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| CoverError::draw("raster width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| CoverError::draw("raster height exceeds u16"))?;
    Ok((w, h))
}

/// Shared set of effects handed out with exclusive access.
///
/// Units that want to amortize scratch storage across many instances check one
/// out per draw; the guard returns it when dropped. The idle list stays
/// consistent under a panic, so a poisoned lock is recovered rather than
/// reported.
#[derive(Debug)]
pub struct EffectPool {
    blur: BlurParams,
    idle: Mutex<Vec<ScaleBlurEffect>>,
}

impl EffectPool {
    pub fn new(blur: BlurParams) -> CoverResult<Self> {
        blur.validate()?;
        Ok(Self {
            blur,
            idle: Mutex::new(Vec::new()),
        })
    }

    /// Take an idle effect, or build a new one if none is free.
    pub fn checkout(&self) -> CoverResult<PooledEffect<'_>> {
        let reused = self.idle().pop();
        let effect = match reused {
            Some(effect) => effect,
            None => {
                tracing::trace!("effect pool empty, building a new effect");
                ScaleBlurEffect::new(self.blur)?
            }
        };
        Ok(PooledEffect { pool: self, effect })
    }

    /// Effects currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle().len()
    }

    fn idle(&self) -> MutexGuard<'_, Vec<ScaleBlurEffect>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive handle on a pooled effect.
#[derive(Debug)]
pub struct PooledEffect<'p> {
    pool: &'p EffectPool,
    effect: ScaleBlurEffect,
}

impl Deref for PooledEffect<'_> {
    type Target = ScaleBlurEffect;

    fn deref(&self) -> &Self::Target {
        &self.effect
    }
}

impl DerefMut for PooledEffect<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.effect
    }
}

impl Drop for PooledEffect<'_> {
    fn drop(&mut self) {
        let mut effect = std::mem::replace(&mut self.effect, ScaleBlurEffect::vacant());
        effect.reset();
        self.pool.idle().push(effect);
    }
}

impl ScaleBlurEffect {
    /// Unconfigured identity effect holding no storage.
    fn vacant() -> Self {
        Self {
            kernel: GaussianKernel::identity(),
            source_rect: None,
            dest_rect: None,
            ctx: None,
            scratch: None,
            tmp: Vec::new(),
            out: Vec::new(),
            applications: 0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/scale_blur.rs"]
mod tests;
