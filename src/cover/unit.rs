//! The cover rendering unit: one widget's worth of state.
//!
//! State machine: `Empty -> Sized(w, h) -> Sized(w', h') ...`. Transitions only
//! happen when the resolver accepts a height and the surface for it was
//! actually allocated; a failed allocation drops back to `Empty` so the next
//! draw retries. All methods must be called from the thread owning the device.

use std::sync::Arc;

use crate::assets::decode::SourceImage;
use crate::config::CoverConfig;
use crate::cover::host::{CoverRenderer, ImageSourceHost, TransportHandle};
use crate::cover::pipeline::{self, DrawOutcome};
use crate::effects::scale_blur::{EffectPool, ScaleBlurEffect};
use crate::foundation::error::{CoverError, CoverResult};
use crate::resolve::dimensions::{DimensionResolver, HeightDecision};
use crate::surface::allocator::{CpuAllocator, RenderSurface, SurfaceAllocator};
use crate::surface::manager::SurfaceManager;

/// Realized size of a unit's surface, in device-independent units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceState {
    Empty,
    Sized { width: f64, height: f64 },
}

#[derive(Debug)]
enum EffectSlot {
    Owned(Box<ScaleBlurEffect>),
    Pooled(Arc<EffectPool>),
}

#[derive(Debug)]
pub struct CoverImage {
    config: CoverConfig,
    resolver: DimensionResolver,
    decode_width: f64,
    state: SurfaceState,
    surfaces: SurfaceManager,
    effect: EffectSlot,
}

impl CoverImage {
    /// A unit backed by CPU surfaces.
    pub fn new(config: CoverConfig) -> CoverResult<Self> {
        let allocator = CpuAllocator::with_max_surface_px(config.max_surface_px);
        Self::with_allocator(config, Box::new(allocator))
    }

    pub fn with_allocator(
        config: CoverConfig,
        allocator: Box<dyn SurfaceAllocator>,
    ) -> CoverResult<Self> {
        config.validate()?;
        let resolver = DimensionResolver::new(config.hysteresis_px)?;
        let effect = EffectSlot::Owned(Box::new(ScaleBlurEffect::new(config.blur)?));
        Ok(Self {
            surfaces: SurfaceManager::new(allocator, config.dpi),
            config,
            resolver,
            decode_width: 0.0,
            state: SurfaceState::Empty,
            effect,
        })
    }

    /// Borrow effects from `pool` per draw instead of owning one.
    pub fn with_effect_pool(mut self, pool: Arc<EffectPool>) -> Self {
        self.effect = EffectSlot::Pooled(pool);
        self
    }

    pub fn config(&self) -> &CoverConfig {
        &self.config
    }

    /// Width the caller wants the bitmap decoded at. Takes effect on the next draw.
    pub fn set_decode_width(&mut self, width: f64) {
        self.decode_width = width;
    }

    pub fn decode_width(&self) -> f64 {
        self.decode_width
    }

    /// Height of the realized surface, `0.0` while empty.
    pub fn decode_height(&self) -> f64 {
        match self.state {
            SurfaceState::Empty => 0.0,
            SurfaceState::Sized { height, .. } => height,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// The surface the display layer should bind, once one exists.
    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surfaces.surface()
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.live_surfaces()
    }

    /// Surfaces allocated over the unit's lifetime.
    pub fn allocations(&self) -> u64 {
        self.surfaces.allocations()
    }

    fn reset_to_empty(&mut self) {
        self.surfaces.release();
        self.state = SurfaceState::Empty;
    }
}

impl CoverRenderer for CoverImage {
    fn resolve_dimensions(&self, source: &SourceImage) -> CoverResult<HeightDecision> {
        self.resolver.resolve(
            f64::from(source.width()),
            f64::from(source.height()),
            self.decode_width,
            self.decode_height(),
        )
    }

    fn ensure_surface(&mut self, height: f64) -> CoverResult<()> {
        let width = self.decode_width;
        if height < 1.0 {
            tracing::trace!(width, height, "accepted height has no pixels, dropping surface");
            self.reset_to_empty();
            return Ok(());
        }
        if let Err(err) = self.surfaces.ensure_surface(width, height) {
            self.state = SurfaceState::Empty;
            return Err(err);
        }
        self.state = SurfaceState::Sized { width, height };
        Ok(())
    }

    fn draw(&mut self, source: &SourceImage) -> CoverResult<DrawOutcome> {
        if self.state == SurfaceState::Empty {
            return Ok(DrawOutcome::Skipped);
        }
        let surface = self
            .surfaces
            .surface_mut()
            .ok_or_else(|| CoverError::draw("unit is sized but holds no surface"))?;
        let source_rect = source.bounds();
        let dest_rect = surface.pixel_size().to_rect();

        match &mut self.effect {
            EffectSlot::Owned(effect) => {
                pipeline::draw(surface, effect, source, source_rect, dest_rect)
            }
            EffectSlot::Pooled(pool) => {
                let mut effect = pool.checkout()?;
                pipeline::draw(surface, &mut effect, source, source_rect, dest_rect)
            }
        }
    }
}

impl ImageSourceHost for CoverImage {
    fn cache_subfolder(&self) -> &str {
        &self.config.cache_subfolder
    }

    fn custom_transport(&self) -> Option<TransportHandle> {
        self.config.transport.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cover/unit.rs"]
mod tests;
