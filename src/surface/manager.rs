use crate::foundation::core::DEFAULT_DPI;
use crate::foundation::error::{CoverError, CoverResult};
use crate::surface::allocator::{CpuAllocator, RenderSurface, SurfaceAllocator, SurfaceDesc};

/// Owns at most one surface and replaces it only on a genuine size change.
pub struct SurfaceManager {
    allocator: Box<dyn SurfaceAllocator>,
    current: Option<RenderSurface>,
    dpi: f32,
    allocations: u64,
}

impl std::fmt::Debug for SurfaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceManager")
            .field("current", &self.current)
            .field("dpi", &self.dpi)
            .field("allocations", &self.allocations)
            .finish_non_exhaustive()
    }
}

impl Default for SurfaceManager {
    fn default() -> Self {
        Self::new(Box::new(CpuAllocator::new()), DEFAULT_DPI)
    }
}

impl SurfaceManager {
    pub fn new(allocator: Box<dyn SurfaceAllocator>, dpi: f32) -> Self {
        Self {
            allocator,
            current: None,
            dpi,
            allocations: 0,
        }
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn surface(&self) -> Option<&RenderSurface> {
        self.current.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut RenderSurface> {
        self.current.as_mut()
    }

    /// Successful allocations made through this manager.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn live_surfaces(&self) -> usize {
        self.allocator.live_surfaces()
    }

    /// Return a surface of exactly `width x height`, reallocating only if the
    /// current one differs.
    ///
    /// The previous surface is released before the replacement is requested.
    /// If allocation fails the manager holds no surface.
    pub fn ensure_surface(&mut self, width: f64, height: f64) -> CoverResult<&mut RenderSurface> {
        let desc = SurfaceDesc::new(width, height, self.dpi);
        let reuse = self.current.as_ref().is_some_and(|s| s.matches(&desc));
        if !reuse {
            self.release();
            match self.allocator.allocate(&desc) {
                Ok(surface) => {
                    self.allocations += 1;
                    tracing::debug!(
                        surface = surface.id().0,
                        width = surface.pixel_size().width,
                        height = surface.pixel_size().height,
                        "allocated render surface"
                    );
                    self.current = Some(surface);
                }
                Err(err) => {
                    tracing::warn!(width, height, error = %err, "render surface allocation failed");
                    return Err(err);
                }
            }
        }
        self.current
            .as_mut()
            .ok_or_else(|| CoverError::allocation("surface slot empty after allocation"))
    }

    /// Give the current surface back to the allocator, if any.
    pub fn release(&mut self) {
        if let Some(old) = self.current.take() {
            tracing::debug!(surface = old.id().0, "released render surface");
            self.allocator.release(old);
        }
    }
}

impl Drop for SurfaceManager {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/manager.rs"]
mod tests;
