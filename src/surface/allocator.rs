use crate::foundation::core::{DEFAULT_DPI, FrameRGBA, PixelFormat, PixelSize, Rgba8Premul};
use crate::foundation::error::{CoverError, CoverResult};

/// Identity of one allocation. Never reused by an allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Requested surface: logical size in device-independent units at a pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceDesc {
    pub width: f64,
    pub height: f64,
    pub dpi: f32,
    pub format: PixelFormat,
}

impl SurfaceDesc {
    pub fn new(width: f64, height: f64, dpi: f32) -> Self {
        Self {
            width,
            height,
            dpi,
            format: PixelFormat::Rgba8Premul,
        }
    }

    /// Pixel extent: `round(dim * dpi / 96)` on each axis.
    pub fn pixel_size(&self) -> CoverResult<PixelSize> {
        let scale = f64::from(self.dpi) / f64::from(DEFAULT_DPI);
        let to_px = |v: f64, axis: &str| -> CoverResult<u32> {
            let px = (v * scale).round();
            if !px.is_finite() || px < 1.0 || px > f64::from(u32::MAX) {
                return Err(CoverError::degenerate(format!(
                    "surface {axis} {v} at {} dpi has no pixels",
                    self.dpi
                )));
            }
            Ok(px as u32)
        };
        Ok(PixelSize::new(
            to_px(self.width, "width")?,
            to_px(self.height, "height")?,
        ))
    }
}

/// A drawable raster owned by exactly one rendering unit.
pub struct RenderSurface {
    id: SurfaceId,
    desc: SurfaceDesc,
    size: PixelSize,
    pixmap: vello_cpu::Pixmap,
    pub(crate) sessions_opened: u64,
    pub(crate) sessions_closed: u64,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn desc(&self) -> &SurfaceDesc {
        &self.desc
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.size
    }

    /// Whether this surface already satisfies a request for `desc`.
    pub fn matches(&self, desc: &SurfaceDesc) -> bool {
        self.desc == *desc
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        let px = self.data().get(idx..idx + 4)?;
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Number of drawing sessions opened and closed so far.
    pub fn session_counts(&self) -> (u64, u64) {
        (self.sessions_opened, self.sessions_closed)
    }

    /// Copy the current contents out for display.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }
}

/// Source of surfaces; the seam where a graphics device plugs in.
///
/// Surfaces must go back through [`SurfaceAllocator::release`] so the device
/// can reclaim them.
pub trait SurfaceAllocator {
    fn allocate(&mut self, desc: &SurfaceDesc) -> CoverResult<RenderSurface>;

    fn release(&mut self, surface: RenderSurface);

    /// Surfaces handed out and not yet released.
    fn live_surfaces(&self) -> usize;
}

/// Allocates surfaces backed by `vello_cpu` pixmaps.
#[derive(Debug, Default)]
pub struct CpuAllocator {
    next_id: u64,
    live: usize,
    max_surface_px: Option<u64>,
}

impl CpuAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse any surface larger than `max_px` pixels.
    pub fn with_max_surface_px(max_px: Option<u64>) -> Self {
        Self {
            max_surface_px: max_px,
            ..Self::default()
        }
    }
}

impl SurfaceAllocator for CpuAllocator {
    fn allocate(&mut self, desc: &SurfaceDesc) -> CoverResult<RenderSurface> {
        let size = desc.pixel_size()?;
        let width_u16: u16 = size
            .width
            .try_into()
            .map_err(|_| CoverError::allocation("surface width exceeds u16"))?;
        let height_u16: u16 = size
            .height
            .try_into()
            .map_err(|_| CoverError::allocation("surface height exceeds u16"))?;
        if let Some(max) = self.max_surface_px {
            let px = u64::from(size.width) * u64::from(size.height);
            if px > max {
                return Err(CoverError::allocation(format!(
                    "surface of {px} pixels exceeds the {max} pixel budget"
                )));
            }
        }

        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.live += 1;
        Ok(RenderSurface {
            id,
            desc: *desc,
            size,
            pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
            sessions_opened: 0,
            sessions_closed: 0,
        })
    }

    fn release(&mut self, surface: RenderSurface) {
        self.live = self.live.saturating_sub(1);
        drop(surface);
    }

    fn live_surfaces(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/allocator.rs"]
mod tests;
