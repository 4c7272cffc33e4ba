//! Seams between a cover unit and the generic image-loading layer around it.
//!
//! The loader owns fetching, disk caching and retries; it talks to a unit only
//! through these traits, so any number of widget variants can share it.

use crate::assets::decode::{SourceImage, decode_image};
use crate::cover::pipeline::DrawOutcome;
use crate::foundation::error::{CoverError, CoverResult};
use crate::resolve::dimensions::HeightDecision;

/// Opaque description of the HTTP client a loader should fetch sources with.
///
/// This crate only carries it; it performs no network I/O.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransportHandle {
    pub name: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl TransportHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn validate(&self) -> CoverResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoverError::validation("transport name must be non-empty"));
        }
        if self.headers.iter().any(|(k, _)| k.trim().is_empty()) {
            return Err(CoverError::validation("transport header names must be non-empty"));
        }
        Ok(())
    }
}

/// What the loader asks of a unit before fetching.
pub trait ImageSourceHost {
    /// Stable folder name the disk cache files this unit's sources under.
    fn cache_subfolder(&self) -> &str;

    /// Transport override for fetching, if any.
    fn custom_transport(&self) -> Option<TransportHandle>;
}

/// The three steps a unit performs for every decoded bitmap.
pub trait CoverRenderer {
    fn resolve_dimensions(&self, source: &SourceImage) -> CoverResult<HeightDecision>;

    /// Make the surface match the current decode width and `height`.
    fn ensure_surface(&mut self, height: f64) -> CoverResult<()>;

    fn draw(&mut self, source: &SourceImage) -> CoverResult<DrawOutcome>;
}

/// Receiver of decoded bitmaps.
pub trait BitmapSink {
    fn on_bitmap_ready(&mut self, bitmap: &SourceImage) -> CoverResult<DrawOutcome>;
}

impl<R: CoverRenderer> BitmapSink for R {
    #[tracing::instrument(skip_all, fields(width = bitmap.width(), height = bitmap.height()))]
    fn on_bitmap_ready(&mut self, bitmap: &SourceImage) -> CoverResult<DrawOutcome> {
        let decision = self.resolve_dimensions(bitmap)?;
        match decision {
            HeightDecision::Accept { height } => self.ensure_surface(height)?,
            HeightDecision::Keep { candidate } => {
                tracing::trace!(candidate, "height within hysteresis, keeping surface");
            }
        }
        self.draw(bitmap)
    }
}

/// Decode `bytes` and hand the bitmap to `sink`.
pub fn deliver_encoded(sink: &mut dyn BitmapSink, bytes: &[u8]) -> CoverResult<DrawOutcome> {
    let bitmap = decode_image(bytes)?;
    sink.on_bitmap_ready(&bitmap)
}

#[cfg(test)]
#[path = "../../tests/unit/cover/host.rs"]
mod tests;
