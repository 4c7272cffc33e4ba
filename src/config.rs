use std::str::FromStr;

use anyhow::Context as _;

use crate::cover::host::TransportHandle;
use crate::foundation::core::DEFAULT_DPI;
use crate::foundation::error::{CoverError, CoverResult};

/// Largest blur radius accepted.
pub const MAX_BLUR_RADIUS_PX: u32 = 256;

/// Gaussian blur applied while rescaling.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlurParams {
    pub radius_px: u32,
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            radius_px: 6,
            sigma: 3.0,
        }
    }
}

impl BlurParams {
    pub fn new(radius_px: u32, sigma: f32) -> CoverResult<Self> {
        let params = Self { radius_px, sigma };
        params.validate()?;
        Ok(params)
    }

    /// Radius only; sigma follows the usual `radius / 2` rule.
    pub fn from_radius(radius_px: u32) -> CoverResult<Self> {
        Self::new(radius_px, (radius_px as f32 / 2.0).max(0.5))
    }

    pub fn validate(&self) -> CoverResult<()> {
        if self.radius_px > MAX_BLUR_RADIUS_PX {
            return Err(CoverError::validation(format!(
                "blur.radius_px must be <= {MAX_BLUR_RADIUS_PX}"
            )));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(CoverError::validation("blur.sigma must be finite and > 0"));
        }
        Ok(())
    }
}

/// Tunables for a cover rendering unit.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Height changes at or below this many pixels keep the current surface.
    pub hysteresis_px: f64,
    /// Pixel density used when allocating surfaces.
    pub dpi: f32,
    pub blur: BlurParams,
    /// Subfolder name the external cache layer files source images under.
    pub cache_subfolder: String,
    /// Optional cap on `width * height` of a single surface.
    pub max_surface_px: Option<u64>,
    /// HTTP client override handed to the fetching layer.
    pub transport: Option<TransportHandle>,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            hysteresis_px: 1.0,
            dpi: DEFAULT_DPI,
            blur: BlurParams::default(),
            cache_subfolder: "ImageCache".to_string(),
            max_surface_px: None,
            transport: None,
        }
    }
}

impl CoverConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json_str(json: &str) -> CoverResult<Self> {
        let cfg: Self = serde_json::from_str(json).context("parse cover config json")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `COVERBLUR_*` environment overrides. Unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = parse_var::<f64>(&lookup, "COVERBLUR_HYSTERESIS_PX") {
            self.hysteresis_px = v;
        }
        if let Some(v) = parse_var::<u32>(&lookup, "COVERBLUR_BLUR_RADIUS") {
            self.blur.radius_px = v;
        }
        if let Some(v) = parse_var::<f32>(&lookup, "COVERBLUR_BLUR_SIGMA") {
            self.blur.sigma = v;
        }
        self
    }

    pub fn validate(&self) -> CoverResult<()> {
        if !self.hysteresis_px.is_finite() || self.hysteresis_px < 0.0 {
            return Err(CoverError::validation(
                "hysteresis_px must be finite and >= 0",
            ));
        }
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(CoverError::validation("dpi must be finite and > 0"));
        }
        if self.cache_subfolder.trim().is_empty() {
            return Err(CoverError::validation("cache_subfolder must be non-empty"));
        }
        if let Some(t) = &self.transport {
            t.validate()?;
        }
        if self.max_surface_px == Some(0) {
            return Err(CoverError::validation("max_surface_px must be > 0 when set"));
        }
        self.blur.validate()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
