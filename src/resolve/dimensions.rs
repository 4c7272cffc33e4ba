//! Aspect-preserving decode height with hysteresis.
//!
//! Candidate heights are only accepted once they move further than the
//! configured threshold away from the realized one, so fractional jitter
//! across repeated draws of the same bitmap never resizes the surface.

use crate::foundation::error::{CoverError, CoverResult};

/// Outcome of a single resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightDecision {
    /// Take the new height, rounded half to even, and resize.
    Accept { height: f64 },
    /// Within the threshold of what is realized; keep the current surface.
    Keep { candidate: f64 },
}

impl HeightDecision {
    pub fn is_accept(self) -> bool {
        matches!(self, Self::Accept { .. })
    }

    /// Accepted height, if any.
    pub fn accepted_height(self) -> Option<f64> {
        match self {
            Self::Accept { height } => Some(height),
            Self::Keep { .. } => None,
        }
    }
}

/// Pure, deterministic height resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimensionResolver {
    hysteresis_px: f64,
}

impl Default for DimensionResolver {
    fn default() -> Self {
        Self { hysteresis_px: 1.0 }
    }
}

impl DimensionResolver {
    pub fn new(hysteresis_px: f64) -> CoverResult<Self> {
        if !hysteresis_px.is_finite() || hysteresis_px < 0.0 {
            return Err(CoverError::validation(
                "hysteresis_px must be finite and >= 0",
            ));
        }
        Ok(Self { hysteresis_px })
    }

    pub fn hysteresis_px(&self) -> f64 {
        self.hysteresis_px
    }

    /// Decide whether `desired_width` over a `source_width x source_height` bitmap
    /// warrants moving away from `current_height` (`0.0` when nothing is realized).
    pub fn resolve(
        &self,
        source_width: f64,
        source_height: f64,
        desired_width: f64,
        current_height: f64,
    ) -> CoverResult<HeightDecision> {
        let candidate = candidate_height(source_width, source_height, desired_width)?;
        if (current_height - candidate).abs() > self.hysteresis_px {
            Ok(HeightDecision::Accept {
                height: candidate.round_ties_even(),
            })
        } else {
            Ok(HeightDecision::Keep { candidate })
        }
    }
}

/// Unrounded height that keeps the source aspect ratio at `desired_width`.
pub fn candidate_height(
    source_width: f64,
    source_height: f64,
    desired_width: f64,
) -> CoverResult<f64> {
    if !source_width.is_finite() || source_width <= 0.0 {
        return Err(CoverError::degenerate(format!(
            "source width must be > 0, got {source_width}"
        )));
    }
    if !source_height.is_finite() || source_height <= 0.0 {
        return Err(CoverError::degenerate(format!(
            "source height must be > 0, got {source_height}"
        )));
    }
    if !desired_width.is_finite() || desired_width <= 0.0 {
        return Err(CoverError::degenerate(format!(
            "desired width must be > 0, got {desired_width}"
        )));
    }
    Ok(desired_width * source_height / source_width)
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/dimensions.rs"]
mod tests;
