/// Convenience result type used across coverblur.
pub type CoverResult<T> = Result<T, CoverError>;

/// Top-level error taxonomy used by the cover rendering APIs.
#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    /// Source or target dimensions are non-positive or not finite.
    ///
    /// The caller skips the draw for this frame; no surface was touched.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The backing device could not provide a surface.
    ///
    /// Recoverable: the unit is left without a surface and retries on the next draw.
    #[error("surface allocation failed: {0}")]
    SurfaceAllocation(String),

    /// Invalid configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Buffer or geometry mismatch while drawing into a surface.
    #[error("draw error: {0}")]
    Draw(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    /// Build a [`CoverError::DegenerateInput`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }

    /// Build a [`CoverError::SurfaceAllocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::SurfaceAllocation(msg.into())
    }

    /// Build a [`CoverError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CoverError::Draw`] value.
    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    /// Whether the caller can simply try again on its next redraw.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateInput(_) | Self::SurfaceAllocation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
