use crate::assets::decode::SourceImage;
use crate::effects::scale_blur::ScaleBlurEffect;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::CoverResult;
use crate::surface::allocator::RenderSurface;

/// Whether a draw touched the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// Nothing to draw into (zero-area destination or no surface yet).
    Skipped,
}

/// Scale `source_rect` of `source` into `dest_rect` of `surface`, blurred.
///
/// A destination without positive width and height is a no-op: no session is
/// opened and the surface is untouched. Otherwise the surface is cleared to
/// transparent and fully repainted. Must run on the thread that owns `surface`.
pub fn draw(
    surface: &mut RenderSurface,
    effect: &mut ScaleBlurEffect,
    source: &SourceImage,
    source_rect: Rect,
    dest_rect: Rect,
) -> CoverResult<DrawOutcome> {
    if !(dest_rect.width() > 0.0 && dest_rect.height() > 0.0) {
        tracing::trace!(?dest_rect, "skipping draw into zero-area destination");
        return Ok(DrawOutcome::Skipped);
    }

    effect.set_source_rect(source_rect);
    effect.set_destination_rect(dest_rect);

    let mut session = surface.begin_draw(Rgba8Premul::transparent());
    let output = effect.apply(source)?;
    session.draw_image(output.rgba8_premul, output.size, dest_rect)?;
    Ok(DrawOutcome::Drawn)
}

#[cfg(test)]
#[path = "../../tests/unit/cover/pipeline.rs"]
mod tests;
