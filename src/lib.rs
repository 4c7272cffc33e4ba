//! coverblur renders cover images: a decoded bitmap, rescaled to a caller-chosen
//! width with its aspect ratio kept, blurred, and composited into a surface the
//! display layer can bind.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: source size + decode width -> decode height, with hysteresis
//!    so sub-pixel jitter never reallocates anything ([`DimensionResolver`])
//! 2. **Ensure**: keep exactly one surface of the accepted size alive
//!    ([`SurfaceManager`])
//! 3. **Draw**: scale + blur the bitmap into the surface inside a scoped
//!    drawing session ([`draw`], [`ScaleBlurEffect`])
//!
//! [`CoverImage`] ties the three together and is what a generic image loader
//! talks to, through the [`BitmapSink`] / [`CoverRenderer`] /
//! [`ImageSourceHost`] traits rather than by subclassing.
//!
//! Pixels are **premultiplied RGBA8** end-to-end. Everything here is
//! synchronous and must run on the thread owning the surfaces.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod cover;
mod effects;
mod foundation;
mod resolve;
mod surface;

pub use assets::decode::{MAX_SOURCE_DIM_PX, SourceImage, decode_image};
pub use config::{BlurParams, CoverConfig, MAX_BLUR_RADIUS_PX};
pub use cover::host::{
    BitmapSink, CoverRenderer, ImageSourceHost, TransportHandle, deliver_encoded,
};
pub use cover::pipeline::{DrawOutcome, draw};
pub use cover::unit::{CoverImage, SurfaceState};
pub use effects::blur::{GaussianKernel, blur_rgba8_premul, blur_rgba8_premul_into};
pub use effects::scale_blur::{EffectOutput, EffectPool, PooledEffect, ScaleBlurEffect};
pub use foundation::core::{
    DEFAULT_DPI, FrameRGBA, PixelFormat, PixelSize, Rect, Rgba8Premul, Size,
};
pub use foundation::error::{CoverError, CoverResult};
pub use resolve::dimensions::{DimensionResolver, HeightDecision, candidate_height};
pub use surface::allocator::{
    CpuAllocator, RenderSurface, SurfaceAllocator, SurfaceDesc, SurfaceId,
};
pub use surface::manager::SurfaceManager;
pub use surface::session::DrawingSession;
