use super::*;
use crate::config::BlurParams;
use crate::surface::allocator::{CpuAllocator, SurfaceAllocator, SurfaceDesc};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    SourceImage::from_premul_rgba8(width, height, rgba.repeat((width * height) as usize)).unwrap()
}

fn surface(w: f64, h: f64) -> RenderSurface {
    CpuAllocator::new()
        .allocate(&SurfaceDesc::new(w, h, 96.0))
        .unwrap()
}

#[test]
fn zero_and_negative_destinations_are_no_ops() {
    let source = solid(8, 8, [255, 255, 255, 255]);
    let mut s = surface(4.0, 4.0);
    let mut fx = ScaleBlurEffect::new(BlurParams::default()).unwrap();

    for dest in [
        Rect::new(0.0, 0.0, 0.0, 0.0),
        Rect::new(0.0, 0.0, -4.0, 4.0),
        Rect::new(0.0, 0.0, 4.0, -1.0),
        Rect::new(0.0, 0.0, f64::NAN, 4.0),
    ] {
        let out = draw(&mut s, &mut fx, &source, source.bounds(), dest).unwrap();
        assert_eq!(out, DrawOutcome::Skipped);
    }
    assert_eq!(s.session_counts(), (0, 0));
    assert_eq!(fx.applications(), 0);
    assert_eq!(s.pixel(0, 0), Some(Rgba8Premul::transparent()));
}

#[test]
fn draw_fills_surface_with_scaled_source() {
    let source = solid(64, 36, [0, 128, 0, 255]);
    let mut s = surface(16.0, 9.0);
    let mut fx = ScaleBlurEffect::new(BlurParams::new(1, 0.8).unwrap()).unwrap();
    let dest = s.pixel_size().to_rect();

    let out = draw(&mut s, &mut fx, &source, source.bounds(), dest).unwrap();
    assert_eq!(out, DrawOutcome::Drawn);
    assert_eq!(s.session_counts(), (1, 1));
    let px = s.pixel(8, 4).unwrap();
    assert_eq!(px.a, 255);
    assert!((i32::from(px.g) - 128).abs() <= 2);
}

#[test]
fn redraw_clears_previous_content() {
    let mut s = surface(4.0, 4.0);
    let mut fx = ScaleBlurEffect::new(BlurParams::new(0, 1.0).unwrap()).unwrap();
    let dest = s.pixel_size().to_rect();

    let opaque = solid(4, 4, [255, 0, 0, 255]);
    draw(&mut s, &mut fx, &opaque, opaque.bounds(), dest).unwrap();
    let clear = solid(4, 4, [0, 0, 0, 0]);
    draw(&mut s, &mut fx, &clear, clear.bounds(), dest).unwrap();

    assert_eq!(s.pixel(2, 2), Some(Rgba8Premul::transparent()));
    assert_eq!(s.session_counts(), (2, 2));
}

#[test]
fn failed_effect_still_closes_session() {
    let source = solid(4, 4, [255, 0, 0, 255]);
    let mut s = surface(4.0, 4.0);
    let mut fx = ScaleBlurEffect::new(BlurParams::default()).unwrap();
    let bad_source_rect = Rect::new(100.0, 100.0, 200.0, 200.0);
    let dest = s.pixel_size().to_rect();

    let err = draw(&mut s, &mut fx, &source, bad_source_rect, dest);
    assert!(err.is_err());
    assert_eq!(s.session_counts(), (1, 1));
}
