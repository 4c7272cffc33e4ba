use super::*;
use crate::config::BlurParams;
use crate::cover::host::BitmapSink;

fn solid(width: u32, height: u32) -> SourceImage {
    SourceImage::from_premul_rgba8(
        width,
        height,
        [40u8, 80, 120, 255].repeat((width * height) as usize),
    )
    .unwrap()
}

fn small_blur() -> CoverConfig {
    CoverConfig {
        blur: BlurParams::new(1, 0.8).unwrap(),
        ..CoverConfig::default()
    }
}

#[test]
fn starts_empty_and_skips_without_width() {
    let mut unit = CoverImage::new(small_blur()).unwrap();
    assert_eq!(unit.state(), SurfaceState::Empty);
    let err = unit.on_bitmap_ready(&solid(16, 9)).unwrap_err();
    assert!(matches!(err, CoverError::DegenerateInput(_)));
    assert!(unit.surface().is_none());
}

#[test]
fn first_draw_sizes_surface() {
    let mut unit = CoverImage::new(small_blur()).unwrap();
    unit.set_decode_width(160.0);
    let out = unit.on_bitmap_ready(&solid(192, 108)).unwrap();
    assert_eq!(out, DrawOutcome::Drawn);
    assert_eq!(
        unit.state(),
        SurfaceState::Sized {
            width: 160.0,
            height: 90.0
        }
    );
    assert_eq!(unit.decode_height(), 90.0);
    let s = unit.surface().unwrap();
    assert_eq!(s.pixel_size().width, 160);
    assert_eq!(s.pixel_size().height, 90);
    assert_eq!(s.pixel(80, 45).map(|p| p.a), Some(255));
}

#[test]
fn tiny_candidate_from_empty_is_skipped() {
    let mut unit = CoverImage::new(small_blur()).unwrap();
    unit.set_decode_width(1.0);
    let out = unit.on_bitmap_ready(&solid(1920, 1080)).unwrap();
    assert_eq!(out, DrawOutcome::Skipped);
    assert_eq!(unit.state(), SurfaceState::Empty);
    assert_eq!(unit.allocations(), 0);
}

#[test]
fn shrinking_to_zero_height_drops_the_surface() {
    let mut unit = CoverImage::new(small_blur()).unwrap();
    unit.set_decode_width(10.0);
    unit.on_bitmap_ready(&solid(10, 10)).unwrap();
    assert_eq!(unit.live_surfaces(), 1);

    unit.set_decode_width(10.0);
    let out = unit.on_bitmap_ready(&solid(1000, 10)).unwrap();
    assert_eq!(out, DrawOutcome::Skipped);
    assert_eq!(unit.state(), SurfaceState::Empty);
    assert_eq!(unit.live_surfaces(), 0);
}

#[test]
fn pooled_effect_draws_and_returns_to_pool() {
    let pool = Arc::new(EffectPool::new(BlurParams::new(1, 0.8).unwrap()).unwrap());
    let mut a = CoverImage::new(small_blur())
        .unwrap()
        .with_effect_pool(Arc::clone(&pool));
    let mut b = CoverImage::new(small_blur())
        .unwrap()
        .with_effect_pool(Arc::clone(&pool));
    a.set_decode_width(20.0);
    b.set_decode_width(40.0);

    assert_eq!(a.on_bitmap_ready(&solid(20, 20)).unwrap(), DrawOutcome::Drawn);
    assert_eq!(b.on_bitmap_ready(&solid(20, 10)).unwrap(), DrawOutcome::Drawn);
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(b.surface().unwrap().pixel_size().height, 20);
}

#[test]
fn host_capabilities_come_from_config() {
    let cfg = CoverConfig {
        transport: Some(TransportHandle::new("image-client")),
        ..CoverConfig::default()
    };
    let unit = CoverImage::new(cfg).unwrap();
    assert_eq!(unit.cache_subfolder(), "ImageCache");
    assert_eq!(unit.custom_transport().unwrap().name, "image-client");

    let plain = CoverImage::new(CoverConfig::default()).unwrap();
    assert!(plain.custom_transport().is_none());
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = CoverConfig {
        hysteresis_px: f64::NAN,
        ..CoverConfig::default()
    };
    assert!(matches!(
        CoverImage::new(cfg).unwrap_err(),
        CoverError::Validation(_)
    ));
}
