use super::*;

#[test]
fn pixel_size_follows_dpi() {
    let d = SurfaceDesc::new(400.0, 225.0, 96.0);
    assert_eq!(d.pixel_size().unwrap(), PixelSize::new(400, 225));
    let d = SurfaceDesc::new(400.0, 225.0, 192.0);
    assert_eq!(d.pixel_size().unwrap(), PixelSize::new(800, 450));
    let d = SurfaceDesc::new(400.4, 0.4, 96.0);
    assert!(matches!(
        d.pixel_size().unwrap_err(),
        CoverError::DegenerateInput(_)
    ));
}

#[test]
fn allocations_get_fresh_ids_and_start_transparent() {
    let mut alloc = CpuAllocator::new();
    let a = alloc.allocate(&SurfaceDesc::new(4.0, 3.0, 96.0)).unwrap();
    let b = alloc.allocate(&SurfaceDesc::new(4.0, 3.0, 96.0)).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(alloc.live_surfaces(), 2);
    assert_eq!(a.pixel(3, 2), Some(Rgba8Premul::transparent()));
    assert_eq!(a.pixel(4, 0), None);
    assert_eq!(a.desc().format, PixelFormat::Rgba8Premul);

    alloc.release(a);
    alloc.release(b);
    assert_eq!(alloc.live_surfaces(), 0);
}

#[test]
fn oversized_requests_fail_recoverably() {
    let mut alloc = CpuAllocator::new();
    let err = alloc
        .allocate(&SurfaceDesc::new(70_000.0, 10.0, 96.0))
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(alloc.live_surfaces(), 0);

    let mut alloc = CpuAllocator::with_max_surface_px(Some(100));
    assert!(alloc.allocate(&SurfaceDesc::new(10.0, 10.0, 96.0)).is_ok());
    let err = alloc
        .allocate(&SurfaceDesc::new(11.0, 10.0, 96.0))
        .unwrap_err();
    assert!(matches!(err, CoverError::SurfaceAllocation(_)));
    assert_eq!(alloc.live_surfaces(), 1);
}

#[test]
fn readback_is_premultiplied_and_sized() {
    let mut alloc = CpuAllocator::new();
    let s = alloc.allocate(&SurfaceDesc::new(5.0, 2.0, 96.0)).unwrap();
    let frame = s.to_frame();
    assert_eq!((frame.width, frame.height), (5, 2));
    assert_eq!(frame.data.len(), 5 * 2 * 4);
    assert!(frame.premultiplied);
}
