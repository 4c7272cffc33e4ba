use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();

    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(prepared.width(), 1);
    assert_eq!(prepared.height(), 1);
    assert_eq!(
        prepared.rgba8_premul(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_keeps_non_square_extent() {
    let img = image::RgbaImage::from_pixel(16, 9, image::Rgba([1, 2, 3, 255]));
    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(prepared.size(), PixelSize::new(16, 9));
    assert_eq!(prepared.bounds(), Rect::new(0.0, 0.0, 16.0, 9.0));
}

#[test]
fn decode_garbage_is_an_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(err.to_string().contains("decode image"));
}

#[test]
fn buffer_length_must_match_extent() {
    assert!(SourceImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn image_paint_is_built_once_and_shared_by_clones() {
    let source = SourceImage::from_premul_rgba8(3, 2, vec![7; 24]).unwrap();
    let clone = source.clone();
    let first = source.image_paint().unwrap();
    let second = clone.image_paint().unwrap();
    match (first.image, second.image) {
        (vello_cpu::ImageSource::Pixmap(a), vello_cpu::ImageSource::Pixmap(b)) => {
            assert!(Arc::ptr_eq(&a, &b));
            assert_eq!((a.width(), a.height()), (3, 2));
        }
        _ => panic!("expected pixmap-backed paints"),
    }
}

#[test]
fn oversized_source_paint_is_a_recoverable_degenerate_input() {
    let width = MAX_SOURCE_DIM_PX + 1;
    let source = SourceImage::from_premul_rgba8(width, 1, vec![0; width as usize * 4]).unwrap();
    let err = source.image_paint().unwrap_err();
    assert!(matches!(err, CoverError::DegenerateInput(_)), "{err}");
    assert!(err.is_recoverable());
}
