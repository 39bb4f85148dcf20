//! PNG -> PDF conversion
//!
//! Used when the browser's own PDF export fails or comes back undersized.
//! The PNG is decoded, flattened onto white, and embedded as a single
//! Flate-compressed RGB image filling one page.

use crate::error::ConversionError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;

/// Resolution assumed for screenshots (one CSS pixel per 1/96 in)
pub const SCREENSHOT_DPI: f64 = 96.0;

/// Largest page side a PDF reader is required to support, in points
pub const MAX_PAGE_POINTS: f64 = 14_400.0;

const POINTS_PER_INCH: f64 = 72.0;

/// Page size in points for an image of `width` x `height` pixels.
///
/// Pixels map at [`SCREENSHOT_DPI`]; very tall full-page screenshots are
/// scaled down uniformly so neither side exceeds [`MAX_PAGE_POINTS`].
pub fn page_size_points(width: u32, height: u32) -> (f64, f64) {
    let ratio = POINTS_PER_INCH / SCREENSHOT_DPI;
    let w = f64::from(width) * ratio;
    let h = f64::from(height) * ratio;
    let longest = w.max(h);
    if longest > MAX_PAGE_POINTS {
        let shrink = MAX_PAGE_POINTS / longest;
        (w * shrink, h * shrink)
    } else {
        (w, h)
    }
}

/// Convert PNG bytes into a one-page PDF document
pub fn png_to_pdf(png: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let decoded = image::load_from_memory_with_format(png, ImageFormat::Png)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ConversionError::Decode("image has no pixels".to_string()));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        rgb.extend_from_slice(&[flatten(r, a), flatten(g, a), flatten(b, a)]);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rgb)
        .map_err(|e| ConversionError::Encode(e.to_string()))?;
    let pixels = encoder
        .finish()
        .map_err(|e| ConversionError::Encode(e.to_string()))?;

    let (page_w, page_h) = page_size_points(width, height);
    build_document(width, height, page_w as f32, page_h as f32, pixels)
        .map_err(|e| ConversionError::Encode(e.to_string()))
}

/// Composite one channel over white
fn flatten(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// One page whose content is the image scaled to the full media box
fn build_document(
    width: u32,
    height: u32,
    page_w: f32,
    page_h: f32,
    pixels: Vec<u8>,
) -> lopdf::Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // already zlib-compressed; lopdf must not deflate it again
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    0.into(),
                    0.into(),
                    Object::Real(page_h),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w), Object::Real(page_h)],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn image_stream(doc: &Document) -> &Stream {
        doc.objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .find(|s| s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Image"[..]))
            .unwrap()
    }

    #[test]
    fn test_png_to_pdf_single_page_sized_to_image() {
        let img: RgbaImage = ImageBuffer::from_fn(96, 48, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let pdf = png_to_pdf(&encode_png(&img)).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page = doc.get_dictionary(pages[&1]).unwrap();
        let media_box: Vec<f32> = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(media_box.len(), 4);
        assert!((media_box[2] - 72.0).abs() < 0.01);
        assert!((media_box[3] - 36.0).abs() < 0.01);
    }

    #[test]
    fn test_embedded_image_keeps_pixel_dimensions() {
        let img: RgbaImage = ImageBuffer::from_pixel(10, 7, Rgba([255, 0, 0, 255]));
        let pdf = png_to_pdf(&encode_png(&img)).unwrap();

        let doc = Document::load_mem(&pdf).unwrap();
        let image = image_stream(&doc);
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 10);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 7);
        assert_eq!(
            image.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );
    }

    #[test]
    fn test_transparent_pixels_flatten_to_white() {
        assert_eq!(flatten(0, 0), 255);
        assert_eq!(flatten(10, 255), 10);
        assert_eq!(flatten(0, 128), 127);
    }

    #[test]
    fn test_tall_pages_are_scaled_to_limit() {
        let (w, h) = page_size_points(2400, 40_000);
        assert!((h - MAX_PAGE_POINTS).abs() < 1e-6);
        assert!((w / h - 2400.0 / 40_000.0).abs() < 1e-9);

        let (w, h) = page_size_points(960, 480);
        assert_eq!((w, h), (720.0, 360.0));
    }

    #[test]
    fn test_rejects_non_png_input() {
        let err = png_to_pdf(b"definitely not a png").unwrap_err();
        assert!(matches!(err, ConversionError::Decode(_)));
    }
}
