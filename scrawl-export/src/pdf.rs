//! PDF assembly from rendered pages.

use crate::error::{ExportError, ExportResult};
use crate::render::RasterPage;

/// MIME type of exported documents.
pub const PDF_MIME: &str = "application/pdf";

/// Encoded PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfBlob {
    data: Vec<u8>,
}

impl PdfBlob {
    /// Wrap encoded PDF bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Always `application/pdf`.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        PDF_MIME
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Borrow the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Page layout of the assembled document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    /// Paper width in millimetres.
    pub width_mm: f32,
    /// Paper height in millimetres.
    pub height_mm: f32,
    /// Density the pages were rendered at.
    pub dpi: u32,
}

/// JPEG quality of embedded page images.
const PAGE_JPEG_QUALITY: u8 = 90;

/// A page image compressed for embedding. Holds no raw pixels.
#[derive(Debug)]
struct EmbeddedPage {
    page_number: u32,
    jpeg: Vec<u8>,
    width_px: u32,
    height_px: u32,
}

impl EmbeddedPage {
    fn into_image(self) -> printpdf::Image {
        printpdf::Image::from(printpdf::ImageXObject {
            width: printpdf::Px(self.width_px as usize),
            height: printpdf::Px(self.height_px as usize),
            color_space: printpdf::ColorSpace::Rgb,
            bits_per_component: printpdf::ColorBits::Bit8,
            interpolate: false,
            image_data: self.jpeg,
            image_filter: Some(printpdf::ImageFilter::DCT),
            smask: None,
            clipping_bbox: None,
        })
    }
}

/// Decode a rendered page and re-encode it as a DCT stream.
///
/// The raster is consumed, so at most one page of raw pixels is alive.
fn compress_page(raster: RasterPage) -> ExportResult<EmbeddedPage> {
    let RasterPage {
        page_number,
        png,
        width_px,
        height_px,
    } = raster;

    let decoded = printpdf::image_crate::load_from_memory(&png)
        .map_err(|e| ExportError::Encoding(format!("failed to decode page {page_number}: {e}")))?;
    drop(png);

    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    if (width, height) != (width_px, height_px) {
        return Err(ExportError::Encoding(format!(
            "page {page_number} is {width}x{height} px, expected {width_px}x{height_px}"
        )));
    }
    let rgb = flatten_onto_white(rgba.into_raw());

    let mut jpeg = Vec::new();
    printpdf::image_crate::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, PAGE_JPEG_QUALITY)
        .encode(&rgb, width, height, printpdf::image_crate::ColorType::Rgb8)
        .map_err(|e| ExportError::Encoding(format!("failed to compress page {page_number}: {e}")))?;

    tracing::trace!(
        page = page_number,
        raw_bytes = rgb.len(),
        compressed_bytes = jpeg.len(),
        "Compressed page"
    );

    Ok(EmbeddedPage {
        page_number,
        jpeg,
        width_px,
        height_px,
    })
}

/// Composite straight-alpha RGBA over white, packing RGB into the same buffer.
#[allow(clippy::cast_possible_truncation)]
fn flatten_onto_white(mut pixels: Vec<u8>) -> Vec<u8> {
    let count = pixels.len() / 4;
    for i in 0..count {
        let src = i * 4;
        let alpha = u16::from(pixels[src + 3]);
        let rgb = [pixels[src], pixels[src + 1], pixels[src + 2]];
        for (c, value) in rgb.into_iter().enumerate() {
            pixels[i * 3 + c] = ((u16::from(value) * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
    }
    pixels.truncate(count * 3);
    pixels
}

/// Assemble rendered pages into a PDF, one page per raster, in order.
///
/// Pages are converted one at a time and embedded as JPEG streams, so the
/// document only ever holds compressed data. Each image is placed at the
/// origin at `paper.dpi`, so a surface sized from the paper fills the page
/// exactly.
///
/// # Errors
///
/// Returns [`ExportError::EmptyDocument`] for no pages and
/// [`ExportError::Encoding`] if a page cannot be decoded, does not match
/// its declared size, or the document cannot be written.
#[allow(clippy::cast_precision_loss)]
pub fn assemble_pdf(title: &str, paper: PaperSize, pages: Vec<RasterPage>) -> ExportResult<Vec<u8>> {
    if pages.is_empty() {
        return Err(ExportError::EmptyDocument);
    }

    let doc = printpdf::PdfDocument::empty(title);
    for raster in pages {
        let page = compress_page(raster)?;
        let (page_index, layer_index) = doc.add_page(
            printpdf::Mm(paper.width_mm),
            printpdf::Mm(paper.height_mm),
            format!("Page {}", page.page_number),
        );
        let layer = doc.get_page(page_index).get_layer(layer_index);

        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(paper.dpi as f32),
            ..Default::default()
        };
        page.into_image().add_to_layer(layer, transform);
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Encoding(format!("PDF save failed: {e}")))
}
