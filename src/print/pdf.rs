//! Single-page, full-bleed image PDF writer.
//!
//! Emits a PDF 1.4 file: catalog (with an sRGB output intent), one page with
//! MediaBox/BleedBox/TrimBox, a content stream that paints the image over the
//! whole MediaBox, and the image as a FlateDecode RGB XObject in a calibrated
//! sRGB colour space. Object serialization and the xref table are left to
//! `pdf-writer`.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::io::Write;

use crate::error::PosterError;

pub const PDF_VERSION: (u8, u8) = (1, 4);

/// Name of the image in the page resources.
const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// ICC registry name of the output condition.
const SRGB_CONDITION: &[u8] = b"sRGB IEC61966-2.1";

/// CalRGB parameters approximating sRGB (D65 white, gamma 2.2).
const SRGB_WHITE_POINT: [f32; 3] = [0.9505, 1.0, 1.089];
const SRGB_GAMMA: [f32; 3] = [2.2, 2.2, 2.2];
const SRGB_MATRIX: [f32; 9] = [
    0.4124, 0.2126, 0.0193, 0.3576, 0.7152, 0.1192, 0.1805, 0.0722, 0.9505,
];

/// Page boxes in points, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBoxes {
    pub media_width: f64,
    pub media_height: f64,
    /// Bleed inset on every side.
    pub bleed: f64,
}

impl PageBoxes {
    pub fn trim_box(&self) -> [f64; 4] {
        [
            self.bleed,
            self.bleed,
            self.media_width - self.bleed,
            self.media_height - self.bleed,
        ]
    }

    pub fn media_box(&self) -> [f64; 4] {
        [0.0, 0.0, self.media_width, self.media_height]
    }
}

/// Document metadata written to the Info dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub creator: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "Poster".to_string(),
            creator: concat!("mapposter ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Object ids, in file order.
struct Refs {
    catalog: Ref,
    pages: Ref,
    page: Ref,
    content: Ref,
    image: Ref,
    intent: Ref,
    info: Ref,
}

impl Refs {
    fn new() -> Self {
        let mut next = Ref::new(1);
        let mut bump = || next.bump();
        Self {
            catalog: bump(),
            pages: bump(),
            page: bump(),
            content: bump(),
            image: bump(),
            intent: bump(),
            info: bump(),
        }
    }
}

fn rect(r: [f64; 4]) -> Rect {
    Rect::new(r[0] as f32, r[1] as f32, r[2] as f32, r[3] as f32)
}

/// Write a one-page PDF that shows `image` stretched over the whole page.
pub fn write_image_page(image: &RgbImage, boxes: PageBoxes, info: &DocumentInfo) -> Result<Vec<u8>, PosterError> {
    let (px_w, px_h) = image.dimensions();
    if px_w == 0 || px_h == 0 {
        return Err(PosterError::InvalidDimension {
            width: px_w,
            height: px_h,
        });
    }
    let (width, height) = (i32::try_from(px_w), i32::try_from(px_h));
    let (Ok(width), Ok(height)) = (width, height) else {
        return Err(PosterError::InvalidDimension {
            width: px_w,
            height: px_h,
        });
    };

    let pixels = compress(image.as_raw())?;
    let refs = Refs::new();
    let mut pdf = Pdf::new();
    pdf.set_version(PDF_VERSION.0, PDF_VERSION.1);

    let mut catalog = pdf.catalog(refs.catalog);
    catalog.pages(refs.pages);
    catalog.insert(Name(b"OutputIntents")).array().item(refs.intent);
    catalog.finish();

    pdf.pages(refs.pages).kids([refs.page]).count(1);

    let mut page = pdf.page(refs.page);
    page.parent(refs.pages);
    page.media_box(rect(boxes.media_box()));
    page.bleed_box(rect(boxes.media_box()));
    page.trim_box(rect(boxes.trim_box()));
    page.contents(refs.content);
    page.resources().x_objects().pair(IMAGE_NAME, refs.image);
    page.finish();

    let mut content = Content::new();
    content.save_state();
    content.transform([
        boxes.media_width as f32,
        0.0,
        0.0,
        boxes.media_height as f32,
        0.0,
        0.0,
    ]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(refs.content, &content.finish()).finish();

    let mut xobject = pdf.image_xobject(refs.image, &pixels);
    xobject.filter(Filter::FlateDecode);
    xobject.width(width);
    xobject.height(height);
    xobject.bits_per_component(8);
    xobject
        .color_space()
        .cal_rgb(SRGB_WHITE_POINT, None, Some(SRGB_GAMMA), Some(SRGB_MATRIX));
    xobject.finish();

    pdf.indirect(refs.intent)
        .dict()
        .pair(Name(b"Type"), Name(b"OutputIntent"))
        .pair(Name(b"S"), Name(b"GTS_PDFX"))
        .pair(Name(b"OutputConditionIdentifier"), Str(SRGB_CONDITION))
        .pair(Name(b"RegistryName"), Str(b"http://www.color.org"))
        .pair(Name(b"Info"), Str(SRGB_CONDITION));

    pdf.document_info(refs.info)
        .title(TextStr(&info.title))
        .creator(TextStr(&info.creator))
        .producer(TextStr(&info.creator));

    Ok(pdf.finish())
}

fn compress(data: &[u8]) -> Result<Vec<u8>, PosterError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
