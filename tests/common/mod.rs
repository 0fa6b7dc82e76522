//! Shared fixtures: in-memory PDFs and scripted OCR backends.

#![allow(dead_code)]

use std::path::Path;

use huurscan::ocr::{OcrBackend, OcrBackendType, OcrError};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// One line of text per content-stream BT/ET block.
pub fn text_page(lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            format!("BT /F1 11 Tf 72 {} Td ({}) Tj ET\n", 760 - 16 * i as i64, escaped)
        })
        .collect()
}

/// A 16x16 gray raster, large enough not to count as decoration.
pub fn scan_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 16i64,
            "Height" => 16i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        (0..256u32).map(|i| if i % 16 < 8 { 30 } else { 220 }).collect(),
    )
}

/// Build a PDF with one page per content stream. Pages listed in
/// `scanned_pages` carry [`scan_image`] in their own resources.
pub fn build_pdf(page_contents: &[String], scanned_pages: &[usize]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for (index, content) in page_contents.iter().enumerate() {
        let mut xobjects = Dictionary::new();
        if scanned_pages.contains(&index) {
            let image_id = doc.add_object(Object::Stream(scan_image()));
            xobjects.set("Scan0", image_id);
        }
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// OCR backend that returns fixed text for every image.
pub struct ScriptedOcr {
    pub text: &'static str,
    pub fail: bool,
}

impl ScriptedOcr {
    pub fn reading(text: &'static str) -> Self {
        Self { text, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            text: "",
            fail: true,
        }
    }
}

impl OcrBackend for ScriptedOcr {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "scripted".to_string()
    }

    fn run_ocr(&self, _image_path: &Path) -> Result<String, OcrError> {
        if self.fail {
            Err(OcrError::OcrFailed("engine crashed".to_string()))
        } else {
            Ok(self.text.to_string())
        }
    }
}
