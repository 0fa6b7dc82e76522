//! PDF document handle backed by lopdf.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::{DocumentError, DocumentSource, EmbeddedImage, ImageData, RawColor};

/// A parsed PDF. Read-only; the source bytes are never modified.
pub struct PdfDocument {
    inner: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Parse a PDF from memory.
    ///
    /// Fails with [`DocumentError::Unreadable`] when the bytes are not a
    /// PDF, cannot be parsed, or are encrypted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        match infer::get(bytes) {
            Some(kind) if kind.mime_type() == "application/pdf" => {}
            Some(kind) => {
                return Err(DocumentError::Unreadable(format!(
                    "expected a PDF, got {}",
                    kind.mime_type()
                )))
            }
            None => {
                return Err(DocumentError::Unreadable(
                    "unrecognized file type (no PDF header)".to_string(),
                ))
            }
        }

        let inner = Document::load_mem(bytes)
            .map_err(|e| DocumentError::Unreadable(format!("failed to parse PDF: {}", e)))?;

        if inner.trailer.get(b"Encrypt").is_ok() {
            return Err(DocumentError::Unreadable(
                "PDF is encrypted".to_string(),
            ));
        }

        // get_pages() is keyed by 1-based page number
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        tracing::debug!("Parsed PDF with {} pages", page_ids.len());

        Ok(Self { inner, page_ids })
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, DocumentError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(DocumentError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }

    fn page_error(index: usize, message: impl Into<String>) -> DocumentError {
        DocumentError::PageText {
            page: index,
            message: message.into(),
        }
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.inner.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }

    /// Look up a page key, walking up the page tree through `/Parent`.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = page_id;
        // Bounded walk; a malformed tree may contain a /Parent cycle.
        for _ in 0..64 {
            let dict = self.inner.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let obj = self.inherited(page_id, b"Resources")?;
        self.resolve(obj).as_dict().ok()
    }

    /// Named `/Encoding` of a page font, or the `/BaseEncoding` of an
    /// encoding dictionary.
    fn font_encoding(&self, page_id: ObjectId, font: &[u8]) -> Option<&str> {
        let fonts = self.resolve(self.resources(page_id)?.get(b"Font").ok()?).as_dict().ok()?;
        let font = self.resolve(fonts.get(font).ok()?).as_dict().ok()?;
        let name = match self.resolve(font.get(b"Encoding").ok()?) {
            Object::Name(name) => name,
            Object::Dictionary(dict) => match dict.get(b"BaseEncoding").map(|o| self.resolve(o)) {
                Ok(Object::Name(name)) => name,
                _ => return None,
            },
            _ => return None,
        };
        std::str::from_utf8(name).ok()
    }

    fn read_image(&self, name: &str, stream: &Stream) -> EmbeddedImage {
        let dict = &stream.dict;
        let dimension = |key: &[u8]| match dict.get(key).map(|o| self.resolve(o)) {
            Ok(Object::Integer(n)) => u32::try_from(*n).unwrap_or(0),
            _ => 0,
        };
        let width = dimension(&b"Width"[..]);
        let height = dimension(&b"Height"[..]);

        EmbeddedImage {
            name: name.to_string(),
            width,
            height,
            data: self.image_data(stream),
        }
    }

    fn image_data(&self, stream: &Stream) -> ImageData {
        let dict = &stream.dict;
        let filters = self.filters(dict);

        // Encoded payloads are complete image files.
        if let Some(last) = filters.last() {
            if last == "DCTDecode" || last == "JPXDecode" {
                return ImageData::Encoded(stream.content.clone());
            }
        }
        if let Some(other) = filters.iter().find(|f| f.as_str() != "FlateDecode") {
            return ImageData::Unsupported(other.clone());
        }

        let bits = match dict.get(b"BitsPerComponent").map(|o| self.resolve(o)) {
            Ok(Object::Integer(n)) => *n,
            _ => 8,
        };
        if bits != 8 {
            return ImageData::Unsupported(format!("{} bits per component", bits));
        }

        let color = match dict.get(b"ColorSpace").map(|o| self.resolve(o)) {
            Ok(Object::Name(name)) => match name.as_slice() {
                b"DeviceGray" | b"CalGray" => RawColor::Gray,
                b"DeviceRGB" | b"CalRGB" => RawColor::Rgb,
                b"DeviceCMYK" => RawColor::Cmyk,
                other => {
                    return ImageData::Unsupported(String::from_utf8_lossy(other).into_owned())
                }
            },
            Ok(Object::Array(_)) => {
                return ImageData::Unsupported("indexed or ICC color space".to_string())
            }
            _ => RawColor::Gray,
        };

        let samples = if filters.is_empty() {
            stream.content.clone()
        } else {
            match stream.decompressed_content() {
                Ok(bytes) => bytes,
                Err(e) => return ImageData::Unsupported(format!("undecodable stream: {}", e)),
            }
        };

        ImageData::Raw { color, samples }
    }

    /// `/Filter` as a list of names (a single name or an array).
    fn filters(&self, dict: &Dictionary) -> Vec<String> {
        let name = |o: &Object| match o {
            Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            _ => None,
        };
        match dict.get(b"Filter").map(|o| self.resolve(o)) {
            Ok(Object::Array(items)) => items.iter().filter_map(|o| name(self.resolve(o))).collect(),
            Ok(other) => name(other).into_iter().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, index: usize) -> Result<String, DocumentError> {
        let page_id = self.page_id(index)?;
        let raw = self
            .inner
            .get_page_content(page_id)
            .map_err(|e| Self::page_error(index, format!("no content stream: {}", e)))?;
        let content = Content::decode(&raw)
            .map_err(|e| Self::page_error(index, format!("bad content stream: {}", e)))?;

        let mut text = String::new();
        let mut encoding: Option<&str> = None;
        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    encoding = match op.operands.first() {
                        Some(Object::Name(font)) => self.font_encoding(page_id, font),
                        _ => None,
                    };
                }
                "Tj" | "TJ" => {
                    for operand in &op.operands {
                        push_operand_text(&mut text, operand, encoding);
                    }
                }
                "'" | "\"" => {
                    new_line(&mut text);
                    if let Some(operand) = op.operands.last() {
                        push_operand_text(&mut text, operand, encoding);
                    }
                }
                "T*" | "ET" => new_line(&mut text),
                "Td" | "TD" => {
                    let moves_down = match op.operands.get(1) {
                        Some(Object::Integer(ty)) => *ty != 0,
                        Some(Object::Real(ty)) => *ty != 0.0,
                        _ => false,
                    };
                    if moves_down {
                        new_line(&mut text);
                    }
                }
                _ => {}
            }
        }

        Ok(text.trim_end().to_string())
    }

    fn page_images(&self, index: usize) -> Result<Vec<EmbeddedImage>, DocumentError> {
        let page_id = self.page_id(index)?;
        let Some(resources) = self.resources(page_id) else {
            return Ok(Vec::new());
        };
        let xobjects = match resources.get(b"XObject").map(|o| self.resolve(o)) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return Ok(Vec::new()),
        };

        let mut images = Vec::new();
        for (name, obj) in xobjects.iter() {
            let Ok(stream) = self.resolve(obj).as_stream() else {
                continue;
            };
            let is_image = matches!(
                stream.dict.get(b"Subtype"),
                Ok(Object::Name(subtype)) if subtype.as_slice() == b"Image"
            );
            if is_image {
                images.push(self.read_image(&String::from_utf8_lossy(name), stream));
            }
        }
        Ok(images)
    }
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn push_operand_text(text: &mut String, operand: &Object, encoding: Option<&str>) {
    match operand {
        Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes, encoding)),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes, encoding)),
                    // Large negative kerning separates words
                    Object::Integer(n) if *n < -200 => text.push(' '),
                    Object::Real(n) if *n < -200.0 => text.push(' '),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Single-byte encodings lopdf carries glyph tables for.
const SIMPLE_ENCODINGS: [&str; 4] = [
    "WinAnsiEncoding",
    "MacRomanEncoding",
    "StandardEncoding",
    "MacExpertEncoding",
];

/// Decode a PDF string: UTF-16BE with BOM, otherwise through the font's
/// single-byte encoding. Fonts without a known table read as WinAnsi.
fn decode_pdf_string(bytes: &[u8], encoding: Option<&str>) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFEu8, 0xFF][..]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let table = encoding
        .filter(|name| SIMPLE_ENCODINGS.contains(name))
        .unwrap_or("WinAnsiEncoding");
    Document::decode_text(Some(table), bytes)
}
