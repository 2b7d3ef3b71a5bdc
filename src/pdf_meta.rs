use lopdf::{Dictionary, Document, Object, StringFormat};
use tracing::debug;

use crate::error::Result;

/// Document information written into the rendered PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfInfo {
    pub title: String,
    pub author: Option<String>,
}

pub struct StampedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Writes `info` into the PDF's document information dictionary and counts
/// its pages.
pub fn stamp(pdf: &[u8], info: &PdfInfo) -> Result<StampedPdf> {
    let mut document = Document::load_mem(pdf)?;
    let page_count = document.get_pages().len();

    let mut entries = vec![
        ("Title", text_string(&info.title)),
        ("Creator", text_string(env!("CARGO_PKG_NAME"))),
    ];
    if let Some(author) = &info.author {
        entries.push(("Author", text_string(author)));
    }

    match document.trailer.get(b"Info").ok().cloned() {
        Some(Object::Reference(id)) => {
            let dict = document.get_object_mut(id)?.as_dict_mut()?;
            for (key, value) in entries {
                dict.set(key, value);
            }
        }
        Some(Object::Dictionary(mut dict)) => {
            for (key, value) in entries {
                dict.set(key, value);
            }
            document.trailer.set("Info", Object::Dictionary(dict));
        }
        _ => {
            let mut dict = Dictionary::new();
            for (key, value) in entries {
                dict.set(key, value);
            }
            let id = document.add_object(dict);
            document.trailer.set("Info", Object::Reference(id));
        }
    }

    let mut bytes = Vec::new();
    document.save_to(&mut bytes)?;
    debug!("Stamped PDF metadata on {} pages", page_count);

    Ok(StampedPdf { bytes, page_count })
}

/// PDF text string: PDFDocEncoding-compatible ASCII as a literal, anything
/// else as UTF-16BE with a byte order mark.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}
