//! Container and package (OPF) document parsing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::paths;
use crate::error::{ConvertError, Result};

/// A manifest entry with its `href` already resolved to an archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub path: String,
    pub media_type: String,
}

impl ManifestItem {
    pub fn is_html(&self) -> bool {
        matches!(
            self.media_type.as_str(),
            "application/xhtml+xml" | "text/html"
        ) || (self.media_type.is_empty()
            && [".xhtml", ".html", ".htm"]
                .iter()
                .any(|ext| self.path.to_ascii_lowercase().ends_with(ext)))
    }

    pub fn is_stylesheet(&self) -> bool {
        self.media_type == "text/css"
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    pub idref: String,
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub creators: Vec<String>,
    pub language: Option<String>,
}

/// The parsed package document.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub path: String,
    pub metadata: Metadata,
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineItem>,
}

#[derive(Clone, Copy)]
enum MetaField {
    Title,
    Creator,
    Language,
}

impl Package {
    /// Parses the package document found at archive path `path`.
    pub fn parse(path: &str, xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut package = Package {
            path: path.to_string(),
            ..Default::default()
        };
        let mut in_metadata = false;
        let mut field: Option<MetaField> = None;
        let mut text = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"metadata" => in_metadata = true,
                    b"title" if in_metadata => field = Some(MetaField::Title),
                    b"creator" if in_metadata => field = Some(MetaField::Creator),
                    b"language" if in_metadata => field = Some(MetaField::Language),
                    b"item" => package.push_item(e),
                    b"itemref" => package.push_itemref(e),
                    _ => {}
                },
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"item" => package.push_item(e),
                    b"itemref" => package.push_itemref(e),
                    _ => {}
                },
                Event::Text(ref e) if field.is_some() => match e.unescape() {
                    Ok(t) => text.push_str(&t),
                    // unknown entities such as &nbsp; in titles
                    Err(_) => text.push_str(&String::from_utf8_lossy(e)),
                },
                Event::CData(ref e) if field.is_some() => {
                    text.push_str(&String::from_utf8_lossy(e));
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"metadata" => in_metadata = false,
                    b"title" | b"creator" | b"language" => {
                        if let Some(f) = field.take() {
                            package.metadata.set(f, text.trim());
                        }
                        text.clear();
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        debug!(
            "Package {}: {} manifest items, {} spine items",
            package.path,
            package.manifest.len(),
            package.spine.len()
        );
        Ok(package)
    }

    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    fn push_item(&mut self, e: &BytesStart) {
        let id = attr(e, b"id");
        let href = attr(e, b"href");

        let (Some(id), Some(href)) = (id, href) else {
            debug!("Skipping manifest item without id or href");
            return;
        };
        let Some(path) = paths::resolve(&self.path, &href) else {
            debug!("Skipping external manifest item {}", href);
            return;
        };

        self.manifest.push(ManifestItem {
            id,
            path,
            media_type: attr(e, b"media-type").unwrap_or_default(),
        });
    }

    // `linear="no"` items stay in reading order
    fn push_itemref(&mut self, e: &BytesStart) {
        if let Some(idref) = attr(e, b"idref") {
            self.spine.push(SpineItem { idref });
        }
    }
}

impl Metadata {
    fn set(&mut self, field: MetaField, value: &str) {
        if value.is_empty() {
            return;
        }
        match field {
            MetaField::Title => {
                self.title.get_or_insert_with(|| value.to_string());
            }
            MetaField::Creator => self.creators.push(value.to_string()),
            MetaField::Language => {
                self.language.get_or_insert_with(|| value.to_string());
            }
        }
    }
}

/// Reads `META-INF/container.xml` and returns the archive path of the first
/// rootfile.
pub fn root_file_path(container: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(container);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"rootfile" =>
            {
                if let Some(path) = attr(e, b"full-path") {
                    return Ok(path.trim_start_matches('/').to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Err(ConvertError::InvalidStructure(
        "container.xml declares no rootfile".to_string(),
    ))
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
