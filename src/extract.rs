use std::collections::{HashMap, HashSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::epub::{paths, Epub, ManifestItem};
use crate::error::{ConvertError, Result};

/// One spine document, in reading order.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: String,
    pub path: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct Image {
    pub path: String,
    pub data_uri: String,
}

/// Images of the book keyed by archive path, embedded as `data:` URIs.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<Image>,
    by_path: HashMap<String, usize>,
}

impl ImageStore {
    pub fn insert(&mut self, path: String, media_type: String, bytes: &[u8]) {
        let data_uri = format!("data:{};base64,{}", media_type, STANDARD.encode(bytes));
        let image = Image {
            path: path.clone(),
            data_uri,
        };

        match self.by_path.get(&path) {
            Some(&index) => self.images[index] = image,
            None => {
                self.by_path.insert(path, self.images.len());
                self.images.push(image);
            }
        }
    }

    /// Finds the image an `src` reference points at.
    ///
    /// `resolved` is the reference resolved against the referring document.
    /// When that misses, the bare file name is tried, then any stored path
    /// ending with it. The suffix match is loose: `cover.png` also finds
    /// `Images/bookcover.png`.
    pub fn lookup(&self, resolved: Option<&str>, href: &str) -> Option<&Image> {
        if let Some(image) = resolved.and_then(|p| self.get(p)) {
            return Some(image);
        }

        let name = paths::file_name(href);
        if name.is_empty() {
            return None;
        }
        if let Some(image) = self.get(name) {
            return Some(image);
        }

        self.images
            .iter()
            .find(|image| image.path.ends_with(name))
    }

    pub fn get(&self, path: &str) -> Option<&Image> {
        self.by_path.get(path).map(|&i| &self.images[i])
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Everything the assembler needs, pulled out of the archive.
#[derive(Debug)]
pub struct Book {
    pub title: String,
    pub creators: Vec<String>,
    pub language: Option<String>,
    pub chapters: Vec<Chapter>,
    pub stylesheets: Vec<String>,
    pub images: ImageStore,
}

/// Pulls chapters, stylesheets and images out of `epub`.
///
/// `fallback_title` is used when the package declares no `dc:title`.
pub fn extract(epub: &Epub, fallback_title: &str) -> Result<Book> {
    let metadata = epub.metadata();
    let title = metadata
        .title
        .clone()
        .unwrap_or_else(|| fallback_title.to_string());

    let stylesheets = extract_stylesheets(epub);
    let images = extract_images(epub);
    let mut chapters = extract_spine(epub);

    if chapters.is_empty() {
        warn!("Spine yielded no chapters, falling back to manifest order");
        chapters = epub
            .package
            .manifest
            .iter()
            .filter(|item| item.is_html())
            .filter_map(|item| read_chapter(epub, item))
            .collect();
    }

    if chapters.is_empty() {
        return Err(ConvertError::NoContent);
    }

    debug!(
        "Extracted {} chapters, {} stylesheets, {} images",
        chapters.len(),
        stylesheets.len(),
        images.len()
    );

    Ok(Book {
        title,
        creators: metadata.creators.clone(),
        language: metadata.language.clone(),
        chapters,
        stylesheets,
        images,
    })
}

fn extract_stylesheets(epub: &Epub) -> Vec<String> {
    epub.package
        .manifest
        .iter()
        .filter(|item| item.is_stylesheet())
        .filter_map(|item| {
            let css = epub.archive.get_string(&item.path);
            if css.is_none() {
                warn!("Stylesheet {} missing from archive", item.path);
            }
            css
        })
        .collect()
}

fn extract_images(epub: &Epub) -> ImageStore {
    let mut store = ImageStore::default();

    for item in epub.package.manifest.iter() {
        let inferred = item.media_type.is_empty() && is_image_path(&item.path);
        if !item.is_image() && !inferred {
            continue;
        }

        let Some(bytes) = epub.archive.get(&item.path) else {
            warn!("Could not extract image {}: missing from archive", item.path);
            continue;
        };

        let media_type = if item.media_type.is_empty() {
            media_type_for(&item.path).to_string()
        } else {
            item.media_type.clone()
        };
        store.insert(item.path.clone(), media_type, bytes);
    }

    store
}

fn extract_spine(epub: &Epub) -> Vec<Chapter> {
    let mut seen = HashSet::new();
    let mut chapters = Vec::new();

    for itemref in &epub.package.spine {
        if !seen.insert(itemref.idref.as_str()) {
            continue;
        }

        let Some(item) = epub.package.item(&itemref.idref) else {
            debug!("Spine references unknown item {}", itemref.idref);
            continue;
        };
        if !item.is_html() {
            debug!("Skipping non-HTML spine item {} ({})", item.id, item.media_type);
            continue;
        }

        if let Some(chapter) = read_chapter(epub, item) {
            chapters.push(chapter);
        }
    }

    chapters
}

fn read_chapter(epub: &Epub, item: &ManifestItem) -> Option<Chapter> {
    match epub.archive.get_string(&item.path) {
        Some(html) => Some(Chapter {
            id: item.id.clone(),
            path: item.path.clone(),
            html,
        }),
        None => {
            warn!("Could not read item {}: {} missing from archive", item.id, item.path);
            None
        }
    }
}

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
];

fn extension(path: &str) -> Option<String> {
    let name = paths::file_name(path);
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

fn is_image_path(path: &str) -> bool {
    extension(path).is_some_and(|ext| IMAGE_TYPES.iter().any(|(e, _)| *e == ext))
}

/// Media type guessed from the file extension; unknown extensions are
/// treated as JPEG.
pub fn media_type_for(path: &str) -> &'static str {
    extension(path)
        .and_then(|ext| {
            IMAGE_TYPES
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("image/jpeg")
}
