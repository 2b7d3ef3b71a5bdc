use std::path::{Path, PathBuf};

use colored::*;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::assemble::{assemble, AssembledDocument};
use crate::epub::Epub;
use crate::error::{ConvertError, Result};
use crate::extract::{extract, Book};
use crate::pdf_meta::{self, PdfInfo};
use crate::render::{PdfOptions, Renderer};
use crate::report::Report;

const DEFAULT_OUTPUT_DIR: &str = "output";

/// Drives one EPUB through load, extract, assemble, render and report.
pub struct Converter {
    renderer: Renderer,
    html_dump: Option<PathBuf>,
}

impl Converter {
    pub fn new(pdf_options: PdfOptions, timeout_seconds: f64) -> Self {
        Self {
            renderer: Renderer::new(pdf_options, timeout_seconds),
            html_dump: None,
        }
    }

    /// Also write the assembled HTML to `path`.
    pub fn with_html_dump(mut self, path: PathBuf) -> Self {
        self.html_dump = Some(path);
        self
    }

    /// Converts `epub_path` into a PDF at `pdf_path`, or at
    /// `output/<stem>.pdf` when no path is given.
    pub async fn run(&self, epub_path: &Path, pdf_path: Option<&Path>) -> Result<Report> {
        let pdf_path = pdf_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(epub_path));

        info!("Converting \"{}\"", epub_path.display().to_string().green());
        info!("Output \"{}\"", pdf_path.display().to_string().blue());

        let (book, document) = prepare(epub_path).await?;

        if let Some(dump) = &self.html_dump {
            write_file(dump, document.html.as_bytes()).await?;
            info!("Assembled HTML written to {}", dump.display().to_string().blue());
        }

        let pdf = self.renderer.render(&document.html).await?;

        let info = PdfInfo {
            title: book.title.clone(),
            author: (!book.creators.is_empty()).then(|| book.creators.join(", ")),
        };
        let (bytes, pages) = match pdf_meta::stamp(&pdf, &info) {
            Ok(stamped) => (stamped.bytes, Some(stamped.page_count)),
            Err(e) => {
                warn!("Could not write PDF metadata, keeping renderer output: {}", e);
                (pdf, None)
            }
        };

        write_file(&pdf_path, &bytes).await?;
        let output_bytes = fs::metadata(&pdf_path).await?.len();

        let mut report = build_report(epub_path, &book, &document);
        report.output = Some(pdf_path);
        report.output_bytes = Some(output_bytes);
        report.pages = pages;
        Ok(report)
    }
}

/// Runs everything up to rendering and reports what would be converted.
pub async fn inspect(epub_path: &Path) -> Result<Report> {
    let (book, document) = prepare(epub_path).await?;
    Ok(build_report(epub_path, &book, &document))
}

/// `output/<stem>.pdf` for `<dir>/<stem>.epub`.
pub fn default_output_path(epub_path: &Path) -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("{}.pdf", file_stem(epub_path)))
}

async fn prepare(epub_path: &Path) -> Result<(Book, AssembledDocument)> {
    let bytes = match fs::read(epub_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConvertError::NotFound(epub_path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    debug!("Read {} bytes from {}", bytes.len(), epub_path.display());

    let epub = Epub::from_bytes(bytes)?;
    let book = extract(&epub, &file_stem(epub_path))?;
    let document = assemble(&book);

    if !document.unresolved_images.is_empty() {
        warn!(
            "{} image reference(s) could not be resolved",
            document.unresolved_images.len()
        );
    }

    Ok((book, document))
}

fn build_report(epub_path: &Path, book: &Book, document: &AssembledDocument) -> Report {
    Report {
        input: epub_path.to_path_buf(),
        output: None,
        title: book.title.clone(),
        authors: book.creators.clone(),
        chapters: document.chapter_count,
        images: document.image_count,
        stylesheets: book.stylesheets.len(),
        unresolved_images: document.unresolved_images.clone(),
        output_bytes: None,
        pages: None,
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, contents).await?;
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string())
}
