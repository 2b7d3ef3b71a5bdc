use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the conversion pipeline.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Malformed package document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Required file not found in archive: {0}")]
    MissingEntry(String),

    #[error("Invalid EPUB structure: {0}")]
    InvalidStructure(String),

    #[error("No HTML content found in EPUB")]
    NoContent,

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("PDF post-processing failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
