//! # epub2pdf
//!
//! A CLI utility to convert EPUB e-books into PDF files.
//!
//! The pipeline reads the EPUB container, pulls chapters, stylesheets and
//! images out of it in spine order, assembles them into a single HTML
//! document and prints that document to PDF through headless Chromium.
//!
//! ## Usage
//!
//! ```bash
//! epub2pdf convert book.epub -o book.pdf
//! epub2pdf inspect book.epub --json
//! ```

pub mod assemble;
pub mod converter;
pub mod epub;
pub mod error;
pub mod extract;
pub mod pdf_meta;
pub mod render;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use converter::Converter;
pub use error::{ConvertError, Result};
pub use render::{PaperSize, PdfOptions, Renderer};
pub use report::Report;
