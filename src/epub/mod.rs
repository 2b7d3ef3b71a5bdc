//! EPUB container loading: the zip archive plus its package document.

mod archive;
mod package;
pub mod paths;

use tracing::debug;

pub use archive::EpubArchive;
pub use package::{ManifestItem, Metadata, Package, SpineItem};

use crate::error::{ConvertError, Result};

pub struct Epub {
    pub archive: EpubArchive,
    pub package: Package,
}

impl Epub {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_archive(EpubArchive::from_bytes(bytes)?)
    }

    pub fn from_archive(archive: EpubArchive) -> Result<Self> {
        let root_file = package::root_file_path(archive.container_xml()?)?;
        debug!("Package document at {}", root_file);

        let opf = archive
            .get(&root_file)
            .ok_or_else(|| ConvertError::MissingEntry(root_file.clone()))?;
        let package = Package::parse(&root_file, opf)?;

        Ok(Self { archive, package })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.package.metadata
    }
}
