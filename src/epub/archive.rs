//! Zip container access.
//!
//! An EPUB is a zip archive. The whole archive is unpacked into memory up
//! front; books are small enough and every later stage needs random access.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use tracing::debug;
use zip::read::ZipArchive;

use crate::error::{ConvertError, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

pub struct EpubArchive {
    files: HashMap<String, Vec<u8>>,
}

impl EpubArchive {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        debug!("Unpacked {} archive entries", files.len());
        Ok(Self { files })
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Entry contents decoded as UTF-8, replacing invalid sequences.
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn container_xml(&self) -> Result<&[u8]> {
        self.get(CONTAINER_PATH)
            .ok_or_else(|| ConvertError::MissingEntry(CONTAINER_PATH.to_string()))
    }
}
