//! ODF package access and markup loading

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

pub mod dom;
pub mod units;

pub use dom::Element;

pub const CONTENT_ENTRY: &str = "content.xml";
pub const STYLES_ENTRY: &str = "styles.xml";

/// Source of named byte streams inside a document package
pub trait PackageSource {
    /// A missing entry is `Ok(None)`, not an error
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// Zip-backed package (.ods on disk or in memory)
pub struct ZipPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl ZipPackage<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipPackage<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> PackageSource for ZipPackage<R> {
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }
}

/// In-memory package, keyed by entry name
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), data.into());
    }
}

impl PackageSource for MemoryPackage {
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Kind of document held in `content.xml`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Spreadsheet,
    Text,
    Unknown,
}

impl DocumentKind {
    pub fn detect(content: &Element) -> Self {
        if content.contains_tag("office:spreadsheet") {
            DocumentKind::Spreadsheet
        } else if content.contains_tag("office:text") {
            DocumentKind::Text
        } else {
            DocumentKind::Unknown
        }
    }
}

/// Parsed `content.xml` plus `styles.xml` when the package has one
#[derive(Debug, Clone)]
pub struct DocumentTrees {
    pub content: Element,
    pub styles: Option<Element>,
}

/// Read and parse both entries. Only the content entry is mandatory.
pub fn load_trees(package: &mut impl PackageSource) -> Result<DocumentTrees> {
    // A corrupt entry (bad CRC, truncated stream) is as unreadable as a missing one
    let content_bytes = package
        .read_entry(CONTENT_ENTRY)
        .map_err(|e| RenderError::unreadable(CONTENT_ENTRY, e))?
        .ok_or_else(|| RenderError::unreadable(CONTENT_ENTRY, "entry not found"))?;
    let content =
        dom::parse_bytes(&content_bytes).map_err(|e| RenderError::unreadable(CONTENT_ENTRY, e))?;

    let styles = match package.read_entry(STYLES_ENTRY).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable {}: {}", STYLES_ENTRY, e);
        None
    }) {
        Some(bytes) => match dom::parse_bytes(&bytes) {
            Ok(tree) => Some(tree),
            Err(e) => {
                log::warn!("Ignoring unparsable {}: {}", STYLES_ENTRY, e);
                None
            }
        },
        None => {
            log::warn!("Package has no {}; page layouts fall back to defaults", STYLES_ENTRY);
            None
        }
    };

    Ok(DocumentTrees { content, styles })
}
