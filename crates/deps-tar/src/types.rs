//! Extraction request and archive subtype detection.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";

/// Compression wrapped around a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveSubtype {
    Gzip,
    Bzip2,
    Plain,
}

impl ArchiveSubtype {
    /// Detects the subtype from the first bytes of an archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use deps_tar::ArchiveSubtype;
    ///
    /// assert_eq!(ArchiveSubtype::sniff(&[0x1f, 0x8b, 0x08]), ArchiveSubtype::Gzip);
    /// assert_eq!(ArchiveSubtype::sniff(b"BZh91AY"), ArchiveSubtype::Bzip2);
    /// assert_eq!(ArchiveSubtype::sniff(b"package.xml"), ArchiveSubtype::Plain);
    /// ```
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else if head.starts_with(&BZIP2_MAGIC) {
            Self::Bzip2
        } else {
            Self::Plain
        }
    }
}

/// One extraction: archive, destination, and the detected subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    archive: PathBuf,
    destination: PathBuf,
    subtype: ArchiveSubtype,
}

impl ExtractionRequest {
    /// Builds a request, sniffing the subtype from the archive content.
    ///
    /// An unreadable archive is treated as plain; the strategies report the
    /// read failure themselves.
    pub fn new(archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let archive = archive.into();
        let subtype = read_head(&archive)
            .map(|head| ArchiveSubtype::sniff(&head))
            .unwrap_or(ArchiveSubtype::Plain);

        Self {
            archive,
            destination: destination.into(),
            subtype,
        }
    }

    /// Builds a request with an already known subtype.
    pub fn with_subtype(
        archive: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        subtype: ArchiveSubtype,
    ) -> Self {
        Self {
            archive: archive.into(),
            destination: destination.into(),
            subtype,
        }
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Subtype detected from content.
    pub fn subtype(&self) -> ArchiveSubtype {
        self.subtype
    }

    /// Whether the file name claims gzip compression (`.gz` or `.tgz`).
    pub fn has_gzip_extension(&self) -> bool {
        self.archive
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz"))
    }
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(BZIP2_MAGIC.len());
    File::open(path)?
        .take(BZIP2_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}
