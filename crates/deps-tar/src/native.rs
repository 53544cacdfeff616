//! In-process extraction with the `tar` crate.

use crate::error::{Result, TarError};
use crate::extractor::ArchiveExtractionStrategy;
use crate::types::{ArchiveSubtype, ExtractionRequest};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use tar::Archive;

/// Extracts plain, gzip and bzip2 tarballs in-process.
///
/// The compression is chosen from the archive content, never from its name.
/// Entries escaping the destination (`..`, absolute paths) are skipped by
/// the `tar` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExtractor;

impl NativeExtractor {
    fn unpack(reader: impl Read, request: &ExtractionRequest) -> std::io::Result<()> {
        let mut archive = Archive::new(reader);
        archive.set_preserve_permissions(false);
        archive.set_overwrite(true);
        archive.unpack(request.destination())
    }
}

impl ArchiveExtractionStrategy for NativeExtractor {
    fn name(&self) -> &'static str {
        "native"
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<()> {
        let archive = request.archive();
        let native_err = |e| TarError::native(archive, e);

        let file = File::open(archive).map_err(native_err)?;
        std::fs::create_dir_all(request.destination())
            .map_err(|e| TarError::create_dir(request.destination(), e))?;

        let reader = BufReader::new(file);
        match request.subtype() {
            ArchiveSubtype::Gzip => Self::unpack(GzDecoder::new(reader), request),
            ArchiveSubtype::Bzip2 => Self::unpack(BzDecoder::new(reader), request),
            ArchiveSubtype::Plain => Self::unpack(reader, request),
        }
        .map_err(native_err)
    }
}
