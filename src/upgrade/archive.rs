//! Archive extraction for downloaded release assets.
//!
//! Two container formats exist in the wild for our releases: gzipped tar for
//! Unix platforms and zip for Windows. Both are modeled as variants of one
//! [`ArchiveFormat`] capability selected once by extension, so a future
//! format only touches the factory. Extraction walks every entry, writes it
//! under the destination directory, and records the path of the entry whose
//! base name matches the expected executable.
//!
//! Extraction is synchronous (flate2, tar, and zip are blocking readers);
//! the orchestrator runs it on the blocking thread pool.

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;
use zip::ZipArchive;

use crate::core::UpgradeError;

/// A supported archive container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzipped tar (`.tar.gz`), streamed through a gzip decoder
    TarGz,
    /// Zip (`.zip`), opened as a random-access reader
    Zip,
}

impl ArchiveFormat {
    /// Select the format from an archive's file name.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::UnsupportedFormat`] for any extension other than
    /// `.tar.gz` or `.zip`.
    pub fn detect(archive_path: &Path) -> Result<Self, UpgradeError> {
        let name = archive_path.file_name().map(OsStr::to_string_lossy).unwrap_or_default();
        if name.ends_with(".tar.gz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(UpgradeError::UnsupportedFormat { name: name.into_owned() })
        }
    }

    /// Extract the archive into `dest_dir` and locate the embedded executable.
    ///
    /// Directories are created with mode 0755; regular files keep the mode
    /// stored in the archive. The returned path points at the entry whose
    /// base name equals `expected_binary`.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::ArchiveCorrupt`] if the archive cannot be opened or
    ///   an entry cannot be read or unpacked
    /// - [`UpgradeError::Io`] if a destination directory or file cannot be
    ///   created
    /// - [`UpgradeError::BinaryNotFound`] if no entry matches
    ///   `expected_binary` after a full scan
    pub fn extract(
        self,
        archive_path: &Path,
        dest_dir: &Path,
        expected_binary: &str,
    ) -> Result<PathBuf, UpgradeError> {
        debug!(
            "extracting {} into {} (looking for '{}')",
            archive_path.display(),
            dest_dir.display(),
            expected_binary
        );
        let binary_path = match self {
            Self::TarGz => extract_tar_gz(archive_path, dest_dir, expected_binary)?,
            Self::Zip => extract_zip(archive_path, dest_dir, expected_binary)?,
        };
        match binary_path {
            Some(path) => {
                debug!("found executable at {}", path.display());
                Ok(path)
            }
            None => Err(UpgradeError::BinaryNotFound { name: expected_binary.to_string() }),
        }
    }
}

fn corrupt(err: impl std::fmt::Display) -> UpgradeError {
    UpgradeError::ArchiveCorrupt { reason: err.to_string() }
}

fn extract_tar_gz(
    archive_path: &Path,
    dest_dir: &Path,
    expected_binary: &str,
) -> Result<Option<PathBuf>, UpgradeError> {
    let file = File::open(archive_path).map_err(corrupt)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let mut binary_path = None;
    for entry in archive.entries().map_err(corrupt)? {
        let mut entry = entry.map_err(corrupt)?;
        let relative = entry.path().map_err(corrupt)?.into_owned();
        let is_file = entry.header().entry_type().is_file();

        // unpack_in refuses paths escaping dest_dir and preserves the
        // stored mode for regular files (dirs default to 0755).
        let unpacked = entry.unpack_in(dest_dir).map_err(corrupt)?;

        if unpacked && is_file && relative.file_name() == Some(OsStr::new(expected_binary)) {
            binary_path = Some(dest_dir.join(&relative));
        }
    }

    Ok(binary_path)
}

fn extract_zip(
    archive_path: &Path,
    dest_dir: &Path,
    expected_binary: &str,
) -> Result<Option<PathBuf>, UpgradeError> {
    let file = File::open(archive_path).map_err(corrupt)?;
    let mut archive = ZipArchive::new(file).map_err(corrupt)?;

    let mut binary_path = None;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(corrupt)?;

        // Entries with absolute or parent-escaping names are skipped.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let target = dest_dir.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out).map_err(corrupt)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode))?;
        }

        if relative.file_name() == Some(OsStr::new(expected_binary)) {
            binary_path = Some(target);
        }
    }

    Ok(binary_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_tar_gz(path: &Path, entries: &[(&str, &[u8], u32)]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn make_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn detect_maps_extensions_to_formats() {
        assert_eq!(
            ArchiveFormat::detect(Path::new("loft_Linux_x86_64.tar.gz")).unwrap(),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("loft_Windows_x86_64.zip")).unwrap(),
            ArchiveFormat::Zip
        );
    }

    #[test]
    fn detect_rejects_unknown_extensions() {
        let err = ArchiveFormat::detect(Path::new("loft.tar.xz")).unwrap_err();
        assert!(matches!(err, UpgradeError::UnsupportedFormat { .. }));

        let err = ArchiveFormat::detect(Path::new("loft.bin")).unwrap_err();
        assert!(matches!(err, UpgradeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn tar_gz_round_trip_preserves_bytes() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Linux_x86_64.tar.gz");
        let payload = b"#!/bin/sh\necho loft binary payload\n";
        make_tar_gz(&archive, &[("loft", payload, 0o755), ("README.md", b"docs", 0o644)]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let binary = ArchiveFormat::TarGz.extract(&archive, &dest, "loft").unwrap();
        assert_eq!(std::fs::read(&binary).unwrap(), payload);

        // Idempotent re-extraction into a fresh directory
        let dest2 = tmp.path().join("out2");
        std::fs::create_dir_all(&dest2).unwrap();
        let binary2 = ArchiveFormat::TarGz.extract(&archive, &dest2, "loft").unwrap();
        assert_eq!(std::fs::read(&binary2).unwrap(), payload);
    }

    #[cfg(unix)]
    #[test]
    fn tar_gz_preserves_stored_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Linux_x86_64.tar.gz");
        make_tar_gz(&archive, &[("loft", b"payload", 0o755)]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let binary = ArchiveFormat::TarGz.extract(&archive, &dest, "loft").unwrap();
        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn tar_gz_handles_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Linux_x86_64.tar.gz");
        let payload = b"nested payload";
        make_tar_gz(&archive, &[("loft-1.0/bin/loft", payload, 0o755)]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let binary = ArchiveFormat::TarGz.extract(&archive, &dest, "loft").unwrap();
        assert_eq!(binary, dest.join("loft-1.0/bin/loft"));
        assert_eq!(std::fs::read(&binary).unwrap(), payload);
    }

    #[test]
    fn zip_round_trip_preserves_bytes() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Windows_x86_64.zip");
        let payload = b"MZ windows binary payload";
        make_zip(&archive, &[("loft.exe", payload), ("LICENSE", b"mit")]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let binary = ArchiveFormat::Zip.extract(&archive, &dest, "loft.exe").unwrap();
        assert_eq!(std::fs::read(&binary).unwrap(), payload);
    }

    #[test]
    fn zip_handles_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Windows_x86_64.zip");
        let payload = b"nested zip payload";
        make_zip(&archive, &[("loft-1.0/loft.exe", payload)]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let binary = ArchiveFormat::Zip.extract(&archive, &dest, "loft.exe").unwrap();
        assert_eq!(binary, dest.join("loft-1.0/loft.exe"));
        assert_eq!(std::fs::read(&binary).unwrap(), payload);
    }

    #[test]
    fn missing_executable_reports_binary_not_found() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Linux_x86_64.tar.gz");
        make_tar_gz(&archive, &[("README.md", b"no binary here", 0o644)]);

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let err = ArchiveFormat::TarGz.extract(&archive, &dest, "loft").unwrap_err();
        assert!(matches!(err, UpgradeError::BinaryNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_destination_reports_archive_corrupt() {
        use std::os::unix::fs::PermissionsExt;

        if crate::upgrade::elevate::running_elevated() {
            // root bypasses mode bits, unpacking would succeed
            return;
        }

        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("loft_Linux_x86_64.tar.gz");
        make_tar_gz(&archive, &[("loft", b"payload", 0o755)]);

        let dest = tmp.path().join("ro");
        std::fs::create_dir(&dest).unwrap();
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o555)).unwrap();
        let err = ArchiveFormat::TarGz.extract(&archive, &dest, "loft").unwrap_err();
        assert!(matches!(err, UpgradeError::ArchiveCorrupt { .. }));
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn garbage_bytes_report_archive_corrupt() {
        let tmp = TempDir::new().unwrap();

        let bad_tar = tmp.path().join("bad.tar.gz");
        std::fs::write(&bad_tar, b"this is not gzip data").unwrap();
        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let err = ArchiveFormat::TarGz.extract(&bad_tar, &dest, "loft").unwrap_err();
        assert!(matches!(err, UpgradeError::ArchiveCorrupt { .. }));

        let bad_zip = tmp.path().join("bad.zip");
        std::fs::write(&bad_zip, b"this is not a zip").unwrap();
        let err = ArchiveFormat::Zip.extract(&bad_zip, &dest, "loft.exe").unwrap_err();
        assert!(matches!(err, UpgradeError::ArchiveCorrupt { .. }));
    }
}
