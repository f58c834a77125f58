//! Zip extraction
//!
//! Unpacks a translation bundle into a destination directory and reports
//! every regular file written, in archive order.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{Error, Result};

/// Extract `archive` into `dest`, returning the archive-relative names of
/// the regular files written
///
/// `dest` and any missing ancestors are created. Existing files are
/// truncated and overwritten. Directory entries are created but not
/// reported. The first failing entry aborts the extraction.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<String>> {
    let file = File::open(archive).map_err(|e| Error::filesystem(archive, e))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| Error::archive(archive, format!("failed to read archive: {e}")))?;

    fs::create_dir_all(dest).map_err(|e| Error::filesystem(dest, e))?;

    let mut extracted = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::archive(archive, format!("failed to read entry {index}: {e}")))?;

        let name = entry.name().to_string();
        let relative = entry_path(archive, &name, entry.enclosed_name())?;
        let target = dest.join(&relative);
        let mode = entry.unix_mode();

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::filesystem(&target, e))?;
            apply_mode(&target, mode)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
        }

        let mut output = File::create(&target).map_err(|e| Error::filesystem(&target, e))?;
        io::copy(&mut entry, &mut output).map_err(|e| Error::filesystem(&target, e))?;
        drop(output);
        apply_mode(&target, mode)?;

        tracing::debug!(entry = %name, path = %target.display(), "extracted");
        extracted.push(name);
    }

    Ok(extracted)
}

/// Resolve an entry name to a path that stays inside the destination
fn entry_path(archive: &Path, name: &str, enclosed: Option<impl AsRef<Path>>) -> Result<PathBuf> {
    match enclosed {
        Some(path) => Ok(path.as_ref().to_path_buf()),
        None => Err(Error::archive(
            archive,
            format!("entry '{name}' would be written outside the destination directory"),
        )),
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        let perms = fs::Permissions::from_mode(mode & 0o777);
        fs::set_permissions(path, perms).map_err(|e| Error::filesystem(path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    enum Entry<'a> {
        Dir(&'a str),
        File(&'a str, &'a [u8]),
    }

    fn write_zip(path: &Path, entries: &[Entry<'_>]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for entry in entries {
            match entry {
                Entry::Dir(name) => zip.add_directory(*name, options).unwrap(),
                Entry::File(name, contents) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(contents).unwrap();
                }
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(
            &archive,
            &[
                Entry::File("a.txt", b"alpha"),
                Entry::Dir("dir/"),
                Entry::File("dir/b.txt", b"beta"),
            ],
        );

        let dest = temp.path().join("out");
        let extracted = extract_zip(&archive, &dest).unwrap();

        assert_eq!(extracted, vec!["a.txt".to_string(), "dir/b.txt".to_string()]);
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("dir/b.txt")).unwrap(), b"beta");
        assert!(dest.join("dir").is_dir());
    }

    #[test]
    fn test_creates_missing_ancestors() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(&archive, &[Entry::File("de/LC_MESSAGES/app.po", b"msgid \"\"")]);

        let dest = temp.path().join("deep/nested/out");
        let extracted = extract_zip(&archive, &dest).unwrap();

        assert_eq!(extracted, vec!["de/LC_MESSAGES/app.po".to_string()]);
        assert!(dest.join("de/LC_MESSAGES/app.po").is_file());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(&archive, &[Entry::File("fr.json", b"{}")]);

        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("fr.json"), b"a much longer previous translation").unwrap();

        extract_zip(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("fr.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_empty_archive_creates_destination() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("empty.zip");
        write_zip(&archive, &[]);

        let dest = temp.path().join("out");
        let extracted = extract_zip(&archive, &dest).unwrap();
        assert!(extracted.is_empty());
        assert!(dest.is_dir());
    }

    #[test]
    fn test_parent_reference_entry_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[Entry::File("../escape.txt", b"nope")]);

        let dest = temp.path().join("out");
        let err = extract_zip(&archive, &dest).unwrap_err();

        assert!(matches!(err, Error::Archive { .. }));
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let err = extract_zip(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::Archive { .. }));
    }

    #[test]
    fn test_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = extract_zip(&temp.path().join("absent.zip"), temp.path()).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_applies_recorded_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        let file = File::create(&archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("script.sh", SimpleFileOptions::default().unix_permissions(0o750))
            .unwrap();
        zip.write_all(b"#!/bin/sh\n").unwrap();
        zip.finish().unwrap();

        let dest = temp.path().join("out");
        extract_zip(&archive, &dest).unwrap();

        let mode = fs::metadata(dest.join("script.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
