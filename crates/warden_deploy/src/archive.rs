//! Content-addressed bundle construction.
//!
//! An archive moves through a strict lifecycle: open for writes while the
//! input trees are walked and synthetic entries are injected, then sealed,
//! after which size and checksum are queryable and no further writes are
//! possible. The type split between [`PackageArchive`] and
//! [`SealedArchive`] makes write-after-seal unrepresentable, and dropping
//! either releases the backing temporary file.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use warden_core::function::BundleLayout;

use crate::error::ArchiveError;

const CHECKSUM_BLOCK_SIZE: usize = 64 * 1024;

/// A bundle archive open for writes.
pub struct PackageArchive {
    temp: NamedTempFile,
    writer: ZipWriter<File>,
    skip: Option<String>,
}

impl PackageArchive {
    /// Walk the layout's source and library trees into a fresh archive.
    ///
    /// A source root that is a single file is included alone; a directory
    /// is walked recursively and entered relative to its parent, so the
    /// root directory's own name is the top-level archive path. Library
    /// contents are entered relative to the library root itself.
    pub fn build(layout: &BundleLayout) -> Result<Self, ArchiveError> {
        let temp = NamedTempFile::new()?;
        let writer = ZipWriter::new(temp.reopen()?);
        let mut archive = Self {
            temp,
            writer,
            skip: layout.skip.clone(),
        };

        let source_root = layout.source_root.as_path();
        if !source_root.exists() {
            return Err(ArchiveError::MissingRoot(layout.source_root.clone()));
        }
        if source_root.is_file() {
            let name = source_root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            archive.add_disk_file(source_root, &name)?;
        } else {
            let prefix = source_root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
            archive.add_tree(source_root, &prefix, &layout.source_prune)?;
        }

        if let Some(library_root) = &layout.library_root {
            archive.add_library_tree(library_root, &layout.library_allow)?;
        }

        Ok(archive)
    }

    /// Inject an in-memory entry at `arc_name` without touching disk.
    pub fn add_contents(&mut self, arc_name: &str, contents: &[u8]) -> Result<(), ArchiveError> {
        self.writer.start_file(arc_name, entry_options(0o644))?;
        self.writer.write_all(contents)?;
        Ok(())
    }

    /// Close the archive for writes. Size and checksum are defined from
    /// here on.
    pub fn seal(self) -> Result<SealedArchive, ArchiveError> {
        let Self {
            temp, mut writer, ..
        } = self;
        writer.finish()?;
        let size = temp.as_file().metadata()?.len();
        let checksum = stream_checksum(temp.path())?;
        tracing::debug!(size_bytes = size, checksum = %checksum, "sealed bundle archive");
        Ok(SealedArchive {
            temp,
            size,
            checksum,
        })
    }

    fn add_tree(
        &mut self,
        dir: &Path,
        arc_prefix: &Path,
        prune: &[String],
    ) -> Result<(), ArchiveError> {
        let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
        // Sorted walk keeps the sealed bytes, and therefore the checksum,
        // independent of directory enumeration order.
        entries.sort_by_key(|entry| entry.file_name());
        for entry in entries {
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if file_type.is_dir() {
                if prune.iter().any(|pruned| pruned == &name) {
                    continue;
                }
                self.add_tree(&entry.path(), &arc_prefix.join(&name), prune)?;
            } else if file_type.is_file() {
                if self.skipped(&name) {
                    continue;
                }
                let arc_name = join_entry_name(arc_prefix, &name);
                self.add_disk_file(&entry.path(), &arc_name)?;
            }
        }
        Ok(())
    }

    fn add_library_tree(&mut self, root: &Path, allow: &[String]) -> Result<(), ArchiveError> {
        let mut entries: Vec<fs::DirEntry> = fs::read_dir(root)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());
        for entry in entries {
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if file_type.is_dir() {
                if !allow.is_empty() && !allow.iter().any(|allowed| allowed == &name) {
                    continue;
                }
                self.add_tree(&entry.path(), Path::new(&name), &[])?;
            } else if file_type.is_file() {
                if self.skipped(&name) {
                    continue;
                }
                self.add_disk_file(&entry.path(), &name)?;
            }
        }
        Ok(())
    }

    fn add_disk_file(&mut self, path: &Path, arc_name: &str) -> Result<(), ArchiveError> {
        let contents = fs::read(path)?;
        self.writer
            .start_file(arc_name, entry_options(entry_mode(path)?))?;
        self.writer.write_all(&contents)?;
        Ok(())
    }

    fn skipped(&self, file_name: &str) -> bool {
        self.skip
            .as_deref()
            .map(|pattern| matches_glob(pattern, file_name))
            .unwrap_or(false)
    }
}

/// A sealed, checksum-able bundle. Dropping it deletes the backing
/// temporary file.
pub struct SealedArchive {
    temp: NamedTempFile,
    size: u64,
    checksum: String,
}

impl SealedArchive {
    /// Base64-encoded SHA-256 over the sealed bytes; the idempotency key
    /// compared against the remote code checksum.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn size_bytes(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        Ok(fs::read(self.temp.path())?)
    }
}

// The deployment environment extracts the bundle as one principal and
// executes it as another. Entries must stay world-readable (keeping the
// exec bit where present) or invocation fails with no useful diagnostic,
// so permissions are forced rather than inherited from the host.
fn entry_mode(path: &Path) -> Result<u32, ArchiveError> {
    Ok(if is_executable(path)? { 0o755 } else { 0o644 })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool, ArchiveError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool, ArchiveError> {
    Ok(false)
}

fn entry_options(mode: u32) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode)
}

fn join_entry_name(prefix: &Path, name: &str) -> String {
    let mut parts: Vec<String> = prefix
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.push(name.to_string());
    parts.join("/")
}

fn stream_checksum(path: &Path) -> Result<String, ArchiveError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; CHECKSUM_BLOCK_SIZE];
    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }
    Ok(BASE64.encode(hasher.finalize()))
}

/// fnmatch-style matching with `*` wildcards over a file name.
fn matches_glob(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }
    if !name.starts_with(parts[0]) {
        return false;
    }
    let mut position = parts[0].len();
    let last = parts.len() - 1;
    for part in &parts[1..last] {
        if part.is_empty() {
            continue;
        }
        match name[position..].find(part) {
            Some(found) => position = found + position + part.len(),
            None => return false,
        }
    }
    name.len() >= position && name[position..].ends_with(parts[last])
}
