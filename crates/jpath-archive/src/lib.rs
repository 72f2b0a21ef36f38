//! Opened dependency archives (JARs, zips and JMODs).
//!
//! An [`Archive`] reads the central directory once when it is opened and keeps
//! the zip handle until [`Archive::close`]. Entry lookups are served from that
//! index without touching the file; only reading entry bytes goes back to the
//! handle.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::Context;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for an entry. Sizes come from
/// the archive's headers and are not trusted beyond this.
const MAX_PREALLOCATION: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive {} has been closed", path.display())]
    Closed { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] ZipError),
}

/// Metadata of one central-directory record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    name: String,
    is_dir: bool,
    size: u64,
    last_modified: Option<SystemTime>,
}

impl ArchiveEntry {
    /// Entry name as stored in the archive (`com/example/Foo.class`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }
}

#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    entries: Vec<ArchiveEntry>,
    by_name: HashMap<String, usize>,
    zip: Mutex<Option<ZipArchive<File>>>,
}

impl Archive {
    /// Open `path` and index its central directory.
    ///
    /// Fails if the file cannot be opened or is not a zip archive.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let file = File::open(&path)
            .with_context(|| format!("failed to open archive {}", path.display()))?;
        let mut zip = ZipArchive::new(file)
            .with_context(|| format!("failed to read zip {}", path.display()))?;

        let mut entries = Vec::with_capacity(zip.len());
        let mut by_name = HashMap::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index_raw(i).with_context(|| {
                format!("failed to read entry #{i} of zip {}", path.display())
            })?;
            let name = file.name().to_owned();
            let modified: Option<zip::DateTime> = file.last_modified().into();
            let entry = ArchiveEntry {
                is_dir: file.is_dir(),
                size: file.size(),
                last_modified: modified.and_then(zip_time_to_system_time),
                name,
            };

            // Keep the first record when a name is duplicated.
            if !by_name.contains_key(&entry.name) {
                by_name.insert(entry.name.clone(), entries.len());
            }
            entries.push(entry);
        }

        Ok(Self {
            path,
            entries,
            by_name,
            zip: Mutex::new(Some(zip)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its exact stored name.
    ///
    /// Directory records are stored with a trailing `/`.
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// All entries in central-directory order.
    pub fn entries(&self) -> std::slice::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }

    /// Read an entry from the archive.
    ///
    /// Returns `Ok(None)` when the entry isn't present.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut guard = self.zip.lock().expect("mutex poisoned");
        let Some(zip) = guard.as_mut() else {
            return Err(ArchiveError::Closed {
                path: self.path.clone(),
            });
        };

        let result = match zip.by_name(name) {
            Ok(mut entry) => {
                let mut buf = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
                entry.read_to_end(&mut buf)?;
                Ok(Some(buf))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(err) => Err(err.into()),
        };
        result
    }

    /// Open a byte stream over an entry.
    ///
    /// The entry is inflated into memory so the stream does not hold the
    /// archive lock.
    pub fn open_entry(&self, name: &str) -> Result<Cursor<Vec<u8>>, ArchiveError> {
        match self.read(name)? {
            Some(bytes) => Ok(Cursor::new(bytes)),
            None => Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("entry {name} not found in {}", self.path.display()),
            ))),
        }
    }

    /// Release the underlying file handle.
    ///
    /// The index stays readable; every later byte read fails with
    /// [`ArchiveError::Closed`]. Returns `false` if the archive was already
    /// closed.
    pub fn close(&self) -> bool {
        self.zip.lock().expect("mutex poisoned").take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.zip.lock().expect("mutex poisoned").is_none()
    }
}

/// Zip timestamps carry no zone; they are interpreted as UTC.
fn zip_time_to_system_time(stamp: zip::DateTime) -> Option<SystemTime> {
    time::OffsetDateTime::try_from(stamp)
        .ok()
        .map(SystemTime::from)
}
