use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jpath_archive::{Archive, ArchiveEntry as ArchiveRecord, ArchiveError};
use jpath_image::{ImageFileSystem, ImagePath, IMAGE_SCHEME};

use crate::ClasspathError;

/// Recorded lengths may come from archive headers, so only this much is
/// reserved before reading.
const MAX_PREALLOCATION: u64 = 64 * 1024;

/// A resolved artifact on the class path: a plain file, an archive entry, or
/// a runtime-image file.
///
/// All metadata is captured when the resource is created. The byte stream is
/// only opened by [`FileResource::open_input`].
#[derive(Clone, Debug)]
pub struct FileResource {
    origin: Origin,
    meta: Metadata,
}

#[derive(Clone, Debug)]
enum Origin {
    File {
        path: PathBuf,
    },
    Archive {
        archive: Arc<Archive>,
        entry: String,
    },
    Image {
        image: Arc<dyn ImageFileSystem>,
        path: ImagePath,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Metadata {
    exists: bool,
    is_dir: bool,
    last_modified: Option<SystemTime>,
    len: u64,
}

impl Metadata {
    const MISSING: Metadata = Metadata {
        exists: false,
        is_dir: false,
        last_modified: None,
        len: 0,
    };
}

impl FileResource {
    /// A plain file or directory. A missing path yields a resource whose
    /// [`exists`](Self::exists) is `false`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => Metadata {
                exists: true,
                is_dir: meta.is_dir(),
                last_modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(_) => Metadata::MISSING,
        };
        Self {
            origin: Origin::File { path },
            meta,
        }
    }

    /// An entry of an opened archive. Archive-backed resources only exist for
    /// records found in the index, so they always exist.
    pub fn from_archive_entry(archive: Arc<Archive>, record: &ArchiveRecord) -> Self {
        Self {
            meta: Metadata {
                exists: true,
                is_dir: record.is_dir(),
                last_modified: record.last_modified(),
                len: record.size(),
            },
            origin: Origin::Archive {
                archive,
                entry: record.name().to_owned(),
            },
        }
    }

    pub fn from_image(image: Arc<dyn ImageFileSystem>, path: ImagePath) -> Self {
        let meta = match image.metadata(&path) {
            Ok(meta) => Metadata {
                exists: true,
                is_dir: meta.is_dir,
                last_modified: meta.modified,
                len: meta.len,
            },
            Err(_) => Metadata::MISSING,
        };
        Self {
            origin: Origin::Image { image, path },
            meta,
        }
    }

    pub fn exists(&self) -> bool {
        self.meta.exists
    }

    pub fn is_directory(&self) -> bool {
        self.meta.is_dir
    }

    /// Last modification time; the UNIX epoch when unknown.
    pub fn last_modified(&self) -> SystemTime {
        self.meta.last_modified.unwrap_or(UNIX_EPOCH)
    }

    /// Length in bytes (uncompressed size for archive entries).
    pub fn length(&self) -> u64 {
        self.meta.len
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.origin, Origin::Archive { .. })
    }

    /// Base name (`Foo.class`).
    pub fn name(&self) -> String {
        match &self.origin {
            Origin::File { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            Origin::Archive { entry, .. } => {
                let entry = entry.trim_end_matches('/');
                entry.rsplit('/').next().unwrap_or(entry).to_owned()
            }
            Origin::Image { path, .. } => path.file_name().unwrap_or_default().to_owned(),
        }
    }

    /// Display path: the file path, `archive.jar(entry/name)`, or
    /// `jrt:/modules/...`.
    pub fn path(&self) -> String {
        match &self.origin {
            Origin::File { path } => path.display().to_string(),
            Origin::Archive { archive, entry } => {
                format!("{}({entry})", archive.path().display())
            }
            Origin::Image { path, .. } => format!("{IMAGE_SCHEME}{path}"),
        }
    }

    /// Fully qualified display form. Plain files are canonicalized when
    /// possible.
    pub fn absolute_path(&self) -> String {
        match &self.origin {
            Origin::File { path } => absolutize(path).display().to_string(),
            Origin::Archive { archive, entry } => {
                format!("{}({entry})", absolutize(archive.path()).display())
            }
            Origin::Image { .. } => self.path(),
        }
    }

    /// On-disk path of a plain-file resource.
    pub fn local_path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File { path } => Some(path),
            _ => None,
        }
    }

    /// Archive and entry name of an archive-backed resource.
    pub fn archive_entry(&self) -> Option<(&Path, &str)> {
        match &self.origin {
            Origin::Archive { archive, entry } => Some((archive.path(), entry)),
            _ => None,
        }
    }

    /// Open a byte stream over the resource.
    pub fn open_input(&self) -> Result<Box<dyn Read + Send>, ClasspathError> {
        if self.meta.is_dir {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", self.path()),
            )
            .into());
        }

        match &self.origin {
            Origin::File { path } => Ok(Box::new(File::open(path)?)),
            Origin::Archive { archive, entry } => match archive.open_entry(entry) {
                Ok(reader) => Ok(Box::new(reader)),
                Err(ArchiveError::Closed { path }) => Err(ClasspathError::ArchiveClosed {
                    archive: path,
                    entry: entry.clone(),
                }),
                Err(ArchiveError::Io(err)) => Err(ClasspathError::Io(err)),
                Err(source) => Err(ClasspathError::Archive {
                    archive: archive.path().to_path_buf(),
                    entry: entry.clone(),
                    source,
                }),
            },
            Origin::Image { image, path } => Ok(image.open(path)?),
        }
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, ClasspathError> {
        let mut reader = self.open_input()?;
        let mut bytes = Vec::with_capacity(self.meta.len.min(MAX_PREALLOCATION) as usize);
        reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl fmt::Display for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn absolutize(path: &Path) -> PathBuf {
    dunce::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
