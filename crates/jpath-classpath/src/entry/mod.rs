//! The locations a [`SearchPath`](crate::SearchPath) is made of.

mod archive;
mod dir;
mod image;

use std::fmt;

pub use archive::ArchiveEntry;
pub use dir::DirEntry;
pub use image::ImageEntry;

use crate::FileResource;

/// One location searched for named resources.
///
/// Every variant answers the same three requests: resolve a single name,
/// enumerate a package by extension, and release its handles.
#[derive(Debug)]
pub enum PathEntry {
    Dir(DirEntry),
    Archive(ArchiveEntry),
    Image(ImageEntry),
}

impl PathEntry {
    /// Resolve one relative name.
    ///
    /// `name` is the normalized relative name, `subdir` its directory part
    /// (with trailing `/`) and `base_name` the final component. For directory
    /// queries `name` and `subdir` are both the directory with a trailing `/`
    /// and `base_name` is empty. Returns `None` on a miss.
    pub fn resolve(
        &self,
        name: &str,
        subdir: &str,
        base_name: &str,
        is_directory: bool,
    ) -> Option<FileResource> {
        match self {
            PathEntry::Dir(entry) => entry.resolve(name, subdir, base_name, is_directory),
            PathEntry::Archive(entry) => entry.resolve(name, subdir, base_name, is_directory),
            PathEntry::Image(entry) => entry.resolve(name, subdir, base_name, is_directory),
        }
    }

    /// Files directly inside `package` whose name ends with `extension`,
    /// keyed by relative name (`com/x/Foo.class`).
    pub fn enumerate(&self, package: &str, extension: &str) -> Vec<(String, FileResource)> {
        match self {
            PathEntry::Dir(entry) => entry.enumerate(package, extension),
            PathEntry::Archive(entry) => entry.enumerate(package, extension),
            PathEntry::Image(entry) => entry.enumerate(package, extension),
        }
    }

    /// Whether [`enumerate`](Self::enumerate) would return anything. Stops
    /// at the first match and builds no resources.
    pub fn has_files(&self, package: &str, extension: &str) -> bool {
        match self {
            PathEntry::Dir(entry) => entry.has_files(package, extension),
            PathEntry::Archive(entry) => entry.has_files(package, extension),
            PathEntry::Image(entry) => entry.has_files(package, extension),
        }
    }

    pub fn release(self) {
        match self {
            PathEntry::Dir(entry) => entry.release(),
            PathEntry::Archive(entry) => entry.release(),
            PathEntry::Image(entry) => entry.release(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PathEntry::Dir(_) => "dir",
            PathEntry::Archive(_) => "archive",
            PathEntry::Image(_) => "image",
        }
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathEntry::Dir(entry) => write!(f, "{}", entry.dir().display()),
            PathEntry::Archive(entry) => write!(f, "{}", entry.archive().path().display()),
            PathEntry::Image(_) => write!(f, "{}/", jpath_image::IMAGE_SCHEME),
        }
    }
}
