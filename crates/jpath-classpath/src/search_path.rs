use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use jpath_archive::Archive;
use jpath_core::rel_name;
use jpath_image::ImageFileSystem;

use crate::entry::{ArchiveEntry, DirEntry, ImageEntry, PathEntry};
use crate::FileResource;

/// Separator between class path segments.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// An ordered list of [`PathEntry`] searched front to back.
///
/// Built once from a class path string (or explicit segments) and an optional
/// runtime image, which always comes last. Dropping a `SearchPath` without
/// calling [`SearchPath::close`] leaves archives to be closed when the last
/// resource referencing them goes away.
#[derive(Debug)]
pub struct SearchPath {
    path_str: String,
    entries: Vec<PathEntry>,
}

impl SearchPath {
    /// Split `path_str` on [`PATH_SEPARATOR`]. Empty segments, including the
    /// empty string itself, stand for the current directory.
    pub fn new(path_str: &str, image: Option<Arc<dyn ImageFileSystem>>) -> Self {
        let segments: Vec<&str> = path_str.split(PATH_SEPARATOR).collect();
        Self::build(path_str.to_owned(), &segments, image)
    }

    pub fn from_segments<S: AsRef<str>>(
        segments: &[S],
        image: Option<Arc<dyn ImageFileSystem>>,
    ) -> Self {
        let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        let separator = PATH_SEPARATOR.to_string();
        let path_str = segments.join(separator.as_str());
        Self::build(path_str, &segments, image)
    }

    fn build(path_str: String, segments: &[&str], image: Option<Arc<dyn ImageFileSystem>>) -> Self {
        let mut entries: Vec<PathEntry> = segments.iter().map(|seg| open_segment(seg)).collect();
        if let Some(image) = image {
            entries.push(PathEntry::Image(ImageEntry::new(image)));
        }

        tracing::debug!(
            target = "jpath.classpath",
            path = %path_str,
            entries = entries.len(),
            "built search path"
        );
        Self { path_str, entries }
    }

    /// First file named `name` (`com/x/Foo.class`) along the path.
    pub fn find_file(&self, name: &str) -> Option<FileResource> {
        self.find(name, false)
    }

    /// First directory named `name` (`com/x`) along the path.
    pub fn find_directory(&self, name: &str) -> Option<FileResource> {
        self.find(name, true)
    }

    fn find(&self, name: &str, is_directory: bool) -> Option<FileResource> {
        let name = rel_name::normalize(name);
        let name = if is_directory {
            rel_name::as_dir(&name).into_owned()
        } else {
            name.into_owned()
        };
        let (subdir, base_name) = if is_directory {
            (name.as_str(), "")
        } else {
            rel_name::split(&name)
        };

        self.entries
            .iter()
            .find_map(|entry| entry.resolve(&name, subdir, base_name, is_directory))
    }

    /// Every file directly inside `package` (`com/x`) ending with `extension`,
    /// deduplicated by relative name and sorted by it. When several entries
    /// provide the same name, the one earliest on the path is returned.
    pub fn list_files(&self, package: &str, extension: &str) -> Vec<FileResource> {
        let package = rel_name::normalize(package);
        let package = rel_name::dir_key(&package);

        let mut files = BTreeMap::new();
        for entry in self.entries.iter().rev() {
            files.extend(entry.enumerate(package, extension));
        }
        files.into_values().collect()
    }

    /// Whether at least one matching file exists in `package`.
    pub fn has_files(&self, package: &str, extension: &str) -> bool {
        let package = rel_name::normalize(package);
        let package = rel_name::dir_key(&package);
        self.entries
            .iter()
            .any(|entry| entry.has_files(package, extension))
    }

    /// Release every entry, last first.
    pub fn close(self) {
        tracing::debug!(target = "jpath.classpath", path = %self.path_str, "closing search path");
        for entry in self.entries.into_iter().rev() {
            entry.release();
        }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_str)
    }
}

fn open_segment(segment: &str) -> PathEntry {
    let segment = if segment.is_empty() { "." } else { segment };
    let path = Path::new(segment);

    if path.is_file() {
        match Archive::open(path) {
            Ok(archive) => return PathEntry::Archive(ArchiveEntry::new(archive)),
            Err(err) => {
                let error = format!("{err:#}");
                tracing::debug!(
                    target = "jpath.classpath",
                    path = %path.display(),
                    error = %error,
                    "not a readable archive; using it as a directory"
                );
            }
        }
    }

    PathEntry::Dir(DirEntry::new(path))
}
