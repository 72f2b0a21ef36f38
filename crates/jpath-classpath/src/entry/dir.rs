use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use jpath_core::rel_name;

use crate::FileResource;

/// Marks an existing directory with no children, so it is told apart from a
/// missing one (empty listing) without another stat.
const EMPTY_DIR_SENTINEL: &str = "";

/// A class-path directory.
///
/// Directory listings are computed once per subdirectory and kept for the
/// lifetime of the entry; later changes on disk are not observed.
#[derive(Debug)]
pub struct DirEntry {
    dir: PathBuf,
    listings: Mutex<HashMap<String, Arc<[String]>>>,
}

impl DirEntry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            listings: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn resolve(
        &self,
        name: &str,
        subdir: &str,
        base_name: &str,
        is_directory: bool,
    ) -> Option<FileResource> {
        let listing = self.listing(subdir);
        let found = if is_directory {
            !listing.is_empty()
        } else {
            // Names that could be packages are never queried as files, so a
            // listed name is taken to be a file without another stat.
            !base_name.is_empty() && listing.iter().any(|child| child == base_name)
        };

        found.then(|| FileResource::from_file(rel_name::to_path(&self.dir, name)))
    }

    pub(crate) fn enumerate(&self, package: &str, extension: &str) -> Vec<(String, FileResource)> {
        let listing = self.listing(package);
        listing
            .iter()
            .filter(|child| is_listed_file(child, extension))
            .map(|child| {
                let name = rel_name::join(package, child);
                let resource = FileResource::from_file(rel_name::to_path(&self.dir, &name));
                (name, resource)
            })
            .collect()
    }

    /// Whether `package` lists a name ending with `extension`; answered from
    /// the cached listing alone.
    pub(crate) fn has_files(&self, package: &str, extension: &str) -> bool {
        self.listing(package)
            .iter()
            .any(|child| is_listed_file(child, extension))
    }

    pub(crate) fn release(self) {}

    fn listing(&self, subdir: &str) -> Arc<[String]> {
        let key = rel_name::dir_key(subdir);
        let mut listings = self.listings.lock().expect("mutex poisoned");
        if let Some(listing) = listings.get(key) {
            return Arc::clone(listing);
        }

        let listing = self.compute_listing(key);
        listings.insert(key.to_owned(), Arc::clone(&listing));
        listing
    }

    fn compute_listing(&self, key: &str) -> Arc<[String]> {
        let path = rel_name::to_path(&self.dir, key);
        if !path.is_dir() {
            return Arc::from(Vec::new());
        }

        let mut names: Vec<String> = match std::fs::read_dir(&path) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
            Err(err) => {
                tracing::debug!(
                    target = "jpath.classpath",
                    path = %path.display(),
                    error = %err,
                    "failed to list class path directory; treating it as empty"
                );
                Vec::new()
            }
        };

        if names.is_empty() {
            names.push(EMPTY_DIR_SENTINEL.to_owned());
        }
        Arc::from(names)
    }
}

fn is_listed_file(child: &str, extension: &str) -> bool {
    child != EMPTY_DIR_SENTINEL && child.ends_with(extension)
}
