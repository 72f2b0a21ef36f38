use std::sync::Arc;

use jpath_archive::{Archive, ArchiveEntry as ArchiveRecord};
use jpath_core::rel_name;

use crate::FileResource;

/// A class-path zip or jar. Lookups go straight to the archive index.
#[derive(Debug)]
pub struct ArchiveEntry {
    archive: Arc<Archive>,
}

impl ArchiveEntry {
    pub fn new(archive: Archive) -> Self {
        Self {
            archive: Arc::new(archive),
        }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub(crate) fn resolve(
        &self,
        name: &str,
        _subdir: &str,
        _base_name: &str,
        _is_directory: bool,
    ) -> Option<FileResource> {
        let name = rel_name::normalize(name);
        let record = self.archive.entry(&name)?;
        Some(FileResource::from_archive_entry(
            Arc::clone(&self.archive),
            record,
        ))
    }

    /// One pass over every record, keeping files directly inside `package`.
    pub(crate) fn enumerate(&self, package: &str, extension: &str) -> Vec<(String, FileResource)> {
        let package = rel_name::dir_key(package);
        self.archive
            .entries()
            .filter(|record| is_package_file(record, package, extension))
            .map(|record| {
                (
                    record.name().to_owned(),
                    FileResource::from_archive_entry(Arc::clone(&self.archive), record),
                )
            })
            .collect()
    }

    /// Stops at the first matching record.
    pub(crate) fn has_files(&self, package: &str, extension: &str) -> bool {
        let package = rel_name::dir_key(package);
        self.archive
            .entries()
            .any(|record| is_package_file(record, package, extension))
    }

    pub(crate) fn release(self) {
        if !self.archive.close() {
            tracing::debug!(
                target = "jpath.classpath",
                path = %self.archive.path().display(),
                "archive was already closed"
            );
        }
    }
}

fn is_package_file(record: &ArchiveRecord, package: &str, extension: &str) -> bool {
    !record.is_dir()
        && record.name().ends_with(extension)
        && rel_name::dir_key(rel_name::split(record.name()).0) == package
}
