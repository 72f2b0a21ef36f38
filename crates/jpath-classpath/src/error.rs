use std::path::PathBuf;

use jpath_archive::ArchiveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive {} was closed before `{entry}` could be read", archive.display())]
    ArchiveClosed { archive: PathBuf, entry: String },

    #[error("failed to read `{entry}` from {}: {source}", archive.display())]
    Archive {
        archive: PathBuf,
        entry: String,
        #[source]
        source: ArchiveError,
    },
}
