use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::fs::{ImageFileSystem, LocalImage};
use crate::jmod::JmodImage;

#[derive(Debug, Error)]
pub enum ImageDiscoveryError {
    #[error("could not discover a runtime image (tried the configured home, JAVA_HOME and `java` on PATH)")]
    NotFound,

    #[error("`{root}` is neither a runtime image tree (packages/ + modules/) nor a JDK root with `jmods/`")]
    InvalidRoot { root: PathBuf },

    #[error("failed to open runtime image at `{root}`: {source}")]
    Io {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Entry points for obtaining an [`ImageFileSystem`].
pub struct RuntimeImage;

impl RuntimeImage {
    /// Open the image rooted at `root`.
    ///
    /// `root` is either a tree with `packages/` and `modules/` directories, or a
    /// JDK installation containing `jmods/`.
    pub fn open(root: impl AsRef<Path>) -> Result<Arc<dyn ImageFileSystem>, ImageDiscoveryError> {
        let root = root.as_ref();
        if LocalImage::looks_like_image(root) {
            return Ok(Arc::new(LocalImage::new(root)));
        }

        let jmods_dir = root.join("jmods");
        if jmods_dir.is_dir() {
            let image = JmodImage::open(&jmods_dir).map_err(|source| ImageDiscoveryError::Io {
                root: root.to_path_buf(),
                source,
            })?;
            return Ok(Arc::new(image));
        }

        Err(ImageDiscoveryError::InvalidRoot {
            root: root.to_path_buf(),
        })
    }

    /// Discover a runtime image.
    ///
    /// When `home` is set it is used as an explicit override. Otherwise
    /// discovery sources are tried in this order:
    /// 1. `JAVA_HOME`
    /// 2. `java` on `PATH` (symlinks resolved to the installation root)
    pub fn discover(home: Option<&Path>) -> Result<Arc<dyn ImageFileSystem>, ImageDiscoveryError> {
        if let Some(home) = home {
            let candidate = coerce_to_image_root(home.to_path_buf()).unwrap_or_else(|| home.to_path_buf());
            return Self::open(candidate);
        }

        let discovered = discover_from_java_home()
            .and_then(|root| open_best_effort(&root))
            .or_else(|| discover_from_java_on_path().and_then(|root| open_best_effort(&root)));

        discovered.ok_or(ImageDiscoveryError::NotFound)
    }
}

fn open_best_effort(root: &Path) -> Option<Arc<dyn ImageFileSystem>> {
    match RuntimeImage::open(root) {
        Ok(image) => Some(image),
        Err(err) => {
            tracing::debug!(
                target = "jpath.image",
                root = %root.display(),
                error = %err,
                "ignoring runtime image candidate"
            );
            None
        }
    }
}

fn discover_from_java_home() -> Option<PathBuf> {
    std::env::var_os("JAVA_HOME")
        .map(PathBuf::from)
        .and_then(coerce_to_image_root)
}

fn discover_from_java_on_path() -> Option<PathBuf> {
    let java_bin = find_java_on_path()?;
    let java_bin = java_bin.canonicalize().ok()?;
    let root = java_bin.parent()?.parent()?.to_path_buf();
    coerce_to_image_root(root)
}

fn find_java_on_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let exe_name = if cfg!(windows) { "java.exe" } else { "java" };

    std::env::split_paths(&path_var)
        .map(|dir| dir.join(exe_name))
        .find(|candidate| candidate.is_file())
}

fn coerce_to_image_root(mut candidate: PathBuf) -> Option<PathBuf> {
    let is_root = |p: &Path| LocalImage::looks_like_image(p) || p.join("jmods").is_dir();

    if is_root(&candidate) {
        return Some(candidate);
    }

    // `java.home` may point at `$JDK/jre` on older layouts.
    candidate.pop();
    if is_root(&candidate) {
        return Some(candidate);
    }

    None
}
