use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use jpath_core::rel_name;

use crate::path::ImagePath;

/// Stat-like metadata for an image path. Symbolic links are followed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageMetadata {
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Read-only view of a runtime image.
///
/// The trait is intentionally small so it can be backed by an on-disk tree, a
/// set of `.jmod` archives, or a fake in tests.
pub trait ImageFileSystem: Send + Sync + fmt::Debug {
    /// Returns whether `path` is a directory, following symbolic links.
    fn is_dir(&self, path: &ImagePath) -> bool;

    fn is_symlink(&self, path: &ImagePath) -> bool;

    /// Returns the target of the symbolic link at `path`, resolved to an
    /// absolute image path.
    fn read_link(&self, path: &ImagePath) -> io::Result<ImagePath>;

    /// Lists the children of a directory, sorted by name.
    fn read_dir(&self, path: &ImagePath) -> io::Result<Vec<ImagePath>>;

    fn metadata(&self, path: &ImagePath) -> io::Result<ImageMetadata>;

    fn open(&self, path: &ImagePath) -> io::Result<Box<dyn Read + Send>>;

    fn exists(&self, path: &ImagePath) -> bool {
        self.metadata(path).is_ok()
    }
}

/// An image laid out on the local filesystem under `root`, with
/// `packages/<dotted>/<module>` symbolic links into `modules/<module>`.
#[derive(Debug, Clone)]
pub struct LocalImage {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

impl LocalImage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let canonical_root = fs::canonicalize(&root).ok();
        Self {
            root,
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `root` has the `packages/` + `modules/` shape.
    pub fn looks_like_image(root: &Path) -> bool {
        root.join("packages").is_dir() && root.join("modules").is_dir()
    }

    fn local_path(&self, path: &ImagePath) -> PathBuf {
        rel_name::to_path(&self.root, path.as_str())
    }

    /// Map an absolute on-disk link target back into the image.
    fn image_path_of(&self, target: &Path) -> Option<ImagePath> {
        let roots = std::iter::once(self.root.as_path()).chain(self.canonical_root.as_deref());
        for root in roots {
            if let Ok(rest) = target.strip_prefix(root) {
                return Some(ImagePath::new(&path_to_image_str(rest)?));
            }
        }
        None
    }
}

fn path_to_image_str(path: &Path) -> Option<String> {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                out.push('/');
                out.push_str(segment.to_str()?);
            }
            Component::ParentDir => out.push_str("/.."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Some(out)
}

impl ImageFileSystem for LocalImage {
    fn is_dir(&self, path: &ImagePath) -> bool {
        self.local_path(path).is_dir()
    }

    fn is_symlink(&self, path: &ImagePath) -> bool {
        fs::symlink_metadata(self.local_path(path))
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn read_link(&self, path: &ImagePath) -> io::Result<ImagePath> {
        let target = fs::read_link(self.local_path(path))?;
        if target.is_absolute() {
            return self.image_path_of(&target).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("link {path} points outside the image ({})", target.display()),
                )
            });
        }

        let rel = path_to_image_str(&target).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("link {path} has a non UTF-8 target"),
            )
        })?;
        let base = path.parent().unwrap_or_else(ImagePath::root);
        Ok(base.join(rel.trim_start_matches('/')))
    }

    fn read_dir(&self, path: &ImagePath) -> io::Result<Vec<ImagePath>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.local_path(path))? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            out.push(path.join(&name));
        }
        out.sort();
        Ok(out)
    }

    fn metadata(&self, path: &ImagePath) -> io::Result<ImageMetadata> {
        let meta = fs::metadata(self.local_path(path))?;
        Ok(ImageMetadata {
            is_dir: meta.is_dir(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    fn open(&self, path: &ImagePath) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(self.local_path(path))?;
        Ok(Box::new(file))
    }
}
