use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use jpath_core::{rel_name, CLASS_EXTENSION};
use jpath_image::{ImageFileSystem, ImagePath};

use crate::FileResource;

/// The runtime image, searched through its `/packages/<dotted>/<module>`
/// links.
#[derive(Debug)]
pub struct ImageEntry {
    image: Arc<dyn ImageFileSystem>,
    /// Package (`java/lang`) -> package directory inside its module, or `None`
    /// when no module defines a class in it.
    package_dirs: Mutex<HashMap<String, Option<ImagePath>>>,
}

impl ImageEntry {
    pub fn new(image: Arc<dyn ImageFileSystem>) -> Self {
        Self {
            image,
            package_dirs: Mutex::new(HashMap::new()),
        }
    }

    pub fn image(&self) -> &Arc<dyn ImageFileSystem> {
        &self.image
    }

    pub(crate) fn resolve(
        &self,
        _name: &str,
        subdir: &str,
        base_name: &str,
        is_directory: bool,
    ) -> Option<FileResource> {
        let package_dir = self.resolve_package_dir(rel_name::dir_key(subdir))?;
        if is_directory {
            return Some(FileResource::from_image(
                Arc::clone(&self.image),
                package_dir,
            ));
        }

        let path = package_dir.join(base_name);
        self.image
            .exists(&path)
            .then(|| FileResource::from_image(Arc::clone(&self.image), path))
    }

    pub(crate) fn enumerate(&self, package: &str, extension: &str) -> Vec<(String, FileResource)> {
        let package = rel_name::dir_key(package);
        self.package_children(package)
            .into_iter()
            .filter_map(|child| {
                let file_name = child.file_name()?.to_owned();
                if !file_name.ends_with(extension) {
                    return None;
                }
                let resource = FileResource::from_image(Arc::clone(&self.image), child);
                Some((rel_name::join(package, &file_name), resource))
            })
            .collect()
    }

    /// Whether `package` has a file ending with `extension`, without reading
    /// any file metadata.
    pub(crate) fn has_files(&self, package: &str, extension: &str) -> bool {
        self.package_children(rel_name::dir_key(package))
            .iter()
            .any(|child| child.file_name().is_some_and(|name| name.ends_with(extension)))
    }

    fn package_children(&self, package: &str) -> Vec<ImagePath> {
        let Some(package_dir) = self.resolve_package_dir(package) else {
            return Vec::new();
        };

        match self.image.read_dir(&package_dir) {
            Ok(children) => children,
            Err(err) => {
                tracing::debug!(
                    target = "jpath.classpath",
                    dir = %package_dir,
                    error = %err,
                    "failed to list runtime image package"
                );
                Vec::new()
            }
        }
    }

    pub(crate) fn release(self) {
        self.package_dirs.lock().expect("mutex poisoned").clear();
    }

    /// Memoized package lookup; misses are cached too.
    pub fn resolve_package_dir(&self, package: &str) -> Option<ImagePath> {
        let mut package_dirs = self.package_dirs.lock().expect("mutex poisoned");
        if let Some(cached) = package_dirs.get(package) {
            return cached.clone();
        }

        let resolved = self.find_package_dir(package);
        package_dirs.insert(package.to_owned(), resolved.clone());
        resolved
    }

    /// The first module linked from `/packages/<dotted>` whose package
    /// directory holds at least one class file. Ties follow `read_dir` order.
    fn find_package_dir(&self, package: &str) -> Option<ImagePath> {
        // Classes in the unnamed package never come from the image.
        if package.is_empty() {
            return None;
        }

        let links_dir = ImagePath::new("/packages").join(&package.replace('/', "."));
        if !self.image.is_dir(&links_dir) {
            return None;
        }
        let links = self.image.read_dir(&links_dir).ok()?;

        for link in links {
            if !self.image.is_symlink(&link) {
                continue;
            }
            let module_root = match self.image.read_link(&link) {
                Ok(target) => target,
                Err(err) => {
                    tracing::debug!(
                        target = "jpath.classpath",
                        link = %link,
                        error = %err,
                        "failed to read runtime image package link"
                    );
                    continue;
                }
            };

            let package_dir = module_root.join(package);
            if !self.image.is_dir(&package_dir) {
                continue;
            }
            let has_class = self
                .image
                .read_dir(&package_dir)
                .map(|children| {
                    children
                        .iter()
                        .any(|child| child.as_str().ends_with(CLASS_EXTENSION))
                })
                .unwrap_or(false);
            if has_class {
                return Some(package_dir);
            }
        }

        None
    }
}
