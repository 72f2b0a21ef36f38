use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use jpath_archive::Archive;

use crate::fs::{ImageFileSystem, ImageMetadata};
use crate::path::ImagePath;

/// JMODs place class files (and `module-info.class`) under `classes/`.
const CLASSES_PREFIX: &str = "classes/";

/// A runtime image synthesized from the `.jmod` files of a JDK.
///
/// Every module's `classes/` subtree is mounted at `/modules/<module>`, and
/// `/packages/<dotted>/<module>` links are generated for each package that
/// holds at least one class file.
#[derive(Debug)]
pub struct JmodImage {
    jmods_dir: PathBuf,
    modules: BTreeMap<String, JmodModule>,
    packages: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug)]
struct JmodModule {
    archive: Archive,
    /// Module-relative file name -> archive entry name.
    files: BTreeMap<String, String>,
    /// Module-relative directory ("" for the module root) -> child names.
    dirs: BTreeMap<String, BTreeSet<String>>,
}

enum Node<'a> {
    Dir(Vec<String>),
    File { module: &'a JmodModule, entry: &'a str },
    Link(ImagePath),
}

impl JmodImage {
    /// Open every `*.jmod` in `jmods_dir`.
    ///
    /// Unreadable modules are skipped; an error is returned only when no module
    /// could be opened.
    pub fn open(jmods_dir: impl AsRef<Path>) -> io::Result<Self> {
        let jmods_dir = jmods_dir.as_ref().to_path_buf();
        let mut module_paths: Vec<PathBuf> = std::fs::read_dir(&jmods_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jmod"))
            .collect();
        module_paths.sort();

        let mut modules = BTreeMap::new();
        let mut packages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for path in module_paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
                continue;
            };
            let archive = match Archive::open(&path) {
                Ok(archive) => archive,
                Err(err) => {
                    tracing::warn!(
                        target = "jpath.image",
                        path = %path.display(),
                        error = %format!("{err:#}"),
                        "skipping unreadable jmod"
                    );
                    continue;
                }
            };

            let module = JmodModule::index(archive);
            for package in module.packages() {
                packages.entry(package).or_default().insert(name.clone());
            }
            modules.insert(name, module);
        }

        if modules.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no readable .jmod files in {}", jmods_dir.display()),
            ));
        }

        tracing::debug!(
            target = "jpath.image",
            jmods_dir = %jmods_dir.display(),
            modules = modules.len(),
            packages = packages.len(),
            "opened jmod runtime image"
        );

        Ok(Self {
            jmods_dir,
            modules,
            packages,
        })
    }

    pub fn jmods_dir(&self) -> &Path {
        &self.jmods_dir
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    fn lookup(&self, path: &ImagePath) -> Option<Node<'_>> {
        let components: Vec<&str> = path.components().collect();
        match components.as_slice() {
            [] => Some(Node::Dir(vec!["modules".to_owned(), "packages".to_owned()])),
            ["modules"] => Some(Node::Dir(self.modules.keys().cloned().collect())),
            ["modules", module, rest @ ..] => {
                let module = self.modules.get(*module)?;
                let rel = rest.join("/");
                if let Some(children) = module.dirs.get(&rel) {
                    return Some(Node::Dir(children.iter().cloned().collect()));
                }
                let entry = module.files.get(&rel)?;
                Some(Node::File { module, entry })
            }
            ["packages"] => Some(Node::Dir(self.packages.keys().cloned().collect())),
            ["packages", package] => {
                let modules = self.packages.get(*package)?;
                Some(Node::Dir(modules.iter().cloned().collect()))
            }
            ["packages", package, module] => {
                let modules = self.packages.get(*package)?;
                modules
                    .contains(*module)
                    .then(|| Node::Link(ImagePath::root().join("modules").join(module)))
            }
            _ => None,
        }
    }

    /// Like [`Self::lookup`] but follows a trailing link.
    fn resolve(&self, path: &ImagePath) -> Option<Node<'_>> {
        match self.lookup(path)? {
            Node::Link(target) => self.lookup(&target),
            node => Some(node),
        }
    }
}

impl JmodModule {
    fn index(archive: Archive) -> Self {
        let mut files = BTreeMap::new();
        let mut dirs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        dirs.insert(String::new(), BTreeSet::new());

        for entry in archive.entries() {
            let Some(rel) = entry.name().strip_prefix(CLASSES_PREFIX) else {
                continue;
            };
            let rel = rel.trim_end_matches('/');
            if rel.is_empty() {
                continue;
            }

            // Register every ancestor directory with its child.
            let mut parent = String::new();
            let segments: Vec<&str> = rel.split('/').collect();
            for (i, segment) in segments.iter().enumerate() {
                dirs.entry(parent.clone())
                    .or_default()
                    .insert((*segment).to_owned());
                let is_last = i + 1 == segments.len();
                if !is_last || entry.is_dir() {
                    parent = if parent.is_empty() {
                        (*segment).to_owned()
                    } else {
                        format!("{parent}/{segment}")
                    };
                    dirs.entry(parent.clone()).or_default();
                }
            }

            if !entry.is_dir() {
                files.insert(rel.to_owned(), entry.name().to_owned());
            }
        }

        Self {
            archive,
            files,
            dirs,
        }
    }

    /// Dotted names of packages holding at least one class file.
    fn packages(&self) -> BTreeSet<String> {
        self.files
            .keys()
            .filter(|name| name.ends_with(".class"))
            .filter_map(|name| name.rsplit_once('/').map(|(dir, _)| dir.replace('/', ".")))
            .collect()
    }
}

impl ImageFileSystem for JmodImage {
    fn is_dir(&self, path: &ImagePath) -> bool {
        matches!(self.resolve(path), Some(Node::Dir(_)))
    }

    fn is_symlink(&self, path: &ImagePath) -> bool {
        matches!(self.lookup(path), Some(Node::Link(_)))
    }

    fn read_link(&self, path: &ImagePath) -> io::Result<ImagePath> {
        match self.lookup(path) {
            Some(Node::Link(target)) => Ok(target),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is not a symbolic link"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &ImagePath) -> io::Result<Vec<ImagePath>> {
        match self.resolve(path) {
            Some(Node::Dir(children)) => Ok(children.iter().map(|name| path.join(name)).collect()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is not a directory"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn metadata(&self, path: &ImagePath) -> io::Result<ImageMetadata> {
        match self.resolve(path) {
            Some(Node::Dir(_)) => Ok(ImageMetadata {
                is_dir: true,
                len: 0,
                modified: None,
            }),
            Some(Node::File { module, entry }) => {
                let record = module.archive.entry(entry).ok_or_else(|| not_found(path))?;
                Ok(ImageMetadata {
                    is_dir: false,
                    len: record.size(),
                    modified: record.last_modified(),
                })
            }
            Some(Node::Link(_)) | None => Err(not_found(path)),
        }
    }

    fn open(&self, path: &ImagePath) -> io::Result<Box<dyn Read + Send>> {
        match self.resolve(path) {
            Some(Node::File { module, entry }) => {
                let reader = module
                    .archive
                    .open_entry(entry)
                    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
                Ok(Box::new(reader))
            }
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is not a file"),
            )),
            None => Err(not_found(path)),
        }
    }
}

fn not_found(path: &ImagePath) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path} not found in image"))
}
