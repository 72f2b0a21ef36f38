use std::fmt;

use jpath_core::{rel_name, ClassName, PackageName, CLASS_EXTENSION, SOURCE_EXTENSION};

use crate::{FileResource, SearchPath};

/// One package seen through a binary and a source [`SearchPath`], which may be
/// the same path.
#[derive(Debug, Clone, Copy)]
pub struct PackageView<'a> {
    source_path: &'a SearchPath,
    binary_path: &'a SearchPath,
    package: &'a PackageName,
}

impl<'a> PackageView<'a> {
    /// Binary and source files share `path`.
    pub fn new(path: &'a SearchPath, package: &'a PackageName) -> Self {
        Self::with_paths(path, path, package)
    }

    pub fn with_paths(
        source_path: &'a SearchPath,
        binary_path: &'a SearchPath,
        package: &'a PackageName,
    ) -> Self {
        Self {
            source_path,
            binary_path,
            package,
        }
    }

    pub fn package(&self) -> &PackageName {
        self.package
    }

    /// A class exists when its class file resolves. Top-level classes also
    /// exist when only their source file does.
    pub fn class_exists(&self, class: &ClassName) -> bool {
        if self.binary_file(class).is_some() {
            return true;
        }
        !class.is_nested() && self.source_file(class).is_some()
    }

    /// Whether the package is on either path. Archives often omit directory
    /// records, so a package with at least one class or source file counts too.
    pub fn exists(&self) -> bool {
        let dir = self.package.dir_path();
        if self.binary_path.find_directory(&dir).is_some() {
            return true;
        }
        if !self.shares_paths() && self.source_path.find_directory(&dir).is_some() {
            return true;
        }

        self.binary_path.has_files(&dir, CLASS_EXTENSION)
            || self.source_path.has_files(&dir, SOURCE_EXTENSION)
    }

    /// `T$Inner.class` for nested names.
    pub fn binary_file(&self, class: &ClassName) -> Option<FileResource> {
        let file_name = format!("{}{CLASS_EXTENSION}", class.mangled_simple_name());
        self.binary_path.find_file(&self.file_in_package(&file_name))
    }

    /// Nested classes live in the source file of their outermost class.
    pub fn source_file(&self, class: &ClassName) -> Option<FileResource> {
        let top_level = class.top_level();
        self.source_file_named(&format!(
            "{}{SOURCE_EXTENSION}",
            top_level.mangled_simple_name()
        ))
    }

    /// A `.java` file in this package by file name; other names resolve to
    /// nothing.
    pub fn source_file_named(&self, file_name: &str) -> Option<FileResource> {
        if !file_name.ends_with(SOURCE_EXTENSION) {
            return None;
        }
        self.source_path.find_file(&self.file_in_package(file_name))
    }

    pub fn source_files(&self) -> Vec<FileResource> {
        self.source_path
            .list_files(&self.package.dir_path(), SOURCE_EXTENSION)
    }

    pub fn binary_files(&self) -> Vec<FileResource> {
        self.binary_path
            .list_files(&self.package.dir_path(), CLASS_EXTENSION)
    }

    fn shares_paths(&self) -> bool {
        std::ptr::eq(self.source_path, self.binary_path)
    }

    fn file_in_package(&self, file_name: &str) -> String {
        rel_name::join(&self.package.dir_path(), file_name)
    }
}

impl fmt::Display for PackageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_unnamed() {
            f.write_str("unnamed package")
        } else {
            write!(f, "package {}", self.package.dir_path())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_package() {
        let path = SearchPath::from_segments::<&str>(&[], None);
        let unnamed = PackageName::unnamed();
        let named = PackageName::new("a.b");

        assert_eq!(PackageView::new(&path, &unnamed).to_string(), "unnamed package");
        assert_eq!(PackageView::new(&path, &named).to_string(), "package a/b");
    }

    #[test]
    fn source_lookup_by_file_name_requires_java_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("t")).unwrap();
        std::fs::write(dir.path().join("t/T.java"), b"class T {}").unwrap();
        std::fs::write(dir.path().join("t/T.txt"), b"notes").unwrap();

        let path = SearchPath::from_segments(&[dir.path().to_str().unwrap()], None);
        let package = PackageName::new("t");
        let view = PackageView::new(&path, &package);

        assert!(view.source_file_named("T.java").is_some());
        assert!(view.source_file_named("T.txt").is_none());
    }
}
