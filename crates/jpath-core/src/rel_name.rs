//! Relative resource names (`com/example/Foo.class`).
//!
//! Callers may pass names using either `/` or the platform directory
//! separator. Internally every name, cache key and archive lookup uses `/`.

use std::borrow::Cow;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

pub const SEPARATOR: char = '/';

/// Rewrite platform separators to `/` and drop leading separators.
pub fn normalize(name: &str) -> Cow<'_, str> {
    let trimmed = name.trim_start_matches([SEPARATOR, MAIN_SEPARATOR]);
    if MAIN_SEPARATOR != SEPARATOR && trimmed.contains(MAIN_SEPARATOR) {
        Cow::Owned(trimmed.replace(MAIN_SEPARATOR, "/"))
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Split a normalized name into its directory part (with the trailing `/`,
/// empty at the root) and its base name.
pub fn split(name: &str) -> (&str, &str) {
    match name.rfind(SEPARATOR) {
        Some(idx) => (&name[..idx + 1], &name[idx + 1..]),
        None => ("", name),
    }
}

/// Cache key for a directory: the normalized name without trailing `/`.
pub fn dir_key(dir: &str) -> &str {
    dir.trim_end_matches(SEPARATOR)
}

/// Ensure a non-empty directory name ends with `/`.
///
/// Zip archives store directory entries as `foo/`, never `foo`.
pub fn as_dir(name: &str) -> Cow<'_, str> {
    if name.is_empty() || name.ends_with(SEPARATOR) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}{SEPARATOR}"))
    }
}

/// Join a package directory and a file name.
pub fn join(dir: &str, file_name: &str) -> String {
    let dir = dir_key(dir);
    if dir.is_empty() {
        file_name.to_owned()
    } else {
        format!("{dir}{SEPARATOR}{file_name}")
    }
}

/// Resolve a normalized relative name against a filesystem root.
pub fn to_path(root: &Path, name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in name.split(SEPARATOR).filter(|c| !c.is_empty()) {
        path.push(component);
    }
    path
}
