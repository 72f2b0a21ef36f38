//! Class path resolution.
//!
//! A [`SearchPath`] turns a class path string into an ordered list of
//! [`PathEntry`] locations (directories, zip/jar archives and, last, a runtime
//! image) and resolves relative names such as `com/example/Foo.class` against
//! them. The first entry that has a name wins. A miss is `None`, never an
//! error; only reading the bytes of a resolved [`FileResource`] can fail.
//!
//! [`PackageView`] layers class-name lookups for one package on top of a
//! binary and a source path.

mod error;
pub mod entry;
mod package;
mod resource;
mod search_path;

pub use crate::entry::PathEntry;
pub use crate::error::ClasspathError;
pub use crate::package::PackageView;
pub use crate::resource::FileResource;
pub use crate::search_path::{SearchPath, PATH_SEPARATOR};
