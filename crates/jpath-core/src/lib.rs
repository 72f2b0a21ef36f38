//! Core shared types for jpath.
//!
//! This crate is intentionally small and has no dependencies. It holds the
//! class/package name model and the helpers that turn names into relative
//! resource names (`com/example/Foo.class`).

mod name;
pub mod rel_name;

pub use name::{ClassName, PackageName, NESTED_SEPARATOR};

/// Extension of compiled class files, including the dot.
pub const CLASS_EXTENSION: &str = ".class";

/// Extension of Java source files, including the dot.
pub const SOURCE_EXTENSION: &str = ".java";
