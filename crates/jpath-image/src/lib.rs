//! Runtime-image filesystems.
//!
//! A modular JDK exposes its platform classes through a `jrt:/`-style tree:
//!
//! ```text
//! /modules/<module>/<package dirs>/<Class>.class
//! /packages/<dotted.package>/<module>  -> /modules/<module>
//! ```
//!
//! [`ImageFileSystem`] is the capability the classpath layer consumes. Two
//! backends are provided: [`LocalImage`] for an on-disk tree with that shape,
//! and [`JmodImage`] which synthesizes the tree from a JDK's `jmods/`.

mod discovery;
mod fs;
mod jmod;
mod path;

pub use discovery::{ImageDiscoveryError, RuntimeImage};
pub use fs::{ImageFileSystem, ImageMetadata, LocalImage};
pub use jmod::JmodImage;
pub use path::ImagePath;

/// URI scheme used when displaying image paths.
pub const IMAGE_SCHEME: &str = "jrt:";
