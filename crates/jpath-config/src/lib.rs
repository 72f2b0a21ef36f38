//! Configuration for jpath tools.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//!
//! [classpath]
//! class_path = "build/classes:lib/dep.jar"
//! source_path = "src/main/java"
//!
//! [classpath.image]
//! enabled = true
//! home = "/usr/lib/jvm/java-21"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jpath_classpath::SearchPath;
use jpath_image::{ImageFileSystem, RuntimeImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, LoggingConfig};

/// Environment variable naming an explicit config file (absolute, or relative
/// to the workspace root).
pub const JPATH_CONFIG_ENV_VAR: &str = "JPATH_CONFIG";

/// Consulted when the config does not set a class path.
pub const CLASSPATH_ENV_VAR: &str = "CLASSPATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JpathConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classpath: ClasspathConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClasspathConfig {
    /// Binary class path, separated like the platform's `CLASSPATH`.
    #[serde(default)]
    pub class_path: Option<String>,

    /// Source path. When unset, sources are looked up on the class path.
    #[serde(default)]
    pub source_path: Option<String>,

    #[serde(default)]
    pub image: ImageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Append the runtime image to the class path.
    #[serde(default = "ImageConfig::default_enabled")]
    pub enabled: bool,

    /// JDK home or runtime image root. When unset, `JAVA_HOME` and then `java`
    /// on `PATH` are used.
    #[serde(default, alias = "java_home")]
    pub home: Option<PathBuf>,
}

impl ImageConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            home: None,
        }
    }
}

impl ClasspathConfig {
    /// The configured class path, else `CLASSPATH`, else the current
    /// directory.
    pub fn effective_class_path(&self) -> String {
        if let Some(path) = &self.class_path {
            return path.clone();
        }
        std::env::var(CLASSPATH_ENV_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| ".".to_owned())
    }

    /// Discover the runtime image, if enabled. Discovery failures are logged
    /// and leave the class path without an image.
    pub fn open_image(&self) -> Option<Arc<dyn ImageFileSystem>> {
        if !self.image.enabled {
            return None;
        }

        match RuntimeImage::discover(self.image.home.as_deref()) {
            Ok(image) => Some(image),
            Err(err) => {
                tracing::warn!(
                    target = "jpath.config",
                    error = %err,
                    "runtime image unavailable; continuing without it"
                );
                None
            }
        }
    }

    /// Build the binary and source search paths.
    ///
    /// The source path is `None` when it is not configured separately; callers
    /// then search sources on the binary path.
    pub fn search_paths(&self) -> SearchPaths {
        let binary = SearchPath::new(&self.effective_class_path(), self.open_image());
        let source = self
            .source_path
            .as_deref()
            .map(|path| SearchPath::new(path, None));
        SearchPaths { binary, source }
    }
}

/// Search paths built from a [`ClasspathConfig`].
#[derive(Debug)]
pub struct SearchPaths {
    pub binary: SearchPath,
    pub source: Option<SearchPath>,
}

impl SearchPaths {
    pub fn source(&self) -> &SearchPath {
        self.source.as_ref().unwrap_or(&self.binary)
    }

    pub fn close(self) {
        if let Some(source) = self.source {
            source.close();
        }
        self.binary.close();
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message without the source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl JpathConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Discover the config file for a workspace root.
///
/// Search order:
/// 1) `JPATH_CONFIG` (absolute or relative to `workspace_root`)
/// 2) `jpath.toml` in `workspace_root`
/// 3) `.jpath.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(JPATH_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["jpath.toml", ".jpath.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the config for a workspace root. Without a config file this is
/// [`JpathConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(JpathConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((JpathConfig::default(), None));
    };

    let config = JpathConfig::load_from_path(&path)?;
    tracing::debug!(target = "jpath.config", path = %path.display(), "loaded config");
    Ok((config, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = JpathConfig::load_from_str("").unwrap();
        assert_eq!(config, JpathConfig::default());
        assert!(config.classpath.image.enabled);
        assert!(config.classpath.class_path.is_none());
    }

    #[test]
    fn parses_every_section() {
        let config = JpathConfig::load_from_str(
            r#"
            [logging]
            level = "debug"
            json = true

            [classpath]
            class_path = "out:lib/a.jar"
            source_path = "src"

            [classpath.image]
            enabled = false
            java_home = "/opt/jdk"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.classpath.class_path.as_deref(), Some("out:lib/a.jar"));
        assert_eq!(config.classpath.source_path.as_deref(), Some("src"));
        assert!(!config.classpath.image.enabled);
        assert_eq!(config.classpath.image.home, Some(PathBuf::from("/opt/jdk")));
        assert_eq!(config.classpath.effective_class_path(), "out:lib/a.jar");
        assert!(config.classpath.open_image().is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = JpathConfig::load_from_str("[classpath]\nclasspath = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }
}
