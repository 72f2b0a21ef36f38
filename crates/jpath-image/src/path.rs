use std::fmt;

/// An absolute, `/`-separated path inside a runtime image.
///
/// Paths are normalized lexically: `.` segments are dropped and `..` never
/// climbs above the root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImagePath(String);

impl ImagePath {
    pub fn root() -> Self {
        Self("/".to_owned())
    }

    pub fn new(path: &str) -> Self {
        Self::root().join(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Resolve `rel` against this path. An absolute `rel` replaces it.
    pub fn join(&self, rel: &str) -> Self {
        let mut segments: Vec<&str> = if rel.starts_with('/') {
            Vec::new()
        } else {
            self.components().collect()
        };

        for segment in rel.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }

        Self(format!("/{}", segments.join("/")))
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            Some(Self::root())
        } else {
            Some(Self(self.0[..idx].to_owned()))
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.components().last()
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_segments() {
        assert_eq!(ImagePath::new("packages/java.lang/").as_str(), "/packages/java.lang");
        assert_eq!(ImagePath::new("/a/./b/../c").as_str(), "/a/c");
        assert_eq!(ImagePath::new("../../x").as_str(), "/x");
        assert!(ImagePath::new("").is_root());
    }

    #[test]
    fn joins_relative_and_absolute() {
        let link_dir = ImagePath::new("/packages/java.lang");
        assert_eq!(
            link_dir.join("../../modules/java.base").as_str(),
            "/modules/java.base"
        );
        assert_eq!(link_dir.join("/modules/java.base").as_str(), "/modules/java.base");
        assert_eq!(
            ImagePath::new("/modules/java.base").join("java/lang").as_str(),
            "/modules/java.base/java/lang"
        );
    }

    #[test]
    fn parent_and_file_name() {
        let path = ImagePath::new("/modules/java.base/java/lang/Object.class");
        assert_eq!(path.file_name(), Some("Object.class"));
        assert_eq!(path.parent().unwrap().as_str(), "/modules/java.base/java/lang");
        assert_eq!(ImagePath::new("/modules").parent(), Some(ImagePath::root()));
        assert_eq!(ImagePath::root().parent(), None);
        assert_eq!(ImagePath::root().file_name(), None);
    }
}
