use std::fmt;

/// Separator between an enclosing type and a nested type in binary names
/// (`Outer$Inner`).
pub const NESTED_SEPARATOR: char = '$';

/// A class name split into its package qualifier and its chain of nested
/// simple names, outermost first.
///
/// `a.b.Outer$Inner` has qualifier `a.b` and simple names `[Outer, Inner]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName {
    qualifier: String,
    names: Vec<String>,
}

impl ClassName {
    /// Parse a dotted (`a.b.C$D`) or internal (`a/b/C$D`) class name.
    ///
    /// Returns `None` for an empty name. A simple name with empty `$` segments
    /// (`$Proxy1`, `Foo$`) is kept as a single, non-nested name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().replace('/', ".");
        let (qualifier, simple) = match name.rsplit_once('.') {
            Some((qualifier, simple)) => (qualifier, simple),
            None => ("", name.as_str()),
        };
        if simple.is_empty() {
            return None;
        }

        let parts: Vec<&str> = simple.split(NESTED_SEPARATOR).collect();
        let names = if parts.iter().any(|part| part.is_empty()) {
            vec![simple.to_owned()]
        } else {
            parts.into_iter().map(str::to_owned).collect()
        };

        Some(Self {
            qualifier: qualifier.trim_matches('.').to_owned(),
            names,
        })
    }

    /// Build a name from an explicit qualifier and nested names.
    ///
    /// # Panics
    ///
    /// Panics if `names` is empty.
    pub fn nested(qualifier: impl Into<String>, names: Vec<String>) -> Self {
        assert!(!names.is_empty(), "a class name needs at least one simple name");
        Self {
            qualifier: qualifier.into(),
            names,
        }
    }

    /// Dotted package qualifier; empty for the unnamed package.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn package(&self) -> PackageName {
        PackageName::new(&self.qualifier)
    }

    pub fn simple_names(&self) -> &[String] {
        &self.names
    }

    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }

    /// The outermost enclosing type. Nested types share its source file.
    pub fn top_level(&self) -> ClassName {
        Self {
            qualifier: self.qualifier.clone(),
            names: vec![self.names[0].clone()],
        }
    }

    /// Simple name as it appears in class file names (`Outer$Inner`).
    pub fn mangled_simple_name(&self) -> String {
        self.names.join("$")
    }

    /// Simple name with nesting flattened to dots (`Outer.Inner`).
    pub fn flat_name(&self) -> String {
        self.names.join(".")
    }

    /// Fully qualified binary name (`a.b.Outer$Inner`).
    pub fn binary_name(&self) -> String {
        if self.qualifier.is_empty() {
            self.mangled_simple_name()
        } else {
            format!("{}.{}", self.qualifier, self.mangled_simple_name())
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.binary_name())
    }
}

/// A package name as a list of segments.
///
/// Nested-type qualification is flattened: `a.Outer$Inner` names the package
/// path `a/Outer/Inner`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName {
    segments: Vec<String>,
}

impl PackageName {
    pub fn new(name: &str) -> Self {
        let segments = name
            .split(['.', '/', '\\', NESTED_SEPARATOR])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Self { segments }
    }

    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn is_unnamed(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Relative directory form using `/` (`a/b`), empty for the unnamed package.
    pub fn dir_path(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}
