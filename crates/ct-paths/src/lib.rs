use std::fmt;
use std::path::{Component, Path};

/// A `/`-separated path with `.` and `..` components folded away.
///
/// Include targets and report paths are compared as plain strings, so every
/// path that ends up in a comparison goes through this type first. Case is
/// preserved on every platform: `catch2/Foo.hpp` and `catch2/foo.hpp` are
/// different include targets even where the filesystem would not care.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut path = path.as_ref().replace('\\', "/");
        let mut prefix = String::new();

        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            prefix.push_str(&path[..2]);
            path = path[2..].to_string();
        }
        let absolute = path.starts_with('/');

        let mut components: Vec<&str> = Vec::new();
        for part in path.split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            if part == ".." {
                match components.last().copied() {
                    Some(last) if last != ".." => {
                        components.pop();
                    }
                    _ if absolute => {}
                    _ => components.push(".."),
                }
                continue;
            }
            components.push(part);
        }

        let mut normalized = prefix;
        if absolute {
            normalized.push('/');
        }
        normalized.push_str(&components.join("/"));
        if normalized.is_empty() {
            normalized.push('.');
        }

        Self { inner: normalized }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
    }

    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        if self.inner == "." {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment.as_ref()))
    }

}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

/// A path relative to some root, `.` for the root itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// Relativises a filesystem path without touching the disk.
    ///
    /// Returns `None` when `path` is not under `root` or a component is not
    /// valid UTF-8.
    pub fn from_fs(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        let inner = if segments.is_empty() {
            ".".to_string()
        } else {
            segments.join("/")
        };
        Some(Self { inner })
    }

    pub fn is_root(&self) -> bool {
        self.inner == "."
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|segment| *segment != ".")
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
