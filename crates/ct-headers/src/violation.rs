use std::fmt;

use ct_paths::NormalizedPath;

/// A single deviation from the convenience-header rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The folder has no convenience header at all.
    MissingHeader { path: NormalizedPath },
    UnsortedIncludes { header: String },
    DuplicateInclude { header: String, include: String },
    /// A header that belongs in the convenience header is not included.
    MissingInclude { header: String, include: String },
    /// The convenience header includes something that does not belong.
    SuperfluousInclude { header: String, include: String },
}

impl Violation {
    /// File name of the convenience header the violation is about.
    pub fn header(&self) -> &str {
        match self {
            Violation::MissingHeader { path } => path.file_name().unwrap_or(path.as_str()),
            Violation::UnsortedIncludes { header }
            | Violation::DuplicateInclude { header, .. }
            | Violation::MissingInclude { header, .. }
            | Violation::SuperfluousInclude { header, .. } => header,
        }
    }

    pub fn include(&self) -> Option<&str> {
        match self {
            Violation::MissingHeader { .. } | Violation::UnsortedIncludes { .. } => None,
            Violation::DuplicateInclude { include, .. }
            | Violation::MissingInclude { include, .. }
            | Violation::SuperfluousInclude { include, .. } => Some(include),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingHeader { path } => {
                write!(f, "Missing convenience header: {path}")
            }
            Violation::UnsortedIncludes { header } => {
                write!(f, "'{header}': Includes are not in sorted order!")
            }
            Violation::DuplicateInclude { header, include } => {
                write!(f, "'{header}': Duplicated include: '{include}'")
            }
            Violation::MissingInclude { header, include } => {
                write!(f, "'{header}': missing include '{include}'")
            }
            Violation::SuperfluousInclude { header, include } => {
                write!(f, "'{header}': superfluous include '{include}'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ct_paths::NormalizedPath;

    use super::Violation;

    #[test]
    fn renders_one_line_per_violation() {
        let missing = Violation::MissingHeader {
            path: NormalizedPath::new("/catch/src/catch2/matchers/catch_matchers_all.hpp"),
        };
        assert_eq!(
            missing.to_string(),
            "Missing convenience header: /catch/src/catch2/matchers/catch_matchers_all.hpp"
        );
        assert_eq!(missing.header(), "catch_matchers_all.hpp");
        assert_eq!(missing.include(), None);

        let superfluous = Violation::SuperfluousInclude {
            header: "catch_all.hpp".to_string(),
            include: "catch2/catch_nope.hpp".to_string(),
        };
        assert_eq!(
            superfluous.to_string(),
            "'catch_all.hpp': superfluous include 'catch2/catch_nope.hpp'"
        );
        assert_eq!(superfluous.include(), Some("catch2/catch_nope.hpp"));
    }
}
