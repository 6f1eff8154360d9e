use ct_paths::RelativePath;

const INCLUDE_DIRECTIVE: &str = "#include <";
const HEADER_EXTENSION: &str = ".hpp";

/// Name of the convenience header for a folder relative to the package root.
///
/// The package root maps to `catch_all.hpp`, `matchers/internal` to
/// `catch_matchers_internal_all.hpp`.
pub fn aggregate_header_name(dir: &RelativePath) -> String {
    if dir.is_root() {
        return "catch_all.hpp".to_string();
    }
    let joined = dir.segments().collect::<Vec<_>>().join("_");
    format!("catch_{joined}_all.hpp")
}

/// Extracts the include target from a single line.
///
/// Only lines that start with `#include <` and name a `.hpp` header under
/// `package/` count; everything else, including quoted includes and
/// indented directives, is ignored.
pub fn parse_include(line: &str, package: &str) -> Option<String> {
    let rest = line.strip_prefix(INCLUDE_DIRECTIVE)?;
    let end = rest.find('>')?;
    let target = rest[..end].replace('\\', "/");
    let name = target.strip_prefix(package)?.strip_prefix('/')?;
    if name.len() <= HEADER_EXTENSION.len() || !name.ends_with(HEADER_EXTENSION) {
        return None;
    }
    Some(target)
}

/// Include targets of `text`, in file order, duplicates kept.
pub fn parse_includes(text: &str, package: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| parse_include(line, package))
        .collect()
}
