//! Path helpers shared by the build stages
//!
//! Units are identified by their project-relative path as a `/`-separated
//! string. Everything that produces or compares unit paths goes through
//! [`normalize_path`] so that `./util.h` or `tools/../util.h` from the
//! compiler and `util.h` from the directory walk are the same unit.

use std::path::Path;

/// Normalize a path reported by the compiler or the directory walk: `/`
/// separators, no `.` or empty segments.
///
/// For relative paths `dir/..` pairs are folded away, so
/// `tools/../lib/graph.h` becomes `lib/graph.h`. A `..` that would climb
/// above the project root is kept. Absolute paths keep their `..` segments.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." if !absolute && segments.last().is_some_and(|s| *s != "..") => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Project-relative unit path for a file under `root`.
pub fn relative_unit_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    normalize_path(&rel.to_string_lossy())
}

/// Split `path` into (directory with trailing `/` or empty, file name).
fn split_file_name(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Final path component
pub fn base_name(path: &str) -> &str {
    split_file_name(path).1
}

/// Extension including the dot, following the usual splitext rules: a
/// leading dot in the file name does not start an extension.
pub fn extension(path: &str) -> &str {
    let name = base_name(path);
    let trimmed = name.trim_start_matches('.');
    let leading = name.len() - trimmed.len();
    match trimmed.rfind('.') {
        Some(idx) => &name[leading + idx..],
        None => "",
    }
}

/// Path without its extension
pub fn strip_extension(path: &str) -> &str {
    &path[..path.len() - extension(path).len()]
}

/// Object artifact for a source unit: same directory, `.<stem>.o`
pub fn object_file_name(unit: &str) -> String {
    let (dir, name) = split_file_name(unit);
    let stem = strip_extension(name);
    format!("{}.{}.o", dir, stem)
}

/// Executable for an entry point: same directory, stem with no extension
pub fn executable_file_name(unit: &str) -> String {
    strip_extension(unit).to_string()
}

/// True for names the classifier never looks at
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./util.h"), "util.h");
        assert_eq!(normalize_path("././a//b.h"), "a/b.h");
        assert_eq!(normalize_path("graph\\list_graph.h"), "graph/list_graph.h");
        assert_eq!(normalize_path("/usr/include/math.h"), "/usr/include/math.h");
    }

    #[test]
    fn test_normalize_folds_parent_segments() {
        assert_eq!(normalize_path("tools/../lib/graph.h"), "lib/graph.h");
        assert_eq!(normalize_path("./a/b/../../c/./d.h"), "c/d.h");
        assert_eq!(normalize_path("tools\\..\\lib\\graph.h"), "lib/graph.h");
        // Leaving the project root is not folded away
        assert_eq!(normalize_path("../vendor/x.h"), "../vendor/x.h");
        assert_eq!(normalize_path("a/../../x.h"), "../x.h");
        // Absolute paths are left alone apart from separators
        assert_eq!(
            normalize_path("/usr/lib/gcc/../../include//math.h"),
            "/usr/lib/gcc/../../include/math.h"
        );
    }

    #[test]
    fn test_relative_unit_path() {
        let root = PathBuf::from("/proj");
        assert_eq!(relative_unit_path(&root.join("src").join("a.cpp"), &root), "src/a.cpp");
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension("a/b/main.cpp"), ".cpp");
        assert_eq!(extension("main.o:"), ".o:");
        assert_eq!(extension("cmath"), "");
        assert_eq!(extension(".hidden"), "");
        assert_eq!(extension("dir.d/file"), "");
        assert_eq!(extension("archive.tar.gz"), ".gz");
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(object_file_name("main.cpp"), ".main.o");
        assert_eq!(object_file_name("tools/flow_cutter.cpp"), "tools/.flow_cutter.o");
        assert_eq!(executable_file_name("tools/flow_cutter.cpp"), "tools/flow_cutter");
        assert_eq!(executable_file_name("main.cxx"), "main");
    }

    #[test]
    fn test_base_name_and_stem() {
        assert_eq!(base_name("/usr/include/c++/9/cmath"), "cmath");
        assert_eq!(strip_extension("lib/util.hpp"), "lib/util");
    }
}
