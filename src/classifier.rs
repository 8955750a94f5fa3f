//! Project discovery: find source and header files and pick out the ones
//! that build into executables.

use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::utils;
use globset::GlobSet;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source file builds into an executable when it matches this...
const ENTRY_SIGNATURE: &str = r"int\s+main\s*\(";
/// ...and does not opt out with this comment.
const EXCLUDE_MARKER: &str = r"//\s+do\s+not\s+build";

/// How files are classified during the walk
#[derive(Debug, Clone)]
pub struct ScanRules {
    pub source_extensions: Vec<String>,
    pub header_extensions: Vec<String>,
    pub exclusions: GlobSet,
}

impl ScanRules {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            source_extensions: config.source_extensions(),
            header_extensions: config.header_extensions(),
            exclusions: config.exclusion_set()?,
        })
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        let config = Config::default();
        Self {
            source_extensions: config.source_extensions(),
            header_extensions: config.header_extensions(),
            exclusions: GlobSet::empty(),
        }
    }
}

/// Result of scanning the project tree. All paths are project-relative and
/// sorted.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub root: PathBuf,
    pub source_extensions: Vec<String>,
    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub entry_points: Vec<String>,
}

impl SourceTree {
    pub fn is_entry_point(&self, unit: &str) -> bool {
        self.entry_points.binary_search_by(|e| e.as_str().cmp(unit)).is_ok()
    }
}

/// Matches the entry signature and exclusion marker against source text.
#[derive(Debug, Clone)]
pub struct EntryDetector {
    signature: Regex,
    exclude: Regex,
}

impl EntryDetector {
    pub fn new() -> Self {
        // Both patterns are compile-time constants
        Self {
            signature: Regex::new(ENTRY_SIGNATURE).expect("valid entry signature pattern"),
            exclude: Regex::new(EXCLUDE_MARKER).expect("valid exclusion marker pattern"),
        }
    }

    pub fn is_entry_point(&self, code: &str) -> bool {
        self.signature.is_match(code) && !self.exclude.is_match(code)
    }
}

impl Default for EntryDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk `root` once and classify every visible file.
pub fn discover(root: &Path, rules: &ScanRules) -> Result<SourceTree> {
    let mut sources = Vec::new();
    let mut headers = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| BuildError::Discovery {
            path: root.to_path_buf(),
            source,
        })?;
        // Hidden files are skipped; hidden directories are still walked
        if !entry.file_type().is_file() || utils::is_hidden(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let rel = utils::relative_unit_path(entry.path(), root);
        if rules.exclusions.is_match(&rel) {
            continue;
        }

        let ext = utils::extension(&rel);
        if rules.source_extensions.iter().any(|e| e == ext) {
            sources.push(rel);
        } else if rules.header_extensions.iter().any(|e| e == ext) {
            headers.push(rel);
        }
    }

    sources.sort();
    headers.sort();

    let detector = EntryDetector::new();
    let mut entry_points = Vec::new();
    for source in &sources {
        let code = read_source(root, source)?;
        if detector.is_entry_point(&code) {
            entry_points.push(source.clone());
        }
    }

    Ok(SourceTree {
        root: root.to_path_buf(),
        source_extensions: rules.source_extensions.clone(),
        sources,
        headers,
        entry_points,
    })
}

/// Read a unit's text. Invalid UTF-8 is replaced rather than rejected;
/// only the markers and the entry signature are ever looked for.
pub fn read_source(root: &Path, unit: &str) -> Result<String> {
    let path = root.join(unit);
    let bytes = fs::read(&path).map_err(|source| BuildError::ReadSource { path, source })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_entry_detection() {
        let d = EntryDetector::new();
        assert!(d.is_entry_point("int main(int argc, char** argv) {}"));
        assert!(d.is_entry_point("int\n  main ()\n{ return 0; }"));
        assert!(!d.is_entry_point("int mainly(void);"));
        assert!(!d.is_entry_point("// do not build\nint main() {}"));
        assert!(!d.is_entry_point("int main(){}\n//   do   not   build"));
        assert!(d.is_entry_point("int main(){} //do not build"));
    }

    #[test]
    fn test_discover_classifies_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "main.cpp", "#include \"util.h\"\nint main() { return 0; }\n");
        write(&dir, "util.cpp", "int twice(int x) { return 2 * x; }\n");
        write(&dir, "util.h", "int twice(int x);\n");
        write(&dir, "graph/list_graph.hxx", "");
        write(&dir, "tools/tool.cxx", "int main(){}\n");
        write(&dir, "README.md", "docs");

        let tree = discover(dir.path(), &ScanRules::default()).unwrap();
        assert_eq!(tree.sources, vec!["main.cpp", "tools/tool.cxx", "util.cpp"]);
        assert_eq!(tree.headers, vec!["graph/list_graph.hxx", "util.h"]);
        assert_eq!(tree.entry_points, vec!["main.cpp", "tools/tool.cxx"]);
        assert!(tree.is_entry_point("main.cpp"));
        assert!(!tree.is_entry_point("util.cpp"));
    }

    #[test]
    fn test_discover_skips_hidden_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "a.cpp", "");
        write(&dir, ".a.cpp", "int main(){}");
        write(&dir, ".gen/b.cpp", "int main(){}");
        write(&dir, ".gen/.c.h", "");

        let tree = discover(dir.path(), &ScanRules::default()).unwrap();
        assert_eq!(tree.sources, vec![".gen/b.cpp", "a.cpp"]);
        assert!(tree.headers.is_empty());
        assert_eq!(tree.entry_points, vec![".gen/b.cpp"]);
    }

    #[test]
    fn test_discover_applies_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "main.cpp", "int main(){}");
        write(&dir, "third_party/z.cpp", "");

        let mut config = Config::default();
        config.exclusions.patterns.push("third_party/**".to_string());
        let rules = ScanRules::from_config(&config).unwrap();

        let tree = discover(dir.path(), &rules).unwrap();
        assert_eq!(tree.sources, vec!["main.cpp"]);
    }

    #[test]
    fn test_discover_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover(&missing, &ScanRules::default()).unwrap_err();
        assert!(matches!(err, BuildError::Discovery { .. }));
    }
}
