//! Per-unit flag extraction.
//!
//! Flags come from two places. Directive markers written anywhere in the
//! source text (usually in a comment):
//!
//! ```cpp
//! // compile with -march=native
//! // compile related with -DUSE_KAHIP
//! // compile all with -fno-strict-aliasing
//! // link with -lkaffpa -lparhip
//! ```
//!
//! and a fixed table of header-name heuristics applied to the headers a
//! unit pulls in from outside the project.

use crate::toolchain::CompilerFamily;
use crate::utils;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// Compile flags for this unit alone
    CompileSelf,
    /// Compile flags for every unit that directly depends on this one
    CompileRelated,
    /// Compile flags for every unit in a link closure containing this one
    CompileAll,
    /// Linker flags for every link closure containing this one
    LinkAll,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 4] = [
        DirectiveKind::CompileSelf,
        DirectiveKind::CompileRelated,
        DirectiveKind::CompileAll,
        DirectiveKind::LinkAll,
    ];

    /// Literal, case-sensitive marker text
    pub fn marker(self) -> &'static str {
        match self {
            DirectiveKind::CompileSelf => "compile with",
            DirectiveKind::CompileRelated => "compile related with",
            DirectiveKind::CompileAll => "compile all with",
            DirectiveKind::LinkAll => "link with",
        }
    }
}

/// Tokens following `marker` on every line that contains it.
///
/// Only the first occurrence per line counts; everything after it, up to
/// the end of the line, is split on whitespace. No quoting or escaping.
pub fn find_directive(code: &str, marker: &str) -> Vec<String> {
    code.lines()
        .filter_map(|line| line.find(marker).map(|idx| &line[idx + marker.len()..]))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

/// The four flag buckets of one unit, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagBuckets {
    pub compile_self: Vec<String>,
    pub compile_related: Vec<String>,
    pub compile_all: Vec<String>,
    pub link_all: Vec<String>,
}

impl FlagBuckets {
    pub fn bucket(&self, kind: DirectiveKind) -> &[String] {
        match kind {
            DirectiveKind::CompileSelf => &self.compile_self,
            DirectiveKind::CompileRelated => &self.compile_related,
            DirectiveKind::CompileAll => &self.compile_all,
            DirectiveKind::LinkAll => &self.link_all,
        }
    }

    fn bucket_mut(&mut self, kind: DirectiveKind) -> &mut Vec<String> {
        match kind {
            DirectiveKind::CompileSelf => &mut self.compile_self,
            DirectiveKind::CompileRelated => &mut self.compile_related,
            DirectiveKind::CompileAll => &mut self.compile_all,
            DirectiveKind::LinkAll => &mut self.link_all,
        }
    }
}

/// Header-name triggered flags.
#[derive(Debug)]
pub struct HeuristicRule {
    /// Base names that trigger the rule
    pub headers: &'static [&'static str],
    /// Added to the unit's own compile flags
    pub compile_self: &'static [&'static str],
    /// Only add `compile_self` when building with this family
    pub compile_family: Option<CompilerFamily>,
    /// Added to the unit's closure link flags
    pub link_all: &'static [&'static str],
}

pub const HEURISTIC_RULES: &[HeuristicRule] = &[
    HeuristicRule {
        headers: &["math.h", "cmath"],
        compile_self: &[],
        compile_family: None,
        link_all: &["-lm"],
    },
    HeuristicRule {
        headers: &["metis.h"],
        compile_self: &[],
        compile_family: None,
        link_all: &["-lmetis"],
    },
    HeuristicRule {
        headers: &["kaffpa_interface.h"],
        compile_self: &[],
        compile_family: None,
        link_all: &["-lkaffpa"],
    },
    HeuristicRule {
        headers: &["cl.h", "opencl"],
        compile_self: &[],
        compile_family: None,
        link_all: &["-lOpenCL"],
    },
    HeuristicRule {
        headers: &["omp.h"],
        compile_self: &["-fopenmp"],
        compile_family: Some(CompilerFamily::Gnu),
        link_all: &["-fopenmp"],
    },
    HeuristicRule {
        headers: &["thread", "future", "mutex", "atomic"],
        compile_self: &[],
        compile_family: None,
        link_all: &["-lpthread"],
    },
];

/// Read all four directive kinds out of `code`.
pub fn extract_directives(code: &str) -> FlagBuckets {
    let mut buckets = FlagBuckets::default();
    for kind in DirectiveKind::ALL {
        *buckets.bucket_mut(kind) = find_directive(code, kind.marker());
    }
    buckets
}

/// Apply [`HEURISTIC_RULES`] for the given foreign include paths.
pub fn apply_heuristics<'a>(
    buckets: &mut FlagBuckets,
    foreign_includes: impl IntoIterator<Item = &'a String>,
    family: CompilerFamily,
) {
    let names: Vec<&str> = foreign_includes
        .into_iter()
        .map(|path| utils::base_name(path))
        .collect();

    for rule in HEURISTIC_RULES {
        if !rule.headers.iter().any(|h| names.contains(h)) {
            continue;
        }
        if rule.compile_family.map_or(true, |f| f == family) {
            buckets
                .compile_self
                .extend(rule.compile_self.iter().map(|s| s.to_string()));
        }
        buckets
            .link_all
            .extend(rule.link_all.iter().map(|s| s.to_string()));
    }
}

/// Directives plus heuristics for one unit.
pub fn extract_flags<'a>(
    code: &str,
    foreign_includes: impl IntoIterator<Item = &'a String>,
    family: CompilerFamily,
) -> FlagBuckets {
    let mut buckets = extract_directives(code);
    apply_heuristics(&mut buckets, foreign_includes, family);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_directive_accumulates_lines() {
        let code = "// link with -lfoo  -lbar\nint x;\n/* link with -lbaz */\n";
        assert_eq!(find_directive(code, "link with"), vec!["-lfoo", "-lbar", "-lbaz", "*/"]);
    }

    #[test]
    fn test_markers_do_not_overlap() {
        let code = "// compile with -DSELF\n// compile related with -DREL\n// compile all with -DALL\n// link with -lx\n";
        let b = extract_directives(code);
        assert_eq!(b.compile_self, vec!["-DSELF"]);
        assert_eq!(b.compile_related, vec!["-DREL"]);
        assert_eq!(b.compile_all, vec!["-DALL"]);
        assert_eq!(b.link_all, vec!["-lx"]);
    }

    #[test]
    fn test_markers_are_case_sensitive_and_literal() {
        let code = "// Compile With -O0\n// compile  with -g\n";
        assert!(find_directive(code, DirectiveKind::CompileSelf.marker()).is_empty());
    }

    #[test]
    fn test_only_first_marker_per_line() {
        let code = "compile with -a compile with -b";
        assert_eq!(
            find_directive(code, "compile with"),
            vec!["-a", "compile", "with", "-b"]
        );
    }

    #[test]
    fn test_extraction_keeps_order_and_duplicates() {
        let code = "// compile with -b -a -b\n";
        assert_eq!(extract_directives(code).compile_self, vec!["-b", "-a", "-b"]);
    }

    #[test]
    fn test_math_heuristic() {
        let includes = vec!["/usr/include/c++/9/cmath".to_string()];
        let b = extract_flags("", &includes, CompilerFamily::Gnu);
        assert_eq!(b.link_all, vec!["-lm"]);
        assert!(b.compile_self.is_empty());
    }

    #[test]
    fn test_openmp_compile_flag_only_for_gnu() {
        let includes = vec!["/usr/lib/gcc/x86_64-linux-gnu/9/include/omp.h".to_string()];

        let gnu = extract_flags("", &includes, CompilerFamily::Gnu);
        assert_eq!(gnu.compile_self, vec!["-fopenmp"]);
        assert_eq!(gnu.link_all, vec!["-fopenmp"]);

        let clang = extract_flags("", &includes, CompilerFamily::Clang);
        assert!(clang.compile_self.is_empty());
        assert_eq!(clang.link_all, vec!["-fopenmp"]);
    }

    #[test]
    fn test_threading_headers_link_pthread_once() {
        let includes = vec![
            "/usr/include/c++/9/thread".to_string(),
            "/usr/include/c++/9/mutex".to_string(),
            "/usr/include/c++/9/atomic".to_string(),
        ];
        let b = extract_flags("// link with -lfoo\n", &includes, CompilerFamily::Gnu);
        assert_eq!(b.link_all, vec!["-lfoo", "-lpthread"]);
    }

    #[test]
    fn test_partitioning_and_accelerator_headers() {
        let includes = vec![
            "/opt/metis/include/metis.h".to_string(),
            "/opt/kahip/kaffpa_interface.h".to_string(),
            "/usr/include/CL/cl.h".to_string(),
        ];
        let b = extract_flags("", &includes, CompilerFamily::Gnu);
        assert_eq!(b.link_all, vec!["-lmetis", "-lkaffpa", "-lOpenCL"]);
    }

    #[test]
    fn test_unrelated_headers_add_nothing() {
        let includes = vec!["/usr/include/c++/9/vector".to_string(), "/usr/include/mathematics.h".to_string()];
        assert_eq!(extract_flags("", &includes, CompilerFamily::Gnu), FlagBuckets::default());
    }
}
