//! Source-to-source dependency graph.
//!
//! There is no manifest: a source unit depends on `util.cpp` because it
//! includes the project header `util.h` and a source file with the same stem
//! exists. The link set of a unit is the transitive closure of that relation,
//! i.e. everything that has to be linked together with it.

use crate::utils;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Raw includes that are headers of this project, in reported order.
pub fn local_includes(raw_includes: &[String], headers: &BTreeSet<String>) -> Vec<String> {
    raw_includes
        .iter()
        .filter(|h| headers.contains(*h))
        .cloned()
        .collect()
}

/// Raw includes that are not project headers (system and library headers).
pub fn foreign_includes<'a>(
    raw_includes: &'a [String],
    headers: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a String> + 'a {
    raw_includes.iter().filter(move |h| !headers.contains(*h))
}

/// Map each local header to the same-named source units that exist.
///
/// Candidates are tried in source-extension order; a unit reached through
/// several headers is listed once.
pub fn direct_dependencies(
    local_includes: &[String],
    sources: &BTreeSet<String>,
    source_extensions: &[String],
) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();
    for header in local_includes {
        let stem = utils::strip_extension(header);
        for ext in source_extensions {
            let candidate = format!("{}{}", stem, ext);
            if sources.contains(&candidate) && !deps.contains(&candidate) {
                deps.push(candidate);
            }
        }
    }
    deps
}

/// Transitive closure of `direct` starting at `start`, including `start`.
///
/// Iterative and visited-guarded, so self-loops and cycles terminate. The
/// returned set does not depend on visitation order.
pub fn link_closure(start: &str, direct: &BTreeMap<String, Vec<String>>) -> BTreeSet<String> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queued: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![start];
    queued.insert(start);

    while let Some(unit) = stack.pop() {
        visited.insert(unit.to_string());
        if let Some(deps) = direct.get(unit) {
            for dep in deps {
                if !visited.contains(dep.as_str()) && queued.insert(dep.as_str()) {
                    stack.push(dep.as_str());
                }
            }
        }
    }

    visited
}

/// Direct edges plus the precomputed link set of every unit.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    direct: BTreeMap<String, Vec<String>>,
    link_sets: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new(direct: BTreeMap<String, Vec<String>>) -> Self {
        let link_sets = direct
            .keys()
            .map(|unit| (unit.clone(), link_closure(unit, &direct)))
            .collect();
        Self { direct, link_sets }
    }

    pub fn direct(&self, unit: &str) -> &[String] {
        self.direct.get(unit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link_set(&self, unit: &str) -> Option<&BTreeSet<String>> {
        self.link_sets.get(unit)
    }

    pub fn units(&self) -> impl Iterator<Item = &String> {
        self.direct.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn edges(list: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn exts() -> Vec<String> {
        vec![".cpp".to_string(), ".cxx".to_string()]
    }

    #[test]
    fn test_local_and_foreign_includes() {
        let raw = vec![
            "util.h".to_string(),
            "/usr/include/c++/9/cmath".to_string(),
            "graph/list_graph.h".to_string(),
        ];
        let headers = set(&["util.h", "graph/list_graph.h", "unused.h"]);
        assert_eq!(local_includes(&raw, &headers), vec!["util.h", "graph/list_graph.h"]);
        let foreign: Vec<&String> = foreign_includes(&raw, &headers).collect();
        assert_eq!(foreign, vec!["/usr/include/c++/9/cmath"]);
    }

    #[test]
    fn test_direct_dependencies_swap_extension() {
        let local = vec!["util.h".to_string(), "util.hpp".to_string(), "io.h".to_string(), "only_header.h".to_string()];
        let sources = set(&["util.cpp", "io.cxx", "main.cpp"]);
        assert_eq!(direct_dependencies(&local, &sources, &exts()), vec!["util.cpp", "io.cxx"]);
    }

    #[test]
    fn test_closure_contains_self_and_is_transitive() {
        let direct = edges(&[
            ("main.cpp", &["a.cpp"]),
            ("a.cpp", &["b.cpp"]),
            ("b.cpp", &[]),
            ("lonely.cpp", &[]),
        ]);
        assert_eq!(link_closure("main.cpp", &direct), set(&["main.cpp", "a.cpp", "b.cpp"]));
        assert_eq!(link_closure("lonely.cpp", &direct), set(&["lonely.cpp"]));
    }

    #[test]
    fn test_closure_terminates_on_cycles_and_self_loops() {
        let direct = edges(&[
            ("a.cpp", &["a.cpp", "b.cpp"]),
            ("b.cpp", &["c.cpp"]),
            ("c.cpp", &["a.cpp"]),
        ]);
        let expected = set(&["a.cpp", "b.cpp", "c.cpp"]);
        assert_eq!(link_closure("a.cpp", &direct), expected);
        assert_eq!(link_closure("b.cpp", &direct), expected);
    }

    #[test]
    fn test_closure_is_closed_under_direct_edges() {
        let direct = edges(&[
            ("m.cpp", &["x.cpp", "y.cpp"]),
            ("x.cpp", &["z.cpp", "y.cpp"]),
            ("y.cpp", &["w.cpp"]),
            ("z.cpp", &["m.cpp"]),
            ("w.cpp", &[]),
            ("q.cpp", &["m.cpp"]),
        ]);
        let graph = DependencyGraph::new(direct.clone());
        for unit in graph.units() {
            let closure = graph.link_set(unit).unwrap();
            assert!(closure.contains(unit));
            for member in closure {
                for dep in graph.direct(member) {
                    assert!(closure.contains(dep), "{} missing {}", unit, dep);
                }
            }
        }
        assert!(!graph.link_set("m.cpp").unwrap().contains("q.cpp"));
    }

    #[test]
    fn test_closure_independent_of_edge_order() {
        let forward = edges(&[
            ("m.cpp", &["a.cpp", "b.cpp", "c.cpp"]),
            ("a.cpp", &["c.cpp"]),
            ("b.cpp", &["a.cpp"]),
            ("c.cpp", &["d.cpp"]),
            ("d.cpp", &[]),
        ]);
        let reversed: BTreeMap<String, Vec<String>> = forward
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().rev().cloned().collect()))
            .collect();
        for unit in forward.keys() {
            assert_eq!(link_closure(unit, &forward), link_closure(unit, &reversed));
        }
    }

    #[test]
    fn test_unknown_unit_has_no_edges() {
        let graph = DependencyGraph::new(BTreeMap::new());
        assert!(graph.direct("ghost.cpp").is_empty());
        assert!(graph.link_set("ghost.cpp").is_none());
    }
}
