//! Project analysis: runs the discovery results through include resolution,
//! graph construction, flag extraction and propagation, and staleness, and
//! assembles one immutable record per unit.
//!
//! Each stage produces a fresh map keyed by unit path; nothing is mutated
//! once [`Analysis`] is returned.

use crate::classifier::{self, SourceTree};
use crate::error::Result;
use crate::flags::{self, FlagBuckets};
use crate::graph::{self, DependencyGraph};
use crate::includes;
use crate::output::OutputMode;
use crate::progress;
use crate::propagate;
use crate::staleness::{self, Timestamp};
use crate::toolchain::{CompilerFamily, Toolchain};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct SourceUnit {
    pub path: String,
    pub is_entry_point: bool,
    /// Everything the compiler reported, in reported order
    pub raw_includes: Vec<String>,
    /// The subset of `raw_includes` that are project headers
    pub local_includes: Vec<String>,
    pub direct_dependencies: Vec<String>,
    /// This unit first, then the rest of its closure in path order
    pub link_set: Vec<String>,
    pub flag_buckets: FlagBuckets,
    pub compiler_flags: Vec<String>,
    pub linker_flags: Vec<String>,
    pub staleness: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderUnit {
    pub path: String,
    pub modified: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    #[serde(skip)]
    root: PathBuf,
    pub engine_timestamp: Timestamp,
    pub units: BTreeMap<String, SourceUnit>,
    pub headers: BTreeMap<String, HeaderUnit>,
    pub entry_points: Vec<String>,
}

impl Analysis {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unit(&self, path: &str) -> Option<&SourceUnit> {
        self.units.get(path)
    }

    /// Units that some entry point has to link; only these are ever compiled.
    pub fn reachable_units(&self) -> BTreeSet<&str> {
        self.entry_points
            .iter()
            .filter_map(|e| self.unit(e))
            .flat_map(|u| u.link_set.iter().map(String::as_str))
            .collect()
    }
}

/// Runs the analysis stages against one toolchain.
pub struct Analyzer<'a> {
    toolchain: &'a dyn Toolchain,
    family: CompilerFamily,
    engine: Timestamp,
    mode: OutputMode,
}

impl<'a> Analyzer<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, family: CompilerFamily) -> Self {
        Self {
            toolchain,
            family,
            engine: staleness::engine_timestamp(None),
            mode: OutputMode::Quiet,
        }
    }

    pub fn engine_timestamp(mut self, engine: Timestamp) -> Self {
        self.engine = engine;
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn analyze(&self, tree: &SourceTree) -> Result<Analysis> {
        let root = tree.root.as_path();
        let sources: BTreeSet<String> = tree.sources.iter().cloned().collect();
        let headers: BTreeSet<String> = tree.headers.iter().cloned().collect();

        let raw_includes = self.resolve_all_includes(tree)?;

        let mut local_includes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut direct: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (unit, raw) in &raw_includes {
            let local = graph::local_includes(raw, &headers);
            let deps = graph::direct_dependencies(&local, &sources, &tree.source_extensions);
            local_includes.insert(unit.clone(), local);
            direct.insert(unit.clone(), deps);
        }
        let dependency_graph = DependencyGraph::new(direct);

        let mut buckets: BTreeMap<String, FlagBuckets> = BTreeMap::new();
        for (unit, raw) in &raw_includes {
            let code = classifier::read_source(root, unit)?;
            let foreign = graph::foreign_includes(raw, &headers);
            buckets.insert(unit.clone(), flags::extract_flags(&code, foreign, self.family));
        }
        let merged = propagate::propagate(&buckets, &dependency_graph);

        let header_times = staleness::header_timestamps(root, &tree.headers);

        let mut units = BTreeMap::new();
        for source in &tree.sources {
            let local = local_includes.remove(source).unwrap_or_default();
            let unit_flags = merged.get(source).cloned().unwrap_or_default();
            let staleness =
                staleness::source_timestamp(root, source, &local, &header_times, self.engine);

            let mut link_set = vec![source.clone()];
            if let Some(closure) = dependency_graph.link_set(source) {
                link_set.extend(closure.iter().filter(|u| *u != source).cloned());
            }

            units.insert(
                source.clone(),
                SourceUnit {
                    path: source.clone(),
                    is_entry_point: tree.is_entry_point(source),
                    raw_includes: raw_includes.get(source).cloned().unwrap_or_default(),
                    local_includes: local,
                    direct_dependencies: dependency_graph.direct(source).to_vec(),
                    link_set,
                    flag_buckets: buckets.remove(source).unwrap_or_default(),
                    compiler_flags: unit_flags.compiler,
                    linker_flags: unit_flags.linker,
                    staleness,
                },
            );
        }

        let headers = header_times
            .into_iter()
            .map(|(path, modified)| (path.clone(), HeaderUnit { path, modified }))
            .collect();

        Ok(Analysis {
            root: tree.root.clone(),
            engine_timestamp: self.engine,
            units,
            headers,
            entry_points: tree.entry_points.clone(),
        })
    }

    /// Dependency listing for every source unit, in path order.
    fn resolve_all_includes(&self, tree: &SourceTree) -> Result<BTreeMap<String, Vec<String>>> {
        let bar = if self.mode == OutputMode::Normal && !tree.sources.is_empty() {
            Some(progress::create_progress_bar(
                tree.sources.len() as u64,
                "Resolving includes",
            ))
        } else {
            None
        };

        let mut raw_includes = BTreeMap::new();
        for source in &tree.sources {
            let result = includes::resolve_includes(self.toolchain, source, &tree.source_extensions);
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    if let Some(ref pb) = bar {
                        progress::finish_and_clear(pb);
                    }
                    return Err(e);
                }
            };
            raw_includes.insert(source.clone(), raw);
            if let Some(ref pb) = bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = bar {
            progress::finish_and_clear(&pb);
        }
        Ok(raw_includes)
    }
}
