//! Build orchestration: compile stale objects, relink stale executables.
//!
//! For every entry point, each unit in its link set maps to one object
//! (`dir/.stem.o`) and the entry point itself to one executable
//! (`dir/stem`). An artifact is rebuilt when it is missing or older than its
//! inputs; the first toolchain failure aborts the whole build.

use crate::classifier::SourceTree;
use crate::error::{BuildError, Result};
use crate::output::OutputMode;
use crate::project::{Analysis, SourceUnit};
use crate::staleness::Timestamp;
use crate::theme::Theme;
use crate::toolchain::Toolchain;
use crate::utils;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What an artifact looks like relative to its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactState {
    Missing,
    Stale,
    Fresh,
}

impl ArtifactState {
    pub fn classify(artifact: Timestamp, inputs: Timestamp) -> Self {
        if artifact.is_missing() {
            ArtifactState::Missing
        } else if artifact < inputs {
            ArtifactState::Stale
        } else {
            ArtifactState::Fresh
        }
    }

    pub fn needs_build(self) -> bool {
        !matches!(self, ArtifactState::Fresh)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Compile the stale objects of one executable on the rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub entry_points: Vec<String>,
    /// Object files written, in build order
    pub compiled: Vec<String>,
    /// Executables written, in build order
    pub linked: Vec<String>,
    pub objects_up_to_date: usize,
    pub executables_up_to_date: usize,
}

impl BuildReport {
    /// True when the run compiled and linked nothing
    pub fn is_noop(&self) -> bool {
        self.compiled.is_empty() && self.linked.is_empty()
    }
}

pub struct Orchestrator<'a> {
    analysis: &'a Analysis,
    toolchain: &'a dyn Toolchain,
    options: BuildOptions,
    mode: OutputMode,
}

impl<'a> Orchestrator<'a> {
    pub fn new(analysis: &'a Analysis, toolchain: &'a dyn Toolchain) -> Self {
        Self {
            analysis,
            toolchain,
            options: BuildOptions::default(),
            mode: OutputMode::Quiet,
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    fn verbose(&self) -> bool {
        matches!(self.mode, OutputMode::Verbose | OutputMode::VeryVerbose)
    }

    fn timestamp(&self, rel: &str) -> Timestamp {
        Timestamp::of(&self.analysis.root().join(rel))
    }

    /// Build every entry point in path order.
    pub fn build(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for entry in &self.analysis.entry_points {
            let Some(unit) = self.analysis.unit(entry) else {
                continue;
            };
            report.entry_points.push(entry.clone());
            self.build_entry_point(unit, &mut report)?;
        }

        Ok(report)
    }

    fn build_entry_point(&self, entry: &SourceUnit, report: &mut BuildReport) -> Result<()> {
        let executable = utils::executable_file_name(&entry.path);
        let members: Vec<&SourceUnit> = entry
            .link_set
            .iter()
            .filter_map(|u| self.analysis.unit(u))
            .collect();
        let objects: Vec<String> = members
            .iter()
            .map(|u| utils::object_file_name(&u.path))
            .collect();

        if self.verbose() {
            println!("To build {} the following files must first be built:", executable);
            for object in &objects {
                println!(" * {}", object);
            }
            println!();
        }

        // Decide the whole rebuild set up front so parallel and sequential
        // builds compile exactly the same objects.
        let mut stale: Vec<(&SourceUnit, &String)> = Vec::new();
        for (unit, object) in members.iter().zip(&objects) {
            let state = ArtifactState::classify(self.timestamp(object), unit.staleness);
            if state.needs_build() {
                if self.verbose() {
                    println!("Compiling {}", object);
                }
                stale.push((*unit, object));
            } else {
                if self.verbose() {
                    println!("{}", Theme::muted(&format!("No need to recompile {}", object)));
                }
                report.objects_up_to_date += 1;
            }
        }

        let compile = |(unit, object): &(&SourceUnit, &String)| {
            self.toolchain
                .compile(Path::new(&unit.path), Path::new(object.as_str()), &unit.compiler_flags)
        };
        if self.options.parallel {
            stale.par_iter().try_for_each(compile)?;
        } else {
            stale.iter().try_for_each(compile)?;
        }
        report
            .compiled
            .extend(stale.iter().map(|(_, object)| (*object).clone()));

        let newest_object = objects
            .iter()
            .map(|o| self.timestamp(o))
            .max()
            .unwrap_or(Timestamp::MISSING);
        let state = ArtifactState::classify(self.timestamp(&executable), newest_object);
        if state.needs_build() {
            if self.verbose() {
                println!("Linking {}", executable);
            }
            let object_paths: Vec<PathBuf> = objects.iter().map(PathBuf::from).collect();
            self.toolchain
                .link(&object_paths, Path::new(&executable), &entry.linker_flags)?;
            report.linked.push(executable);
        } else {
            if self.verbose() {
                println!("{}", Theme::muted(&format!("No need to relink {}", executable)));
            }
            report.executables_up_to_date += 1;
        }

        Ok(())
    }
}

/// Remove the object artifact of every discovered source unit, whether or
/// not an entry point links it. Returns the removed paths.
pub fn clean_objects(tree: &SourceTree, mode: OutputMode) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    for source in &tree.sources {
        let object = utils::object_file_name(source);
        let path = tree.root.join(&object);
        if !path.exists() {
            continue;
        }
        if mode != OutputMode::Quiet {
            println!("{}", Theme::command(&format!("rm {}", object)));
        }
        fs::remove_file(&path).map_err(|source| BuildError::Io { path, source })?;
        removed.push(object);
    }
    Ok(removed)
}
