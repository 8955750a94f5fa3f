//! Command feature handlers.
//!
//! Each module owns one command feature.

pub mod build_command;
pub mod clean_command;
pub mod config_command;
pub mod deps_command;

use crate::classifier::{self, ScanRules, SourceTree};
use crate::cli::ProjectArgs;
use crate::config::Config;
use crate::output::{self, OutputMode};
use crate::progress;
use crate::project::{Analysis, Analyzer};
use crate::staleness;
use crate::toolchain::{CommandToolchain, ToolSettings};
use anyhow::Context;
use std::path::PathBuf;

/// Resolve `--path`, defaulting to the current directory.
pub(crate) fn project_root(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Config for `root` with CLI switches applied.
pub(crate) fn load_config(root: &std::path::Path, args: &ProjectArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(root)?;
    config.apply_cli_overrides(
        Some(args.ignore_warnings),
        Some(args.no_gpl),
        None,
        Some(args.show_header_scanning),
    );
    Ok(config)
}

/// Walk the project tree, with a spinner in normal mode.
pub(crate) fn discover(root: &std::path::Path, config: &Config, mode: OutputMode) -> anyhow::Result<SourceTree> {
    let rules = ScanRules::from_config(config)?;

    let spinner = if mode == OutputMode::Normal {
        Some(progress::create_spinner("Scanning project..."))
    } else {
        None
    };
    let result = classifier::discover(root, &rules);
    if let Some(ref sp) = spinner {
        progress::finish_and_clear(sp);
    }

    let tree = result.with_context(|| format!("Failed to scan {}", root.display()))?;
    if mode == OutputMode::VeryVerbose {
        output::print_tree(&tree);
    }
    Ok(tree)
}

/// Everything a build or report needs, loaded and analyzed.
pub(crate) struct LoadedProject {
    pub config: Config,
    pub settings: ToolSettings,
    pub tree: SourceTree,
    pub toolchain: CommandToolchain,
    pub analysis: Analysis,
}

pub(crate) fn load_project(args: ProjectArgs, mode: OutputMode) -> anyhow::Result<LoadedProject> {
    let root = project_root(args.path.clone())?;
    let config = load_config(&root, &args)?;
    let settings = config.tool_settings()?;
    let tree = discover(&root, &config, mode)?;

    let toolchain = CommandToolchain::new(settings.clone(), &root, mode)
        .echo_dependency_scan(config.options.show_header_scanning);

    let engine = staleness::engine_timestamp(config.source_path.as_deref());
    let analysis = Analyzer::new(&toolchain, settings.family)
        .engine_timestamp(engine)
        .output_mode(mode)
        .analyze(&tree)
        .context("Dependency analysis failed")?;

    Ok(LoadedProject {
        config,
        settings,
        tree,
        toolchain,
        analysis,
    })
}
