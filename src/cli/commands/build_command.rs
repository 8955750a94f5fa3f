//! Build command feature.
//!
//! This module owns and handles the "tinybuild build" command behavior.

use super::load_project;
use crate::cli::ProjectArgs;
use crate::orchestrator::{self, BuildOptions, Orchestrator};
use crate::output::{self, OutputMode};
use anyhow::Context;

pub(crate) fn handle_build(
    project: ProjectArgs,
    clean: bool,
    parallel: bool,
    json: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    // Keep stdout machine-readable in JSON mode
    let mode = if json { OutputMode::Quiet } else { output_mode };

    let mut loaded = load_project(project, mode)?;
    loaded
        .config
        .apply_cli_overrides(None, None, Some(parallel), None);

    if mode == OutputMode::VeryVerbose {
        output::print_analysis(&loaded.analysis);
    }

    let options = BuildOptions {
        parallel: loaded.config.options.parallel,
    };
    let report = Orchestrator::new(&loaded.analysis, &loaded.toolchain)
        .options(options)
        .output_mode(mode)
        .build()
        .context("Build failed")?;

    if clean {
        orchestrator::clean_objects(&loaded.tree, mode).context("Cleanup failed")?;
    }

    if json {
        output::print_json(&report)?;
    } else {
        output::print_build_report(&report, mode);
    }

    Ok(())
}
