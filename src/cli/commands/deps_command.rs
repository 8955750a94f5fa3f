//! Deps command feature.
//!
//! This module owns and handles the "tinybuild deps" command behavior: run
//! the analysis without building and report what was found.

use super::load_project;
use crate::cli::ProjectArgs;
use crate::output::{self, OutputMode};
use crate::theme::Theme;

pub(crate) fn handle_deps(project: ProjectArgs, json: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let mode = if json { OutputMode::Quiet } else { output_mode };
    let loaded = load_project(project, mode)?;

    if json {
        return output::print_json(&loaded.analysis);
    }

    if mode == OutputMode::Quiet {
        return Ok(());
    }

    println!("{}", Theme::header("Toolchain"));
    println!("  {} {}", Theme::muted("compiler:"), loaded.settings.compiler);
    println!("  {} {}", Theme::muted("compile settings:"), loaded.settings.compiler_settings.join(" "));
    println!("  {} {}", Theme::muted("link settings:"), loaded.settings.linker_settings.join(" "));
    println!();

    // -vv already printed the tree during discovery
    if mode != OutputMode::VeryVerbose {
        output::print_tree(&loaded.tree);
    }
    output::print_analysis(&loaded.analysis);

    let reachable = loaded.analysis.reachable_units();
    let unreachable: Vec<String> = loaded
        .analysis
        .units
        .keys()
        .filter(|u| !reachable.contains(u.as_str()))
        .cloned()
        .collect();
    if !unreachable.is_empty() {
        println!("{}", Theme::muted("Not linked into any executable (never compiled):"));
        for unit in &unreachable {
            println!(" * {}", unit);
        }
    }

    Ok(())
}
