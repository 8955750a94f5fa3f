//! Clean command feature.
//!
//! This module owns and handles the "tinybuild clean" command behavior.

use super::{discover, load_config, project_root};
use crate::cli::ProjectArgs;
use crate::orchestrator;
use crate::output::OutputMode;
use crate::theme::Theme;
use anyhow::Context;
use std::path::PathBuf;

pub(crate) fn handle_clean(path: Option<PathBuf>, output_mode: OutputMode) -> anyhow::Result<()> {
    let root = project_root(path)?;
    let config = load_config(&root, &ProjectArgs::default())?;
    let tree = discover(&root, &config, output_mode)?;

    let removed = orchestrator::clean_objects(&tree, output_mode).context("Cleanup failed")?;

    if output_mode != OutputMode::Quiet {
        if removed.is_empty() {
            println!("{}", Theme::muted("No object files to remove"));
        } else {
            println!(
                "{} removed {} object file{}",
                Theme::success("Clean done:"),
                removed.len(),
                if removed.len() == 1 { "" } else { "s" }
            );
        }
    }

    Ok(())
}
