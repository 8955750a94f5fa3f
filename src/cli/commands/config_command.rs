//! Config command feature.
//!
//! This module owns and handles the "tinybuild config" command behavior.

use super::project_root;
use crate::config::Config;
use crate::theme::Theme;
use anyhow::Context;
use std::path::PathBuf;

pub(crate) fn handle_config(show: bool, reset: bool, path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = project_root(path)?;

    if reset {
        let written = Config::default().save(&root)?;
        println!(
            "{} {}",
            Theme::success("Wrote default configuration to"),
            written.display()
        );
        return Ok(());
    }

    if show {
        let config = Config::load(&root)?;
        println!("{}", Theme::header("Current Configuration"));
        println!("{}", Theme::divider_bold(60));
        match config.source_path {
            Some(ref p) => println!("{} {}", Theme::muted("Loaded from:"), p.display()),
            None => println!("{}", Theme::muted("Loaded from: (built-in defaults)")),
        }
        println!();
        let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{}", text);

        let settings = config.tool_settings()?;
        println!("{}", Theme::divider(60));
        println!("Compile line: {} -c {} <flags> <source> -o <object>", settings.compiler, settings.compiler_settings.join(" "));
        println!("Link line:    {} <objects> -o <executable> {} <flags>", settings.compiler, settings.linker_settings.join(" "));
        return Ok(());
    }

    println!("Project config: {}", Config::project_config_path(&root).display());
    match Config::user_config_path() {
        Ok(p) => println!("User config:    {}", p.display()),
        Err(_) => println!("User config:    (unavailable)"),
    }
    println!();
    println!("{}", Theme::muted("Use --show to print the effective configuration or --reset to write defaults"));
    Ok(())
}
