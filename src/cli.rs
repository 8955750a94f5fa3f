use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::output::OutputMode;

#[derive(Parser)]
#[command(name = "tinybuild")]
#[command(version)]
#[command(about = "Incremental C++ builds without a build file")]
#[command(
    long_about = "tinybuild finds every C++ source file under a directory, works out what \
    each one depends on from the headers it includes, and rebuilds only what changed.\n\n\
    Any source file with an `int main(` is built into an executable next to it, unless it \
    contains a `// do not build` comment.\n\n\
    Per-file flags are set with comments in the source:\n  \
    // compile with <flags>          flags for this file only\n  \
    // compile related with <flags>  flags for files that include this file's header\n  \
    // compile all with <flags>      flags for everything linked together with this file\n  \
    // link with <flags>             linker flags for executables containing this file\n\n\
    Examples:\n  \
    tinybuild                      # Build everything in the current directory\n  \
    tinybuild build -v             # Explain what gets rebuilt and why\n  \
    tinybuild build --clean        # Build, then remove object files\n  \
    tinybuild deps --json          # Dump the dependency analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Options shared by every command that analyzes the project
#[derive(Args, Clone, Debug, Default)]
pub struct ProjectArgs {
    /// Project root (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Use -w instead of the configured warning flags
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Define NO_GPL for every file
    #[arg(long)]
    pub no_gpl: bool,

    /// Print the dependency-listing command for every file
    #[arg(long)]
    pub show_header_scanning: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link everything that is out of date (default)
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Remove object files after building
        #[arg(long)]
        clean: bool,

        /// Compile independent objects in parallel
        #[arg(short = 'j', long)]
        parallel: bool,

        /// Output the build report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Remove the object files of every source file
    #[command(visible_alias = "c")]
    Clean {
        /// Project root (default: current directory)
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Show includes, dependencies, link sets and flags of every file
    #[command(visible_alias = "d")]
    Deps {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output the analysis as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// View or reset the project configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration to the project root
        #[arg(long)]
        reset: bool,

        /// Project root (default: current directory)
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn run(self) -> anyhow::Result<()> {
        let output_mode = OutputMode::from_flags(self.quiet, self.verbose);

        match self.command {
            // No command: plain build of the current directory
            None => commands::build_command::handle_build(
                ProjectArgs::default(),
                false,
                false,
                false,
                output_mode,
            ),
            Some(Commands::Build {
                project,
                clean,
                parallel,
                json,
            }) => commands::build_command::handle_build(project, clean, parallel, json, output_mode),
            Some(Commands::Clean { path }) => commands::clean_command::handle_clean(path, output_mode),
            Some(Commands::Deps { project, json }) => {
                commands::deps_command::handle_deps(project, json, output_mode)
            }
            Some(Commands::Config { show, reset, path }) => {
                commands::config_command::handle_config(show, reset, path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_flags_parse() {
        let cli = Cli::try_parse_from([
            "tinybuild",
            "build",
            "--path",
            "proj",
            "--ignore-warnings",
            "--clean",
            "-j",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Build {
                project,
                clean,
                parallel,
                json,
            }) => {
                assert_eq!(project.path, Some(PathBuf::from("proj")));
                assert!(project.ignore_warnings);
                assert!(!project.no_gpl);
                assert!(clean && parallel && !json);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["tinybuild", "-q"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.quiet);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tinybuild", "-q", "-v"]).is_err());
    }
}
