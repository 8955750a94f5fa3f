//! Compiler and linker invocation.
//!
//! The build engine only relies on the [`Toolchain`] contract: list the
//! files a translation unit includes, compile one unit to one object, and
//! link a set of objects into one executable. [`CommandToolchain`] drives a
//! GCC-compatible driver (`g++`, `clang++`) through `std::process::Command`.

use crate::error::{BuildError, Result};
use crate::output::OutputMode;
use crate::theme::Theme;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// Compiler family, used where flags differ between drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFamily {
    Gnu,
    Clang,
}

impl FromStr for CompilerFamily {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gnu" | "gcc" | "g++" => Ok(CompilerFamily::Gnu),
            "clang" | "clang++" | "llvm" => Ok(CompilerFamily::Clang),
            other => Err(BuildError::UnsupportedConfigValue {
                key: "toolchain.family".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Global command-line settings resolved from the config.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub compiler: String,
    pub family: CompilerFamily,
    /// Passed to every compile and dependency-listing invocation
    pub compiler_settings: Vec<String>,
    /// Passed to every link invocation, before the per-executable flags
    pub linker_settings: Vec<String>,
}

/// All paths are relative to the project root.
pub trait Toolchain: Sync {
    /// Run the dependency-listing mode and return its raw stdout.
    fn list_dependencies(&self, source: &Path) -> Result<String>;

    /// Compile `source` into `object` with the given per-unit flags.
    fn compile(&self, source: &Path, object: &Path, flags: &[String]) -> Result<()>;

    /// Link `objects` into `executable` with the given per-executable flags.
    fn link(&self, objects: &[PathBuf], executable: &Path, flags: &[String]) -> Result<()>;
}

/// Toolchain backed by an external compiler driver.
pub struct CommandToolchain {
    settings: ToolSettings,
    root: PathBuf,
    mode: OutputMode,
    echo_dependency_scan: bool,
}

impl CommandToolchain {
    pub fn new(settings: ToolSettings, root: impl Into<PathBuf>, mode: OutputMode) -> Self {
        Self {
            settings,
            root: root.into(),
            mode,
            echo_dependency_scan: false,
        }
    }

    /// Print dependency-listing commands as they run
    pub fn echo_dependency_scan(mut self, echo: bool) -> Self {
        self.echo_dependency_scan = echo;
        self
    }

    pub fn dependency_args(&self, source: &Path) -> Vec<String> {
        let mut args = vec!["-E".to_string(), "-M".to_string()];
        args.extend(self.settings.compiler_settings.iter().cloned());
        args.push(source.to_string_lossy().into_owned());
        args
    }

    pub fn compile_args(&self, source: &Path, object: &Path, flags: &[String]) -> Vec<String> {
        let mut args = vec!["-c".to_string()];
        args.extend(self.settings.compiler_settings.iter().cloned());
        args.extend(flags.iter().cloned());
        args.push(source.to_string_lossy().into_owned());
        args.push("-o".to_string());
        args.push(object.to_string_lossy().into_owned());
        args
    }

    pub fn link_args(&self, objects: &[PathBuf], executable: &Path, flags: &[String]) -> Vec<String> {
        let mut args: Vec<String> = objects
            .iter()
            .map(|o| o.to_string_lossy().into_owned())
            .collect();
        args.push("-o".to_string());
        args.push(executable.to_string_lossy().into_owned());
        args.extend(self.settings.linker_settings.iter().cloned());
        args.extend(flags.iter().cloned());
        args
    }

    /// Run the compiler with `args`, returning stdout.
    ///
    /// Any stderr output counts as failure, warnings included.
    fn run(&self, args: &[String], echo: bool) -> Result<String> {
        let command_line = format!("{} {}", self.settings.compiler, args.join(" "));
        if echo && self.mode != OutputMode::Quiet {
            println!("{}", Theme::command(&command_line));
        }

        let output = Command::new(&self.settings.compiler)
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| BuildError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() || !output.stderr.is_empty() {
            return Err(BuildError::Toolchain {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Toolchain for CommandToolchain {
    fn list_dependencies(&self, source: &Path) -> Result<String> {
        self.run(&self.dependency_args(source), self.echo_dependency_scan)
    }

    fn compile(&self, source: &Path, object: &Path, flags: &[String]) -> Result<()> {
        self.run(&self.compile_args(source, object, flags), true)
            .map(|_| ())
    }

    fn link(&self, objects: &[PathBuf], executable: &Path, flags: &[String]) -> Result<()> {
        self.run(&self.link_args(objects, executable, flags), true)
            .map(|_| ())
    }
}
