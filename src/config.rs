use crate::error::BuildError;
use crate::toolchain::{CompilerFamily, ToolSettings};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "tinybuild.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub toolchain: Toolchain,

    #[serde(default)]
    pub extensions: Extensions,

    #[serde(default)]
    pub options: Options,

    #[serde(default)]
    pub exclusions: Exclusions,

    /// File this config was read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toolchain {
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Compiler family: "gnu" or "clang".
    #[serde(default = "default_family")]
    pub family: String,

    /// Language standard passed as `-std=<standard>`; empty disables it.
    #[serde(default = "default_standard")]
    pub standard: String,

    #[serde(default = "default_compiler_settings")]
    pub compiler_settings: Vec<String>,

    #[serde(default = "default_warning_settings")]
    pub warning_settings: Vec<String>,

    #[serde(default)]
    pub linker_settings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(default = "default_source_extensions")]
    pub source: Vec<String>,

    #[serde(default = "default_header_extensions")]
    pub header: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Replace the warning settings with `-w`
    #[serde(default)]
    pub ignore_warnings: bool,

    /// Define `NO_GPL` for every translation unit
    #[serde(default)]
    pub no_gpl: bool,

    /// Compile independent objects on the rayon pool
    #[serde(default)]
    pub parallel: bool,

    /// Echo the dependency-listing commands like regular build commands
    #[serde(default)]
    pub show_header_scanning: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exclusions {
    /// Glob patterns matched against project-relative paths
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            extensions: Extensions::default(),
            options: Options::default(),
            exclusions: Exclusions::default(),
            source_path: None,
        }
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            family: default_family(),
            standard: default_standard(),
            compiler_settings: default_compiler_settings(),
            warning_settings: default_warning_settings(),
            linker_settings: Vec::new(),
        }
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            source: default_source_extensions(),
            header: default_header_extensions(),
        }
    }
}

fn default_compiler() -> String { "g++".to_string() }
fn default_family() -> String { "gnu".to_string() }
fn default_standard() -> String { "c++0x".to_string() }
fn default_compiler_settings() -> Vec<String> { vec!["-O3".to_string(), "-DNDEBUG".to_string()] }
fn default_warning_settings() -> Vec<String> { vec!["-Wall".to_string(), "-Wdisabled-optimization".to_string()] }
fn default_source_extensions() -> Vec<String> { vec![".cpp".to_string(), ".cxx".to_string()] }
fn default_header_extensions() -> Vec<String> { vec![".h".to_string(), ".hpp".to_string(), ".hxx".to_string()] }

impl Config {
    /// Per-user config file: `<config dir>/tinybuild/config.toml`
    pub fn user_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "tinybuild")
            .context("Could not determine the user configuration directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Path of the project-local config file (which may not exist yet)
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_CONFIG_FILE)
    }

    /// Load the project config, falling back to the user config, then defaults.
    ///
    /// A config file that exists but does not parse is an error: silently
    /// building with different flags than the user asked for would be worse.
    pub fn load(project_root: &Path) -> Result<Self> {
        let project_path = Self::project_config_path(project_root);
        if project_path.exists() {
            return Self::load_from(&project_path);
        }
        match Self::user_config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Write this config to the project root
    pub fn save(&self, project_root: &Path) -> Result<PathBuf> {
        let path = Self::project_config_path(project_root);

        let toml = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(path)
    }

    /// Apply CLI option overrides. Switches only ever turn options on.
    pub fn apply_cli_overrides(
        &mut self,
        ignore_warnings: Option<bool>,
        no_gpl: Option<bool>,
        parallel: Option<bool>,
        show_header_scanning: Option<bool>,
    ) {
        if let Some(true) = ignore_warnings {
            self.options.ignore_warnings = true;
        }
        if let Some(true) = no_gpl {
            self.options.no_gpl = true;
        }
        if let Some(true) = parallel {
            self.options.parallel = true;
        }
        if let Some(true) = show_header_scanning {
            self.options.show_header_scanning = true;
        }
    }

    /// Resolve the toolchain section into the global command-line settings.
    ///
    /// Unknown compiler families and malformed standards are rejected here,
    /// before any file is touched.
    pub fn tool_settings(&self) -> Result<ToolSettings, BuildError> {
        let family: CompilerFamily = self.toolchain.family.parse()?;

        let standard = self.toolchain.standard.trim();
        let std_flag = if standard.is_empty() {
            None
        } else if standard.starts_with("c++") || standard.starts_with("gnu++") {
            Some(format!("-std={}", standard))
        } else {
            return Err(BuildError::UnsupportedConfigValue {
                key: "toolchain.standard".to_string(),
                value: standard.to_string(),
            });
        };

        let mut compiler_settings = self.toolchain.compiler_settings.clone();
        if self.options.ignore_warnings {
            compiler_settings.push("-w".to_string());
        } else {
            compiler_settings.extend(self.toolchain.warning_settings.iter().cloned());
        }
        if self.options.no_gpl {
            compiler_settings.push("-DNO_GPL".to_string());
        }

        let mut linker_settings = self.toolchain.linker_settings.clone();
        if let Some(flag) = std_flag {
            compiler_settings.push(flag.clone());
            linker_settings.push(flag);
        }

        Ok(ToolSettings {
            compiler: self.toolchain.compiler.clone(),
            family,
            compiler_settings,
            linker_settings,
        })
    }

    /// Source extensions with a leading dot, e.g. `.cpp`
    pub fn source_extensions(&self) -> Vec<String> {
        normalize_extensions(&self.extensions.source)
    }

    pub fn header_extensions(&self) -> Vec<String> {
        normalize_extensions(&self.extensions.header)
    }

    /// Compile the exclusion patterns into a matcher
    pub fn exclusion_set(&self) -> Result<GlobSet, BuildError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclusions.patterns {
            let glob = Glob::new(pattern).map_err(|source| BuildError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| BuildError::Pattern {
            pattern: self.exclusions.patterns.join(", "),
            source,
        })
    }
}

fn normalize_extensions(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(|e| {
            if e.starts_with('.') {
                e.to_string()
            } else {
                format!(".{}", e)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.toolchain.compiler, "g++");
        assert_eq!(config.source_extensions(), vec![".cpp", ".cxx"]);
        assert_eq!(config.header_extensions(), vec![".h", ".hpp", ".hxx"]);
        assert!(!config.options.ignore_warnings);
    }

    #[test]
    fn test_default_tool_settings() {
        let settings = Config::default().tool_settings().unwrap();
        assert_eq!(settings.family, CompilerFamily::Gnu);
        assert_eq!(
            settings.compiler_settings,
            vec!["-O3", "-DNDEBUG", "-Wall", "-Wdisabled-optimization", "-std=c++0x"]
        );
        assert_eq!(settings.linker_settings, vec!["-std=c++0x"]);
    }

    #[test]
    fn test_ignore_warnings_and_no_gpl() {
        let mut config = Config::default();
        config.apply_cli_overrides(Some(true), Some(true), None, None);
        let settings = config.tool_settings().unwrap();
        assert!(settings.compiler_settings.contains(&"-w".to_string()));
        assert!(settings.compiler_settings.contains(&"-DNO_GPL".to_string()));
        assert!(!settings.compiler_settings.contains(&"-Wall".to_string()));
    }

    #[test]
    fn test_overrides_never_turn_options_off() {
        let mut config = Config::default();
        config.options.parallel = true;
        config.apply_cli_overrides(None, Some(false), Some(false), None);
        assert!(config.options.parallel);
        assert!(!config.options.no_gpl);
    }

    #[test]
    fn test_unknown_family_is_fatal() {
        let mut config = Config::default();
        config.toolchain.family = "msvc".to_string();
        let err = config.tool_settings().unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedConfigValue { .. }));
    }

    #[test]
    fn test_bad_standard_is_fatal() {
        let mut config = Config::default();
        config.toolchain.standard = "c99".to_string();
        assert!(config.tool_settings().is_err());

        config.toolchain.standard = String::new();
        let settings = config.tool_settings().unwrap();
        assert!(settings.linker_settings.is_empty());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [toolchain]
            compiler = "clang++"
            family = "clang"

            [extensions]
            source = ["cc"]
            "#,
        )
        .unwrap();
        assert_eq!(config.toolchain.compiler, "clang++");
        assert_eq!(config.toolchain.standard, "c++0x");
        assert_eq!(config.source_extensions(), vec![".cc"]);
        assert_eq!(config.header_extensions(), vec![".h", ".hpp", ".hxx"]);
    }

    #[test]
    fn test_load_project_config_and_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.exclusions.patterns.push("third_party/**".to_string());
        let path = config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.source_path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.exclusions.patterns, vec!["third_party/**"]);
    }

    #[test]
    fn test_unparsable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[toolchain\ncompiler=").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_exclusion_patterns() {
        let mut config = Config::default();
        config.exclusions.patterns.push("third_party/**".to_string());
        let set = config.exclusion_set().unwrap();
        assert!(set.is_match("third_party/zlib/inflate.cpp"));
        assert!(!set.is_match("src/main.cpp"));
    }
}
