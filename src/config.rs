//! Configuration management for the OCaml/Reason format server.
//!
//! Formatter settings are layered, lowest precedence first:
//! - User config file (`<config dir>/ocaml-reason-format/config.toml`)
//! - Project config file (`.ocaml-reason-format.toml` in the workspace root)
//! - Command-line arguments
//! - Client settings (`initializationOptions`, `workspace/didChangeConfiguration`)
//!
//! A layer only overrides the fields it sets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::formatter::FormatterCommand;
use crate::language::Language;

/// Key clients nest our settings under
pub const SETTINGS_SECTION: &str = "ocaml-reason-format";

/// Per-project settings file looked up in the workspace root
pub const PROJECT_CONFIG_FILE: &str = ".ocaml-reason-format.toml";

/// Command-line arguments for the format server
#[derive(Debug, Default, Parser)]
#[command(name = "ocaml-reason-format-ls")]
#[command(about = "Language server formatting OCaml and Reason files with external tools")]
#[command(version)]
pub struct Args {
    /// Path to the ocamlformat executable
    #[arg(long, help = "Path to ocamlformat, relative to the workspace root")]
    pub ocamlformat: Option<String>,

    /// Path to the refmt executable
    #[arg(long, help = "Path to refmt, relative to the workspace root")]
    pub refmt: Option<String>,

    /// Workspace root, overriding the one announced by the client
    #[arg(long, help = "Workspace root directory")]
    pub root: Option<PathBuf>,

    /// Directory for staging formatter input and output
    #[arg(long, help = "Scratch directory for temporary files")]
    pub scratch_dir: Option<PathBuf>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Formatter locations and extra arguments.
///
/// Paths may be relative to the workspace root. `*_args` are placed before
/// the file path on the formatter's command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterSettings {
    pub ocamlformat: Option<String>,
    pub ocamlformat_args: Option<Vec<String>>,
    pub refmt: Option<String>,
    pub refmt_args: Option<Vec<String>>,
}

impl FormatterSettings {
    /// Override every field that `other` sets
    pub fn overlay(&mut self, other: &FormatterSettings) {
        if other.ocamlformat.is_some() {
            self.ocamlformat = other.ocamlformat.clone();
        }
        if other.ocamlformat_args.is_some() {
            self.ocamlformat_args = other.ocamlformat_args.clone();
        }
        if other.refmt.is_some() {
            self.refmt = other.refmt.clone();
        }
        if other.refmt_args.is_some() {
            self.refmt_args = other.refmt_args.clone();
        }
    }

    /// Configured formatter path; blank strings count as unset
    pub fn path_for(&self, language: Language) -> Option<&str> {
        let path = match language {
            Language::OCaml => self.ocamlformat.as_deref(),
            Language::Reason => self.refmt.as_deref(),
        };
        path.map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn args_for(&self, language: Language) -> &[String] {
        let args = match language {
            Language::OCaml => self.ocamlformat_args.as_deref(),
            Language::Reason => self.refmt_args.as_deref(),
        };
        args.unwrap_or_default()
    }

    /// Parse settings sent by a client, either nested under
    /// [`SETTINGS_SECTION`] or given at the top level.
    pub fn from_client_value(value: serde_json::Value) -> serde_json::Result<Self> {
        match value {
            serde_json::Value::Object(mut map) if map.contains_key(SETTINGS_SECTION) => {
                match map.remove(SETTINGS_SECTION).unwrap_or_default() {
                    serde_json::Value::Null => Ok(Self::default()),
                    section => serde_json::from_value(section),
                }
            }
            serde_json::Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    /// Load settings from a TOML file; a missing file yields `None`
    pub fn from_toml_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Some(settings))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root set on the command line
    pub cli_root: Option<PathBuf>,
    /// Directory for staging formatter files
    pub scratch_dir: PathBuf,
    /// Log level
    pub log_level: String,
    pub user_settings: FormatterSettings,
    pub project_settings: FormatterSettings,
    pub cli_settings: FormatterSettings,
    pub client_settings: FormatterSettings,
    project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, reading the user config file
    pub fn from_args(args: Args) -> Result<Self> {
        Self::with_user_config(args, default_user_config_path().as_deref())
    }

    /// Create configuration with an explicit user config file (useful for testing)
    pub fn with_user_config(args: Args, user_config: Option<&Path>) -> Result<Self> {
        let user_settings = match user_config {
            Some(path) => FormatterSettings::from_toml_file(path)?.unwrap_or_default(),
            None => FormatterSettings::default(),
        };

        let scratch_dir = args.scratch_dir.unwrap_or_else(default_scratch_dir);

        Ok(Config {
            cli_root: args.root,
            scratch_dir,
            log_level: args.log_level,
            user_settings,
            project_settings: FormatterSettings::default(),
            cli_settings: FormatterSettings {
                ocamlformat: args.ocamlformat,
                refmt: args.refmt,
                ..Default::default()
            },
            client_settings: FormatterSettings::default(),
            project_config_path: None,
        })
    }

    /// Load `.ocaml-reason-format.toml` from the workspace root, if present
    pub fn load_project_config(&mut self, root: &Path) -> Result<bool> {
        let path = root.join(PROJECT_CONFIG_FILE);
        match FormatterSettings::from_toml_file(&path)? {
            Some(settings) => {
                self.project_settings = settings;
                self.project_config_path = Some(path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    /// Replace the settings pushed by the client
    pub fn set_client_settings(&mut self, settings: FormatterSettings) {
        self.client_settings = settings;
    }

    /// Merge all layers into the settings in force
    pub fn effective_settings(&self) -> FormatterSettings {
        let mut settings = self.user_settings.clone();
        settings.overlay(&self.project_settings);
        settings.overlay(&self.cli_settings);
        settings.overlay(&self.client_settings);
        settings
    }

    /// Pick the workspace root: command line, then client, then current directory
    pub fn workspace_root(&self, client_root: Option<&Path>) -> PathBuf {
        let root = self
            .cli_root
            .clone()
            .or_else(|| client_root.map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        std::path::absolute(&root).unwrap_or(root)
    }

    /// Resolve the formatter for a language.
    ///
    /// A configured path is resolved against `root` (absolute paths are kept).
    /// Without one the bare command name is left for PATH lookup at spawn time.
    /// Nothing checks that the executable exists.
    pub fn resolve_formatter(&self, language: Language, root: &Path) -> FormatterCommand {
        let settings = self.effective_settings();
        let program = match settings.path_for(language) {
            Some(configured) => root.join(configured),
            None => PathBuf::from(language.default_command()),
        };
        FormatterCommand {
            program,
            args: settings.args_for(language).to_vec(),
        }
    }
}

fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_SECTION).join("config.toml"))
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join(SETTINGS_SECTION)
}
