use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Unified diff text, ready for `patch`.
    Text,
    /// The hunks as a JSON document.
    Json,
}

/// Settings for one patch generation run.
///
/// Loaded from an optional TOML file; command-line flags win over it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// The original file.
    pub from: PathBuf,
    /// The new file.
    pub to: PathBuf,
    /// Where the patch is written.
    pub output: PathBuf,
    /// Lines of unchanged context around each change.
    pub context: usize,
    /// Drop very common lines from the match index on large inputs.
    pub autojunk: bool,
    /// Never let blank lines anchor a match.
    pub junk_blank_lines: bool,
    pub format: OutputFormat,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            from: PathBuf::from("input1"),
            to: PathBuf::from("input2"),
            output: PathBuf::from("diff.patch"),
            context: 3,
            autojunk: true,
            junk_blank_lines: false,
            format: OutputFormat::Text,
        }
    }
}

impl DiffConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config file named on the command line (or the defaults), with
    /// every explicit flag applied on top.
    pub fn resolve(cli: &Cli) -> CliResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(from) = &cli.from {
            self.from = from.clone();
        }
        if let Some(to) = &cli.to {
            self.to = to.clone();
        }
        if let Some(output) = &cli.output {
            self.output = output.clone();
        }
        if let Some(context) = cli.context {
            self.context = context;
        }
        if cli.no_autojunk {
            self.autojunk = false;
        }
        if cli.junk_blank_lines {
            self.junk_blank_lines = true;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
    }
}
