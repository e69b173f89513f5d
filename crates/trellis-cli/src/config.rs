use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trellis_syntax::CompileOptions;
use trellis_syntax::compiler::{DEFAULT_CLOSE_FENCE, DEFAULT_OPEN_FENCE};

pub const CONFIG_FILE: &str = ".trellisrc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_open_fence")]
    pub open_fence: String,

    #[serde(default = "default_close_fence")]
    pub close_fence: String,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_true")]
    pub colored: bool,

    #[serde(default)]
    pub verbose: bool,
}

/// One config file as written; absent keys leave the layer below untouched.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    open_fence: Option<String>,
    close_fence: Option<String>,
    format: Option<OutputFormat>,
    colored: Option<bool>,
    verbose: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn default_open_fence() -> String {
    DEFAULT_OPEN_FENCE.to_string()
}

fn default_close_fence() -> String {
    DEFAULT_CLOSE_FENCE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_fence: default_open_fence(),
            close_fence: default_close_fence(),
            format: OutputFormat::default(),
            colored: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Defaults, then `~/.trellisrc`, then `./.trellisrc`.
    pub fn load() -> Result<Self> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), Some(Path::new(CONFIG_FILE)))
    }

    /// Applies the global file and then the local one; missing files are skipped.
    pub fn load_layers(global: Option<&Path>, local: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        for path in [global, local].into_iter().flatten() {
            if path.is_file() {
                config.apply(Self::read_layer(path)?);
            }
        }
        Ok(config)
    }

    /// Load config from a specific file, defaults filling the gaps.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.apply(Self::read_layer(path)?);
        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(open_fence) = layer.open_fence {
            self.open_fence = open_fence;
        }
        if let Some(close_fence) = layer.close_fence {
            self.close_fence = close_fence;
        }
        if let Some(format) = layer.format {
            self.format = format;
        }
        if let Some(colored) = layer.colored {
            self.colored = colored;
        }
        if let Some(verbose) = layer.verbose {
            self.verbose = verbose;
        }
    }

    /// Merge CLI arguments into config
    pub fn merge_cli_args(&mut self, format: Option<OutputFormat>, verbose: bool, no_color: bool) {
        if let Some(format) = format {
            self.format = format;
        }
        if verbose {
            self.verbose = true;
        }
        if no_color {
            self.colored = false;
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            open_fence: self.open_fence.clone(),
            close_fence: self.close_fence.clone(),
        }
    }

    /// Create a default config file
    pub fn create_default(path: &Path) -> Result<()> {
        let default_config = format!(
            r#"# trellis configuration file

# Line prefix that opens a grammar block in a document
open_fence = "{open}"

# Line prefix that closes a grammar block
close_fence = "{close}"

# Output of `trellis parse`: "tree" or "json"
format = "tree"

# Enable colored output in terminal
colored = true

# Log debug details to stderr
verbose = false
"#,
            open = DEFAULT_OPEN_FENCE,
            close = DEFAULT_CLOSE_FENCE,
        );

        fs::write(path, default_config)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Global config location, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() -> Result<()> {
        let dir = TempDir::new()?;
        let config = Config::load_layers(
            Some(&dir.path().join("missing-global")),
            Some(&dir.path().join("missing-local")),
        )?;
        assert_eq!(config, Config::default());
        assert_eq!(config.open_fence, "```trellis");
        Ok(())
    }

    #[test]
    fn test_local_overrides_global() -> Result<()> {
        let dir = TempDir::new()?;
        let global = dir.path().join("global");
        let local = dir.path().join("local");
        fs::write(&global, "format = \"json\"\ncolored = false\nopen_fence = \"~~~g\"\n")?;
        fs::write(&local, "open_fence = \"```grammar\"\n")?;

        let config = Config::load_layers(Some(&global), Some(&local))?;
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.colored);
        assert_eq!(config.open_fence, "```grammar");
        assert_eq!(config.close_fence, "```");
        Ok(())
    }

    #[test]
    fn test_cli_flags_win() {
        let mut config = Config::default();
        config.merge_cli_args(Some(OutputFormat::Json), true, true);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.verbose);
        assert!(!config.colored);
    }

    #[test]
    fn test_invalid_file_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "format = \"xml\"\n")?;

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        Ok(())
    }

    #[test]
    fn test_default_file_round_trips() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE);
        Config::create_default(&path)?;

        assert_eq!(Config::load_from_file(&path)?, Config::default());
        Ok(())
    }
}
