//! Configuration types for lux-query.
//!
//! [`Config::load`] layers the user's `config.toml` over the built-in
//! defaults. [`Config::defaults`] returns the same defaults without touching
//! the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[registry]
# Extra registry documents, merged in order over the built-in one.
extensions = []

[compiler]
clamp_related_levels = true

[labels]
# overrides = "/path/to/labels.json"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

/// `[registry]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub extensions: Vec<PathBuf>,
}

/// `[compiler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_clamp_related_levels")]
    pub clamp_related_levels: bool,
}

fn default_clamp_related_levels() -> bool { true }

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            clamp_related_levels: default_clamp_related_levels(),
        }
    }
}

/// `[labels]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelsConfig {
    /// JSON object of `"<key>": "<label>"` entries that win over the
    /// curated table.
    #[serde(default)]
    pub overrides: Option<PathBuf>,
}

impl Config {
    /// Load `path` (or the default user config file when `None`) over the
    /// built-in defaults. An explicitly named file must exist; the default
    /// one is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_path(), false),
        };
        tracing::debug!(path = %path.display(), required, "config: loading");

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(required))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$XDG_CONFIG_HOME/lux-query/config.toml`, falling back to `~/.config`.
pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("lux-query")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
