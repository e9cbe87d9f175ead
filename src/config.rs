//! Configuration handling for FluxScript including loading and defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing_subscriber::filter::Directive;

use crate::interpreter::DEFAULT_MAX_CALL_DEPTH;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "FLUX_CONFIG";

/// Default configuration path relative to the user's config directory.
const CONFIG_FILE: &str = "fluxscript/config.toml";

/// Configuration model loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FluxConfig {
    /// Maximum nesting of user function calls before the run aborts.
    pub max_call_depth: usize,
    /// Log every executed statement.
    pub trace: bool,
    /// Extra `tracing` filter directive, e.g. `fluxscript::parser=debug`.
    pub log_filter: Option<String>,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
            log_filter: None,
        }
    }
}

impl FluxConfig {
    /// Load configuration from `explicit`, then `$FLUX_CONFIG`, then the user
    /// config directory. Only the last source may be absent.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::load_file(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing configuration {}", path.display()))
    }

    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(data)?;
        if cfg.max_call_depth == 0 {
            anyhow::bail!("max_call_depth must be at least 1");
        }
        cfg.log_directive()?;
        Ok(cfg)
    }

    /// Parsed form of `log_filter`, if one is set.
    pub fn log_directive(&self) -> anyhow::Result<Option<Directive>> {
        self.log_filter
            .as_deref()
            .map(|filter| {
                filter
                    .parse::<Directive>()
                    .with_context(|| format!("invalid log_filter directive '{filter}'"))
            })
            .transpose()
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }
}
