//! Generator configuration
//!
//! Handles loading of the optional `stepgen.yaml` file. Defaults declared
//! here apply whenever a unit's builders marker leaves an option unset.

use crate::error::{Error, Result};
use crate::model::{Access, BuildersOptions, NullPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "stepgen.yaml";

/// Root configuration (`stepgen.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Output rendering
    #[serde(default)]
    pub render: RenderOptions,

    /// Defaults for options a unit does not set
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOptions {
    /// Emit explanatory comments in generated code
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Emit the provenance header
    #[serde(default = "default_true")]
    pub provenance: bool,

    /// Include a generation timestamp in the provenance header
    #[serde(default)]
    pub timestamp: bool,

    /// Spaces per indentation level
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_true() -> bool {
    true
}

fn default_indent() -> usize {
    4
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            comments: true,
            provenance: true,
            timestamp: false,
            indent: default_indent(),
        }
    }
}

/// Defaults applied below the builders marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub access: Access,

    #[serde(default)]
    pub recycle: bool,

    #[serde(default)]
    pub null_policy: NullPolicy,
}

impl DefaultsConfig {
    /// Fill the unset options of a builders marker
    pub fn apply(&self, options: &BuildersOptions) -> ResolvedOptions {
        ResolvedOptions {
            access: options.access.unwrap_or(self.access),
            recycle: options.recycle.unwrap_or(self.recycle),
            null_policy: options.null_policy.unwrap_or(self.null_policy),
        }
    }
}

/// Unit-wide options after defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub access: Access,
    pub recycle: bool,
    pub null_policy: NullPolicy,
}

impl GeneratorConfig {
    /// Load from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Config(format!("invalid {}: {}", CONFIG_FILE, e)))?;
        if config.render.indent == 0 || config.render.indent > 8 {
            return Err(Error::Config(format!(
                "indent must be between 1 and 8, got {}",
                config.render.indent
            )));
        }
        Ok(config)
    }

    /// Load `stepgen.yaml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
