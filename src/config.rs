//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/patternkit/patternkit.toml`
//! 3. Local config: `--config <file>`, or `./.patternkit.toml` when present
//! 4. Environment variables: `PATTERNKIT_<SECTION>__<KEY>`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Approver, DEFAULT_INDENT_STEP, MAX_INDENT_STEP};

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "PATTERNKIT";

/// File name of the local config looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".patternkit.toml";

/// Largest accepted `spawner.first_id`; keeps the identifier space far from
/// exhaustion and inside the TOML integer range.
pub const MAX_FIRST_ID: u64 = u32::MAX as u64;

/// One position in the approval chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproverConfig {
    pub title: String,
    pub limit: f64,
}

impl ApproverConfig {
    pub fn new(title: impl Into<String>, limit: f64) -> Self {
        Self {
            title: title.into(),
            limit,
        }
    }
}

/// Responsibility chain settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// Currency label printed next to amounts
    pub currency: String,
    /// Approvers in chain order; limits should not decrease
    pub approvers: Vec<ApproverConfig>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            currency: "RM".into(),
            approvers: vec![
                ApproverConfig::new("TeamLead", 1_000.0),
                ApproverConfig::new("Manager", 5_000.0),
                ApproverConfig::new("Director", 50_000.0),
                ApproverConfig::new("CEO", 200_000.0),
            ],
        }
    }
}

impl ChainConfig {
    /// Convert the configured approvers into validated domain handlers.
    pub fn build_approvers(&self) -> ApplicationResult<Vec<Approver>> {
        if self.approvers.is_empty() {
            return Err(ApplicationError::Config {
                message: "chain.approvers must name at least one approver".into(),
            });
        }
        self.approvers
            .iter()
            .enumerate()
            .map(|(i, a)| {
                Approver::new(a.title.clone(), a.limit).map_err(|e| ApplicationError::Config {
                    message: format!("chain.approvers[{}]: {}", i, e),
                })
            })
            .collect()
    }
}

/// Prototype spawner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpawnerConfig {
    /// First identifier handed out, `1..=MAX_FIRST_ID` (`#0` marks unplaced templates)
    pub first_id: u64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self { first_id: 1 }
    }
}

/// Hierarchy rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Columns a child is indented relative to its group, at most 16
    pub indent_step: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_step: DEFAULT_INDENT_STEP,
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a layer only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub chain: RawChainConfig,
    pub spawner: RawSpawnerConfig,
    pub render: RawRenderConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawChainConfig {
    pub currency: Option<String>,
    pub approvers: Option<Vec<ApproverConfig>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSpawnerConfig {
    pub first_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderConfig {
    pub indent_step: Option<usize>,
}

/// Unified configuration for patternkit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub chain: ChainConfig,
    pub spawner: SpawnerConfig,
    pub render: RenderConfig,
}

/// Get the XDG config directory for patternkit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "patternkit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("patternkit.toml"))
}

/// Get the path of the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Environment source for `PATTERNKIT_*` overrides.
///
/// `PATTERNKIT_CHAIN__CURRENCY=EUR` sets `chain.currency`.
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Read `key` from an env-backed config, distinguishing "unset" from "invalid".
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> ApplicationResult<Option<T>> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{}_{}: {}", ENV_PREFIX, key.replace('.', "__").to_uppercase(), e),
        }),
    }
}

impl Settings {
    /// Overlay a parsed config file onto self.
    ///
    /// Scalars replace when present; a layer that names `chain.approvers`
    /// replaces the whole list.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            chain: ChainConfig {
                currency: overlay
                    .chain
                    .currency
                    .clone()
                    .unwrap_or_else(|| self.chain.currency.clone()),
                approvers: overlay
                    .chain
                    .approvers
                    .clone()
                    .unwrap_or_else(|| self.chain.approvers.clone()),
            },
            spawner: SpawnerConfig {
                first_id: overlay.spawner.first_id.unwrap_or(self.spawner.first_id),
            },
            render: RenderConfig {
                indent_step: overlay.render.indent_step.unwrap_or(self.render.indent_step),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given. When
    ///   `None`, `./.patternkit.toml` is used if present.
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        let local = match local {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .map(|cwd| local_config_path(&cwd))
                .filter(|path| path.exists()),
        };
        let global = global_config_path().filter(|path| path.exists());

        Self::load_from(global.as_deref(), local.as_deref(), env_source())
    }

    /// Load settings from explicit layers.
    ///
    /// Both files are required to exist when given.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(path) = global {
            debug!("loading global config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 3. Local config
        if let Some(path) = local {
            debug!("loading local config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, env)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<String>(&config, "chain.currency")? {
            settings.chain.currency = val;
        }
        if let Some(val) = env_value::<u64>(&config, "spawner.first_id")? {
            settings.spawner.first_id = val;
        }
        if let Some(val) = env_value::<usize>(&config, "render.indent_step")? {
            settings.render.indent_step = val;
        }

        Ok(settings)
    }

    /// Reject settings the demos cannot run with.
    pub fn validate(&self) -> ApplicationResult<()> {
        self.chain.build_approvers()?;
        if !(1..=MAX_FIRST_ID).contains(&self.spawner.first_id) {
            return Err(ApplicationError::Config {
                message: format!(
                    "spawner.first_id must be between 1 and {} (got {})",
                    MAX_FIRST_ID, self.spawner.first_id
                ),
            });
        }
        if self.render.indent_step > MAX_INDENT_STEP {
            return Err(ApplicationError::Config {
                message: format!(
                    "render.indent_step must be at most {} (got {})",
                    MAX_INDENT_STEP, self.render.indent_step
                ),
            });
        }
        Ok(())
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
