//! Configuration file management for mealplan.
//!
//! Provides a TOML-based config file at `~/.config/mealplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mealplan_core::config::{PlannerConfig, ProviderKind, ProviderSettings};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub openai: ProviderSection,
    #[serde(default)]
    pub gemini: ProviderSection,
    #[serde(default)]
    pub stages: StagesSection,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model override for this provider only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Which provider serves each stage; unset entries keep the built-in mapping.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StagesSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<ProviderKind>,
}

impl ProviderSection {
    fn apply(&self, settings: &mut ProviderSettings) {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            settings.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            settings.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            settings.model = Some(model.clone());
        }
    }
}

impl ConfigFile {
    /// Layer the file's values over `config`.
    pub fn apply(&self, config: &mut PlannerConfig) {
        if let Some(model) = &self.planner.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.planner.temperature {
            config.temperature = temperature;
        }
        if let Some(strict) = self.planner.strict {
            config.strict = strict;
        }
        self.openai.apply(&mut config.openai);
        self.gemini.apply(&mut config.gemini);
        if let Some(kind) = self.stages.metrics {
            config.stages.metrics = kind;
        }
        if let Some(kind) = self.stages.preferences {
            config.stages.preferences = kind;
        }
        if let Some(kind) = self.stages.synthesis {
            config.stages.synthesis = kind;
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mealplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mealplan` or `~/.config/mealplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealplan")
}

/// Return the path to the mealplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    /// `--strict` can only turn strict mode on.
    pub strict: bool,
}

/// Resolve configuration using the chain: CLI flag > env var > config file > default.
///
/// A missing config file is fine; an unreadable or malformed one is an error.
pub fn resolve(cli: &CliOverrides) -> Result<PlannerConfig> {
    let path = config_path();
    let file = if path.exists() {
        Some(load_config()?)
    } else {
        None
    };
    resolve_with(cli, file.as_ref(), |key| std::env::var(key).ok())
}

/// [`resolve`] with the file and environment supplied by the caller.
pub fn resolve_with<F>(cli: &CliOverrides, file: Option<&ConfigFile>, env: F) -> Result<PlannerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PlannerConfig::default();

    if let Some(file) = file {
        file.apply(&mut config);
    }

    config
        .apply_lookup(env)
        .context("invalid value in environment")?;

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if cli.strict {
        config.strict = true;
    }

    Ok(config)
}

/// Model/provider mismatches in a config file, ignoring the environment.
pub fn model_notes(file: &ConfigFile) -> Vec<String> {
    let mut config = PlannerConfig::default();
    file.apply(&mut config);
    config.model_warnings()
}

/// Show the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
