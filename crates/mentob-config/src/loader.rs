//! Reading config files.

use std::{fs, path::Path};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid yaml config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid toml config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config extension {0:?} (expected json, jsonc, yaml, yml or toml)")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// On-disk config syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON, with `//` and `/* */` comments allowed.
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the syntax from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" | "jsonc" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// Parse config text in the given syntax. Absent keys take their defaults.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config = match format {
        ConfigFormat::Json => {
            serde_json::from_reader(json_comments::StripComments::new(text.as_bytes()))?
        }
        ConfigFormat::Yaml if text.trim().is_empty() => Config::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        ConfigFormat::Toml => toml::from_str(text)?,
    };
    Ok(config)
}

/// Load a config file, picking the parser from its extension.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let text = fs::read_to_string(path)?;
    parse_config(&text, format)
}
