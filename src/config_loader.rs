use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "predictd.toml";
pub const DEFAULT_MODEL_PATH: &str = "models/random_forest_model";

/// Which `/predict` contract this process serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// `?x=<f64>` wrapped as `[[x]]`
    #[default]
    Scalar,
    /// Random row from the reference dataset, label returned as `actual`
    Sample,
}

impl FromStr for ServeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scalar" => Ok(ServeMode::Scalar),
            "sample" => Ok(ServeMode::Sample),
            other => Err(format!("unknown serve mode '{other}' (expected scalar or sample)")),
        }
    }
}

impl fmt::Display for ServeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeMode::Scalar => f.write_str("scalar"),
            ServeMode::Sample => f.write_str("sample"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    #[serde(default)]
    pub mode: ServeMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            mode: ServeMode::Scalar,
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Command-line values layered over file and environment configuration.
#[derive(Debug, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ServeMode>,
}

/// Defaults, then `predictd.toml` (or `$PREDICTD_CONFIG`), then `PREDICTD_*`, then CLI flags.
pub fn load_config(overrides: ConfigOverrides) -> Result<ServiceConfig, figment::Error> {
    let file = std::env::var("PREDICTD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());

    let figment = Figment::from(Serialized::defaults(ServiceConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed("PREDICTD_").ignore(&["config"]))
        .merge(Serialized::defaults(overrides));

    let config: ServiceConfig = figment.extract()?;

    if config.model_path.as_os_str().is_empty() {
        return Err(figment::Error::from("model_path must be set"));
    }

    Ok(config)
}
