use crate::config::toml_config::TomlConfig;
use crate::core::sgis::DEFAULT_BASE_URL;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Values supplied on the command line (or through their environment variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_sec: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub output_dir: Option<String>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_sec: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub output_dir: String,
}

impl Settings {
    /// Command-line values win over the config file, which wins over defaults.
    pub fn resolve(overrides: Overrides, file: Option<TomlConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let file_output_dir = file.output_directory().map(str::to_string);
        let sgis = file.sgis;

        let api_key = overrides.api_key.or(sgis.api_key);
        let api_sec = overrides.api_sec.or(sgis.api_sec);

        let settings = Self {
            api_key: validate_required_field("sgis.api_key", &api_key)?.clone(),
            api_sec: validate_required_field("sgis.api_sec", &api_sec)?.clone(),
            base_url: overrides
                .base_url
                .or(sgis.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_seconds: overrides
                .timeout_seconds
                .or(sgis.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            output_dir: overrides
                .output_dir
                .or(file_output_dir)
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("sgis.api_key", &self.api_key)?;
        validate_non_empty_string("sgis.api_sec", &self.api_sec)?;
        validate_url("sgis.base_url", &self.base_url)?;
        validate_range("sgis.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_non_empty_string("output.directory", &self.output_dir)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn api_sec(&self) -> &str {
        &self.api_sec
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }
}
