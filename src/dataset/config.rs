use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::normalize_name;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub global: GlobalConfig,
    pub municipalities: Vec<Municipality>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalConfig {
    /// Root directory for all persisted datasets. Explicit, never derived
    /// from the process environment.
    pub data_dir: PathBuf,
    /// Shape payload URL template with a `{code}` placeholder.
    pub shape_url: String,
    /// Attribute payload URL template with `{code}` and `{var}` placeholders.
    pub variable_url: String,
}

/// One municipality in the shape catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct Municipality {
    pub code: u32,
    pub name: String,
}

impl Municipality {
    /// File-safe key derived from the display name.
    pub fn name_key(&self) -> String {
        normalize_name(&self.name)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn shape_url(&self, code: u32) -> String {
        self.global.shape_url.replace("{code}", &code.to_string())
    }

    pub fn variable_url(&self, code: u32, var_id: u32) -> String {
        self.global
            .variable_url
            .replace("{code}", &code.to_string())
            .replace("{var}", &var_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [global]
            data_dir = "data"
            shape_url = "http://example.com/shapes/{code}.json"
            variable_url = "http://example.com/vars?var={var}&ag={code}xxxxxx"

            [[municipalities]]
            code = 3550308
            name = "São Paulo"
            "#,
        )
        .unwrap();

        assert_eq!(config.municipalities.len(), 1);
        let m = &config.municipalities[0];
        assert_eq!(m.name_key(), "sao_paulo");
        assert_eq!(
            config.shape_url(m.code),
            "http://example.com/shapes/3550308.json"
        );
        assert_eq!(
            config.variable_url(m.code, 12786),
            "http://example.com/vars?var=12786&ag=3550308xxxxxx"
        );
    }
}
