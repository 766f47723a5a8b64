//! Upload configuration: an optional RON file overlaid by command-line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use upload_engine::{TransportSettings, UploadSettings};

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("expected KEY=VALUE, got {0:?}")]
    Pair(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub field_name: String,
    pub fields: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub with_credentials: bool,
    pub multiple: bool,
    /// HTML-style accept list, e.g. `".png, image/*"`.
    pub accept: Option<String>,
    /// Files of this size or larger are skipped.
    pub max_bytes: Option<u64>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let upload = UploadSettings::default();
        let transport = TransportSettings::default();
        Self {
            endpoint: upload.endpoint,
            field_name: upload.field_name,
            fields: upload.fields,
            headers: upload.headers,
            with_credentials: upload.with_credentials,
            multiple: upload.allow_multiple,
            accept: None,
            max_bytes: None,
            connect_timeout_ms: transport.connect_timeout.as_millis() as u64,
            request_timeout_ms: transport.request_timeout.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the file named by `--config` (if any) and applies the other flags on top.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(field_name) = &cli.field_name {
            self.field_name = field_name.clone();
        }
        for raw in &cli.fields {
            let (key, value) = parse_pair(raw)?;
            self.fields.insert(key, value);
        }
        for raw in &cli.headers {
            let (key, value) = parse_pair(raw)?;
            self.headers.insert(key, value);
        }
        if cli.with_credentials {
            self.with_credentials = true;
        }
        if cli.single {
            self.multiple = false;
        }
        if cli.accept.is_some() {
            self.accept = cli.accept.clone();
        }
        if cli.max_bytes.is_some() {
            self.max_bytes = cli.max_bytes;
        }
        Ok(())
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            endpoint: self.endpoint.clone(),
            field_name: self.field_name.clone(),
            fields: self.fields.clone(),
            headers: self.headers.clone(),
            with_credentials: self.with_credentials,
            allow_multiple: self.multiple,
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::Pair(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::Pair(raw.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::{parse_pair, AppConfig, ConfigError};
    use crate::cli::Cli;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.ron");
        fs::write(&path, r#"(endpoint: "https://example.com/up", max_bytes: Some(10))"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.endpoint, "https://example.com/up");
        assert_eq!(config.max_bytes, Some(10));
        assert_eq!(config.field_name, "file");
        assert!(config.multiple);
        assert_eq!(config.request_timeout_ms, 120_000);
    }

    #[test]
    fn flags_override_file_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.ron");
        fs::write(
            &path,
            r#"(
                endpoint: "https://a.example.com/up",
                fields: {"album": "old"},
                headers: {"x-token": "abc"},
            )"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "upload-files",
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "https://b.example.com/up",
            "--field",
            "album=holiday",
            "--single",
            "photo.png",
        ]);
        let config = AppConfig::resolve(&cli).unwrap();
        let settings = config.upload_settings();

        assert_eq!(settings.endpoint, "https://b.example.com/up");
        assert_eq!(settings.fields.get("album").map(String::as_str), Some("holiday"));
        assert_eq!(settings.headers.get("x-token").map(String::as_str), Some("abc"));
        assert!(!settings.allow_multiple);
    }

    #[test]
    fn unreadable_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(&temp.path().join("missing.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let path = temp.path().join("bad.ron");
        fs::write(&path, "(endpoint: 3)").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn pairs_need_a_key_and_equals_sign() {
        assert_eq!(
            parse_pair(" a = b ").unwrap(),
            ("a".to_string(), "b".to_string())
        );
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }
}
