// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for ContentFlow.
//!
//! # Loading Pipeline
//!
//! 1. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw file
//! 2. Parse YAML/TOML/JSON into [`ContentFlowConfig`]
//! 3. Apply `CONTENTFLOW_*` environment overrides
//! 4. Resolve relative paths against the config file directory
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! CONTENTFLOW_API_PORT=9090
//! CONTENTFLOW_JWT_SECRET=...
//! CONTENTFLOW_STORE_BACKEND=rest
//! CONTENTFLOW_STORE_URL=https://xyz.supabase.co
//! CONTENTFLOW_STORE_SERVICE_KEY=...
//! CONTENTFLOW_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{ContentFlowConfig, LogFormat, LogLevel, SecretValue, StoreBackend};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// =============================================================================
// EnvSource
// =============================================================================

/// Where environment variables are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment.
    #[default]
    Process,
    /// A fixed set of variables.
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Looks up a variable.
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Map(vars) => vars.get(name).cloned(),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for ContentFlow.
///
/// # Examples
///
/// ```no_run
/// use contentflow_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("contentflow.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Environment variable source.
    env: EnvSource,

    /// Whether to resolve environment variables in values.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: "CONTENTFLOW".to_string(),
            env: EnvSource::Process,
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads environment variables from a fixed map instead of the process.
    pub fn with_env_map(mut self, vars: HashMap<String, String>) -> Self {
        self.env = EnvSource::Map(vars);
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is determined by the extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<ContentFlowConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        if self.resolve_paths {
            self.resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            store = config.store.backend.as_str(),
            port = config.api.port,
            "Effective configuration"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<ContentFlowConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };
        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from defaults and environment overrides only.
    pub fn load_from_env(&self) -> ConfigResult<ContentFlowConfig> {
        let mut config = ContentFlowConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<ContentFlowConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| e.in_file(path))
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports `${VAR_NAME}` and `${VAR_NAME:default}`. An unset variable
    /// without a default is left in place.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (self.env.var(var_name), default_value) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        Ok(result)
    }

    fn env_var(&self, suffix: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        self.env.var(&name).map(|value| (name, value))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut ContentFlowConfig) -> ConfigResult<()> {
        if let Some((name, value)) = self.env_var("API_PORT") {
            config.api.port = value
                .parse()
                .map_err(|_| ConfigError::env(name, "expected valid port number"))?;
        }
        if let Some((name, value)) = self.env_var("API_BIND_ADDRESS") {
            config.api.bind_address = value
                .parse()
                .map_err(|_| ConfigError::env(name, "expected an IP address"))?;
        }

        if let Some((_, value)) = self.env_var("JWT_SECRET") {
            config.jwt.secret = Some(SecretValue::new(value));
        }
        if let Some((_, value)) = self.env_var("JWT_ISSUER") {
            config.jwt.issuer = value;
        }

        if let Some((name, value)) = self.env_var("STORE_BACKEND") {
            config.store.backend = parse_backend(&value)
                .ok_or_else(|| ConfigError::env(name, "expected 'memory' or 'rest'"))?;
        }
        if let Some((_, value)) = self.env_var("STORE_URL") {
            config.store.url = Some(value);
        }
        if let Some((_, value)) = self.env_var("STORE_SERVICE_KEY") {
            config.store.service_key = Some(SecretValue::new(value));
        }
        if let Some((_, value)) = self.env_var("STORE_SEED_PATH") {
            config.store.seed_path = Some(PathBuf::from(value));
        }

        if let Some((_, value)) = self.env_var("LOG_LEVEL") {
            match LogLevel::parse(&value) {
                Some(level) => config.logging.level = level,
                None => warn!("Ignoring unknown log level '{}'", value),
            }
        }
        if let Some((name, value)) = self.env_var("LOG_FORMAT") {
            config.logging.format = parse_log_format(&value).ok_or_else(|| {
                ConfigError::env(name, "expected 'text', 'compact' or 'json'")
            })?;
        }

        Ok(())
    }

    fn resolve_relative_paths(&self, config: &mut ContentFlowConfig, base_path: &Path) {
        if let Some(seed) = config.store.seed_path.as_mut() {
            if seed.is_relative() {
                *seed = base_path.join(&seed);
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    env: Option<EnvSource>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Sets the environment source.
    pub fn env(mut self, env: EnvSource) -> Self {
        self.env = Some(env);
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(base_path) = self.base_path {
            loader.base_path = Some(base_path);
        }
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(env) = self.env {
            loader.env = env;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(resolve_paths) = self.resolve_paths {
            loader.resolve_paths = resolve_paths;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
            None => Err(ConfigError::UnsupportedFormat("(no extension)".to_string())),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<ContentFlowConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::parse(e))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::parse(e))
        }
    }
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::parse(e))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::parse(e))
}

fn parse_backend(value: &str) -> Option<StoreBackend> {
    match value.trim().to_lowercase().as_str() {
        "memory" => Some(StoreBackend::Memory),
        "rest" | "supabase" => Some(StoreBackend::Rest),
        _ => None,
    }
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_lowercase().as_str() {
        "text" | "pretty" => Some(LogFormat::Text),
        "compact" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<ContentFlowConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<ContentFlowConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_env_map(HashMap::new())
    }

    fn test_yaml() -> String {
        format!(
            r#"
api:
  port: 9000
jwt:
  secret: "{SECRET}"
  issuer: contentflow-test
store:
  backend: memory
  seed_path: seed.json
logging:
  level: debug
  format: json
"#
        )
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.jwt.issuer, "contentflow-test");
        assert_eq!(config.jwt.secret.unwrap().raw(), SECRET);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);

        let seed = config.store.seed_path.unwrap();
        assert!(seed.is_absolute() || seed.starts_with(file.path().parent().unwrap()));
        assert!(seed.ends_with("seed.json"));
    }

    #[test]
    fn test_load_toml() {
        let toml = format!(
            r#"
[api]
port = 7000

[jwt]
secret = "{SECRET}"

[store]
backend = "rest"
url = "https://db.example.com"
service_key = "svc"
"#
        );
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.service_key.unwrap().raw(), "svc");
    }

    #[test]
    fn test_load_json_from_str() {
        let json = format!(r#"{{ "jwt": {{ "secret": "{SECRET}", "leeway_secs": 5 }} }}"#);
        let config = isolated().load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.jwt.leeway_secs, 5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = format!(r#"{{ "jwt": {{ "secret": "{SECRET}", "algorithm": "RS256" }} }}"#);
        assert!(isolated().load_from_str(&json, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("config.txt")).is_err());
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_env_placeholders() {
        let loader = isolated().with_env_map(env(&[("DB_URL", "https://db.example.com")]));

        let result = loader
            .resolve_env_placeholders("url: ${DB_URL}\nkey: ${DB_KEY:fallback}\nraw: ${MISSING}")
            .unwrap();
        assert_eq!(
            result,
            "url: https://db.example.com\nkey: fallback\nraw: ${MISSING}"
        );

        let unterminated = loader.resolve_env_placeholders("x: ${OPEN").unwrap();
        assert_eq!(unterminated, "x: ${OPEN");
    }

    #[test]
    fn test_env_overrides() {
        let loader = isolated().with_env_map(env(&[
            ("CONTENTFLOW_API_PORT", "9191"),
            ("CONTENTFLOW_JWT_SECRET", SECRET),
            ("CONTENTFLOW_STORE_BACKEND", "rest"),
            ("CONTENTFLOW_STORE_URL", "https://db.example.com"),
            ("CONTENTFLOW_STORE_SERVICE_KEY", "svc"),
            ("CONTENTFLOW_LOG_LEVEL", "warn"),
        ]));

        let config = loader.load_from_env().unwrap();
        assert_eq!(config.api.port, 9191);
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_override() {
        let loader = isolated().with_env_map(env(&[
            ("CONTENTFLOW_JWT_SECRET", SECRET),
            ("CONTENTFLOW_API_PORT", "not-a-port"),
        ]));

        assert!(matches!(
            loader.load_from_env(),
            Err(ConfigError::Env { .. })
        ));
    }

    #[test]
    fn test_env_prefix() {
        let loader = ConfigLoader::builder()
            .env_prefix("CF")
            .env(EnvSource::Map(env(&[("CF_JWT_SECRET", SECRET)])))
            .build();
        assert!(loader.load_from_env().is_ok());
    }

    #[test]
    fn test_file_not_found() {
        let result = isolated().load("/nonexistent/path/contentflow.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ not json").unwrap();

        match isolated().load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path.as_deref(), Some(file.path()))
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
