mod loader;
pub mod secrets;
pub mod section;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use section::{ClientConfig, ConfigSection, LogConfig, SearchConfig, SessionConfig};
pub use value::{ConfigValue, FromConfigValue};

#[derive(Debug)]
pub enum ConfigError {
    /// No value under this key (or no such environment variable, for a
    /// placeholder).
    NotFound(String),
    /// A value is present but cannot be read as `expected`.
    TypeMismatch { key: String, expected: &'static str },
    /// A file could not be read or parsed.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing config value `{key}`"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "config value `{key}` is not a valid {expected}")
            }
            ConfigError::Load(msg) => write!(f, "cannot load configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Flat map of dotted keys built from up to five layers, later layers winning:
///
/// | Layer | Source                                         |
/// |-------|------------------------------------------------|
/// | base    | `storefront.yaml`                            |
/// | profile | `storefront-{profile}.yaml`                  |
/// | dotenv  | `.env`, `.env.{profile}` (never overwrite the process env) |
/// | secrets | `${env:VAR}` / `${file:path}` inside string values |
/// | env     | `STOREFRONT_SEARCH_DEBOUNCE_MS` sets `storefront.search.debounce.ms` |
///
/// `STOREFRONT_PROFILE`, when set, beats the profile passed by the caller.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl StorefrontConfig {
    /// Load configuration for the given profile from the current directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Load configuration for the given profile from `dir`, resolving
    /// placeholders with `resolver`.
    pub fn load_from(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let profile = match std::env::var("STOREFRONT_PROFILE") {
            Ok(from_env) if !from_env.is_empty() => from_env,
            _ => profile.to_string(),
        };

        let mut values = HashMap::new();
        let base = loader::merge_yaml_file(&dir.join("storefront.yaml"), &mut values)?;
        let overlay =
            loader::merge_yaml_file(&dir.join(format!("storefront-{profile}.yaml")), &mut values)?;

        for env_file in [dir.join(".env"), dir.join(format!(".env.{profile}"))] {
            if dotenvy::from_path(&env_file).is_ok() {
                tracing::debug!(path = %env_file.display(), "Read dotenv file");
            }
        }

        resolve_string_values(&mut values, resolver)?;
        values.extend(env_overrides(std::env::vars()));

        tracing::debug!(%profile, base, overlay, keys = values.len(), "Configuration loaded");
        Ok(StorefrontConfig { values, profile })
    }

    /// Parse a single YAML document with no file, dotenv or env layers.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::merge_yaml_str(yaml, &mut values)?;
        Ok(StorefrontConfig {
            values,
            profile: profile.to_string(),
        })
    }

    /// Create an empty config; every section falls back to its defaults.
    pub fn empty() -> Self {
        StorefrontConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    /// Override one key, as the highest layer.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Read `key` (for example `storefront.search.debounce.ms`) as `V`.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, returning `default` only when the key is missing.
    /// A present but malformed value is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed section from this config.
    pub fn section<S: ConfigSection>(&self) -> Result<S, ConfigError> {
        S::from_config(self)
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    for value in values.values_mut() {
        if let ConfigValue::String(s) = value {
            if s.contains("${") {
                *s = secrets::resolve_placeholders(s, resolver)?;
            }
        }
    }
    Ok(())
}

fn env_overrides(
    vars: impl Iterator<Item = (String, String)>,
) -> impl Iterator<Item = (String, ConfigValue)> {
    vars.filter(|(name, _)| name.starts_with("STOREFRONT_"))
        .map(|(name, raw)| {
            let key = name.to_ascii_lowercase().split('_').collect::<Vec<_>>().join(".");
            (key, ConfigValue::String(raw))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_map_to_dotted_keys() {
        let vars = vec![
            ("STOREFRONT_SEARCH_DEBOUNCE_MS".to_string(), "50".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let overrides: Vec<_> = env_overrides(vars.into_iter()).collect();
        assert_eq!(
            overrides,
            vec![(
                "storefront.search.debounce.ms".to_string(),
                ConfigValue::String("50".into())
            )]
        );
    }

    #[test]
    fn malformed_value_is_not_defaulted() {
        let config = StorefrontConfig::from_yaml_str("storefront:\n  retries: many\n", "test")
            .unwrap();
        assert!(config.get_or::<u64>("storefront.retries", 3).is_err());
        assert_eq!(config.get_or::<u64>("storefront.missing", 3).unwrap(), 3);
    }
}
