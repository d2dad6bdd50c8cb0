use super::ConfigError;

/// A single configuration value, as read from YAML or the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub(crate) fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Self::Null,
            Yaml::Bool(b) => Self::Bool(*b),
            Yaml::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::String(n.to_string())),
            Yaml::String(s) => Self::String(s.clone()),
            Yaml::Sequence(items) => Self::List(items.iter().map(Self::from_yaml).collect()),
            Yaml::Tagged(tagged) => Self::from_yaml(&tagged.value),
            // Maps nested inside lists have no dotted key to live under.
            Yaml::Mapping(_) => Self::Null,
        }
    }
}

/// Conversion from a `ConfigValue` into a concrete type.
#[diagnostic::on_unimplemented(
    message = "config keys cannot be read as `{Self}`",
    label = "no `FromConfigValue` impl",
    note = "readable types are String, i64, u64, bool and Option<T>"
)]
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn mismatch(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::String(s) => Ok(s.clone()),
            ConfigValue::Integer(i) => Ok(i.to_string()),
            ConfigValue::Float(f) => Ok(f.to_string()),
            ConfigValue::Bool(b) => Ok(b.to_string()),
            _ => Err(mismatch(key, "String")),
        }
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Integer(i) => Ok(*i),
            ConfigValue::String(s) => s.trim().parse().map_err(|_| mismatch(key, "i64")),
            _ => Err(mismatch(key, "i64")),
        }
    }
}

impl FromConfigValue for u64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Integer(i) => u64::try_from(*i).map_err(|_| mismatch(key, "u64")),
            ConfigValue::String(s) => s.trim().parse().map_err(|_| mismatch(key, "u64")),
            _ => Err(mismatch(key, "u64")),
        }
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Bool(b) => Ok(*b),
            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(mismatch(key, "bool")),
            },
            _ => Err(mismatch(key, "bool")),
        }
    }
}

impl<T: FromConfigValue> FromConfigValue for Option<T> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Null => Ok(None),
            other => T::from_config_value(other, key).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_rejects_negative() {
        let err = u64::from_config_value(&ConfigValue::Integer(-1), "k").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { expected: "u64", .. }));
    }

    #[test]
    fn bool_parses_env_spellings() {
        for raw in ["true", "1", "YES", "on"] {
            assert!(bool::from_config_value(&ConfigValue::String(raw.into()), "k").unwrap());
        }
        assert!(!bool::from_config_value(&ConfigValue::String("off".into()), "k").unwrap());
    }

    #[test]
    fn option_of_null_is_none() {
        let v: Option<String> = Option::from_config_value(&ConfigValue::Null, "k").unwrap();
        assert!(v.is_none());
    }
}
