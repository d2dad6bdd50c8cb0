use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Merge the YAML file at `path` into `values`. Returns `false` when the
/// file does not exist.
pub(crate) fn merge_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<bool, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    };
    merge_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "Merged config file");
    Ok(true)
}

/// Merge a YAML document into `values`, one entry per scalar or list leaf,
/// keyed by its dotted path (`storefront.search.debounce.ms`).
pub(crate) fn merge_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let root: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Load(format!("invalid YAML: {e}")))?;

    let mut pending = vec![(String::new(), &root)];
    while let Some((path, node)) = pending.pop() {
        match node {
            serde_yaml::Value::Mapping(map) => {
                for (segment, child) in map {
                    if let Some(segment) = key_segment(segment) {
                        pending.push((join(&path, &segment), child));
                    }
                }
            }
            _ if path.is_empty() => {}
            leaf => {
                values.insert(path, ConfigValue::from_yaml(leaf));
            }
        }
    }
    Ok(())
}

fn key_segment(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_maps_become_dotted_keys() {
        let mut values = HashMap::new();
        merge_yaml_str(
            "storefront:\n  search:\n    debounce:\n      ms: 250\n",
            &mut values,
        )
        .unwrap();
        assert_eq!(
            values.get("storefront.search.debounce.ms"),
            Some(&ConfigValue::Integer(250))
        );
    }

    #[test]
    fn later_documents_override_earlier_keys() {
        let mut values = HashMap::new();
        merge_yaml_str("storefront:\n  endpoint: a\n  token: t\n", &mut values).unwrap();
        merge_yaml_str("storefront:\n  endpoint: b\n", &mut values).unwrap();
        assert_eq!(
            values.get("storefront.endpoint"),
            Some(&ConfigValue::String("b".into()))
        );
        assert!(values.contains_key("storefront.token"));
    }

    #[test]
    fn invalid_yaml_is_a_load_error() {
        let mut values = HashMap::new();
        let err = merge_yaml_str("storefront: [unclosed", &mut values).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn missing_file_is_skipped() {
        let mut values = HashMap::new();
        let read = merge_yaml_file(Path::new("/nonexistent/storefront.yaml"), &mut values);
        assert!(!read.unwrap());
        assert!(values.is_empty());
    }
}
