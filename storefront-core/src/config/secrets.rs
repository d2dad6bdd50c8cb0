use super::ConfigError;

/// Turns the reference inside a `${...}` placeholder into its value.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Resolves `${VAR}` and `${env:VAR}` from the environment and
/// `${file:/path}` from a file, with surrounding whitespace trimmed.
pub struct DefaultSecretResolver;

enum Reference<'a> {
    Env(&'a str),
    File(&'a str),
}

impl<'a> Reference<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some(("file", path)) => Reference::File(path.trim()),
            Some(("env", var)) => Reference::Env(var.trim()),
            _ => Reference::Env(raw.trim()),
        }
    }
}

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        match Reference::parse(reference) {
            Reference::Env(var) => {
                std::env::var(var).map_err(|_| ConfigError::NotFound(var.to_string()))
            }
            Reference::File(path) => std::fs::read_to_string(path)
                .map(|content| content.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("secret file {path}: {e}"))),
        }
    }
}

/// Substitute every `${...}` placeholder in `value`. Resolved text is not
/// scanned again.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let inner = &rest[open + 2..];
        let close = inner
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("unclosed placeholder in `{value}`")))?;
        out.push_str(&resolver.resolve(&inner[..close])?);
        rest = &inner[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SecretResolver for Fixed {
        fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
            Ok(format!("<{reference}>"))
        }
    }

    #[test]
    fn replaces_every_placeholder() {
        let out = resolve_placeholders("Bearer ${a}-${env:b}", &Fixed).unwrap();
        assert_eq!(out, "Bearer <a>-<env:b>");
    }

    #[test]
    fn resolved_text_is_not_rescanned() {
        struct Nested;
        impl SecretResolver for Nested {
            fn resolve(&self, _: &str) -> Result<String, ConfigError> {
                Ok("${again}".into())
            }
        }
        assert_eq!(resolve_placeholders("x${a}y", &Nested).unwrap(), "x${again}y");
    }

    #[test]
    fn unclosed_placeholder_fails() {
        assert!(matches!(
            resolve_placeholders("${oops", &Fixed),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn file_reference_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc123\n").unwrap();
        let out = DefaultSecretResolver
            .resolve(&format!("file:{}", path.display()))
            .unwrap();
        assert_eq!(out, "abc123");
    }
}
