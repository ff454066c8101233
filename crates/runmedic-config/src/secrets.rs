//! API key resolution for the remediation model.
//!
//! Resolution order:
//! 1. `RUNMEDIC_GEMINI_API_KEY`
//! 2. `GOOGLE_API_KEY`
//! 3. Config file (`[remediation] api_key`, plaintext; flagged at load time)

/// Environment variables checked, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["RUNMEDIC_GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the generative API key from the process environment, then config.
pub fn resolve_generative_api_key(config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve_with(|name| std::env::var(name).ok(), config_value)
}

fn resolve_with<F>(lookup: F, config_value: Option<&str>) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    for env_var in API_KEY_ENV_VARS {
        if let Some(value) = lookup(env_var)
            && !value.is_empty()
        {
            return Some(ResolvedSecret {
                value,
                source: SecretSource::EnvVar(env_var.to_string()),
            });
        }
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_var_wins_over_config() {
        let vars = env(&[("GOOGLE_API_KEY", "from-env")]);
        let resolved = resolve_with(|k| vars.get(k).cloned(), Some("from-config")).unwrap();
        assert_eq!(resolved.value, "from-env");
        assert_eq!(
            resolved.source,
            SecretSource::EnvVar("GOOGLE_API_KEY".to_string())
        );
    }

    #[test]
    fn test_specific_env_var_first() {
        let vars = env(&[
            ("GOOGLE_API_KEY", "generic"),
            ("RUNMEDIC_GEMINI_API_KEY", "specific"),
        ]);
        let resolved = resolve_with(|k| vars.get(k).cloned(), None).unwrap();
        assert_eq!(resolved.value, "specific");
    }

    #[test]
    fn test_empty_env_var_falls_through() {
        let vars = env(&[("RUNMEDIC_GEMINI_API_KEY", "")]);
        let resolved = resolve_with(|k| vars.get(k).cloned(), Some("cfg")).unwrap();
        assert_eq!(resolved.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_nothing_found() {
        assert!(resolve_with(|_| None, None).is_none());
        assert!(resolve_with(|_| None, Some("")).is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            SecretSource::EnvVar("GOOGLE_API_KEY".into()).to_string(),
            "env var GOOGLE_API_KEY"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file (plaintext)");
    }
}
