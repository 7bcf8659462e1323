use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "KUBECTL_PEEK_CONFIG";

/// Defaults read from the optional config file. Command-line flags win.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub output: Option<String>,
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PeekConfigFile {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default, alias = "o")]
    output: Option<String>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl RuntimeConfig {
    pub fn discover() -> Result<Self> {
        match discover_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let parsed: PeekConfigFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        let aliases = parsed
            .aliases
            .into_iter()
            .map(|(alias, target)| (alias.to_ascii_lowercase(), target))
            .collect::<HashMap<_, _>>();

        Ok(Self {
            source: Some(path.display().to_string()),
            limit: parsed.limit,
            output: parsed.output,
            aliases,
        })
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(".kubectl-peek.yaml");
    if local.exists() {
        return Some(local);
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kubectl-peek/config.yaml"),
            PathBuf::from(&home).join(".config/kubectl-peek/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_defaults_and_lowercases_aliases() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "limit: 25\noutput: wide\naliases:\n  Web: deployments.apps\n  crt: certificates.cert-manager.io\n",
        )
        .unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.limit, Some(25));
        assert_eq!(config.output.as_deref(), Some("wide"));
        assert_eq!(
            config.aliases.get("web").map(String::as_str),
            Some("deployments.apps")
        );
        assert_eq!(config.source, Some(path.display().to_string()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "limt: 5\n").unwrap();

        let error = RuntimeConfig::load(&path).unwrap_err();
        assert!(format!("{error:#}").contains("failed to parse config"));
    }

    #[test]
    fn missing_file_is_an_error_when_named_explicitly() {
        let dir = TempDir::new().unwrap();
        assert!(RuntimeConfig::load(&dir.path().join("absent.yaml")).is_err());
    }
}
