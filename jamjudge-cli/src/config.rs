/// Config file loading and creation for the jamjudge CLI.
///
/// Config lives at ~/.config/jamjudge/config.toml.
/// All fields are optional; CLI args override config values.
use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JamjudgeConfig {
    pub data_dir: Option<PathBuf>,
    pub entries_dir: Option<PathBuf>,
    pub session_size: Option<usize>,
    pub iterations: Option<usize>,
    pub convergence_tolerance: Option<f64>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# jamjudge configuration
# All values here can be overridden by CLI flags.

# Directory holding comparisons.jsonl (default: ~/.local/share/jamjudge)
# data_dir = \"/var/lib/jamjudge\"

# Directory holding one entries file per jam: <jam>.json or <jam>.txt
# (default: <data_dir>/entries)
# entries_dir = \"/var/lib/jamjudge/entries\"

# Comparisons per judging session
# session_size = 10

# Power-iteration steps for rankings
# iterations = 100

# Stop ranking iterations early once the score vector moves less than this.
# Unset = always run the full iteration budget.
# convergence_tolerance = 1e-9
";

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home))
}

/// Returns the default config path: ~/.config/jamjudge/config.toml
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".config").join("jamjudge").join("config.toml"))
}

/// Returns the default data directory: ~/.local/share/jamjudge
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".local").join("share").join("jamjudge"))
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> anyhow::Result<JamjudgeConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(JamjudgeConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read config at {}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("Config file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, JamjudgeConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session_size = 5\nconvergence_tolerance = 1e-9\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.session_size, Some(5));
        assert_eq!(cfg.convergence_tolerance, Some(1e-9));
        assert_eq!(cfg.data_dir, None);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sesion_size = 5\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_default_template_parses_and_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        create_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), JamjudgeConfig::default());
        assert!(create_default_config(&path).is_err());
    }
}
