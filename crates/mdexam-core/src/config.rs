//! mdexam configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::shuffle::ShuffleOptions;

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "MDEXAM_DATA_DIR";

/// Top-level mdexam configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdexamConfig {
    /// Root of the exam and result store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Present questions in random order.
    #[serde(default = "default_true")]
    pub shuffle_questions: bool,
    /// Present each question's choices in random order.
    #[serde(default = "default_true")]
    pub shuffle_choices: bool,
    /// Show only missed questions in the review after an attempt.
    #[serde(default)]
    pub missed_only_review: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./mdexam-data")
}
fn default_true() -> bool {
    true
}

impl Default for MdexamConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            shuffle_questions: true,
            shuffle_choices: true,
            missed_only_review: false,
        }
    }
}

impl MdexamConfig {
    pub fn shuffle_options(&self) -> ShuffleOptions {
        ShuffleOptions {
            questions: self.shuffle_questions,
            choices: self.shuffle_choices,
        }
    }

    /// Apply `${VAR}` expansion and the `MDEXAM_DATA_DIR` override using
    /// `lookup` for variable values.
    fn resolve_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        } else {
            let raw = self.data_dir.to_string_lossy().into_owned();
            self.data_dir = PathBuf::from(resolve_env_vars(&raw, &lookup));
        }
        self
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to nothing.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = lookup(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mdexam.toml` in the current directory
/// 2. `~/.config/mdexam/config.toml`
///
/// `MDEXAM_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<MdexamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MdexamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mdexam.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MdexamConfig::default(),
    };

    Ok(config.resolve_with(|key| std::env::var(key).ok()))
}

/// Parse a TOML config document.
pub fn parse_config(content: &str) -> Result<MdexamConfig> {
    Ok(toml::from_str::<MdexamConfig>(content)?)
}

/// Starter config written by `mdexam init`.
pub fn default_config_toml() -> String {
    r#"# mdexam configuration

# Where exams and results are stored. ${VAR} references are expanded.
data_dir = "./mdexam-data"

# Randomize question order and choice order for each attempt.
shuffle_questions = true
shuffle_choices = true

# Show only missed questions in the review after an attempt.
missed_only_review = false
"#
    .to_string()
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mdexam"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn resolve_env_vars_basic() {
        let vars = lookup(&[("HOME_DIR", "/home/me")]);
        assert_eq!(resolve_env_vars("${HOME_DIR}", &vars), "/home/me");
        assert_eq!(
            resolve_env_vars("${HOME_DIR}/exams", &vars),
            "/home/me/exams"
        );
        assert_eq!(resolve_env_vars("${MISSING}/x", &vars), "/x");
        assert_eq!(resolve_env_vars("${unterminated", &vars), "${unterminated");
    }

    #[test]
    fn default_config() {
        let config = MdexamConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./mdexam-data"));
        assert_eq!(config.shuffle_options(), ShuffleOptions::default());
        assert!(!config.missed_only_review);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config = parse_config("shuffle_choices = false\n").unwrap();
        assert!(config.shuffle_questions);
        assert!(!config.shuffle_choices);
        assert_eq!(config.data_dir, PathBuf::from("./mdexam-data"));
    }

    #[test]
    fn starter_config_parses_to_defaults() {
        assert_eq!(
            parse_config(&default_config_toml()).unwrap(),
            MdexamConfig::default()
        );
    }

    #[test]
    fn data_dir_expands_variables() {
        let config = parse_config("data_dir = \"${BASE}/mdexam\"").unwrap();
        let resolved = config.resolve_with(lookup(&[("BASE", "/srv")]));
        assert_eq!(resolved.data_dir, PathBuf::from("/srv/mdexam"));
    }

    #[test]
    fn env_override_wins() {
        let config = parse_config("data_dir = \"/from/file\"").unwrap();
        let resolved = config.resolve_with(lookup(&[(DATA_DIR_ENV, "/from/env")]));
        assert_eq!(resolved.data_dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "missed_only_review = true\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert!(config.missed_only_review);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "shuffle_questions = \"maybe\"").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
