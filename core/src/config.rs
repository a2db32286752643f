//! Bootstrap configuration.
//!
//! Defaults reproduce the fixed values the original script hard-coded; a TOML
//! file can override any of them for other collectors or mirrored sources.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use vmboot_types::ArtifactSpec;

const LIBRARY_BASE: &str =
    "https://raw.githubusercontent.com/internet-scholar/internet_scholar/master";
const COLLECTOR_BASE: &str = "https://raw.githubusercontent.com/internet-scholar/youtube/master";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Timezone handed to the host clock facility.
    pub timezone: String,
    /// Working directory for downloads and the delegated program. Defaults to
    /// the user home directory; it is assumed to pre-exist and is not created.
    pub workdir: Option<PathBuf>,
    /// System packages installed before anything else (the pip bootstrap).
    pub system_packages: Vec<String>,
    /// Remote files downloaded into the working directory, in order.
    pub artifacts: Vec<ArtifactSpec>,
    /// Local manifest filenames handed to the dependency installer, in order.
    pub manifests: Vec<String>,
    /// Hosts passed to pip's `--trusted-host` certificate override.
    pub trusted_hosts: Vec<String>,
    /// The delegated program.
    pub program: ProgramConfig,
    /// Optional HTTP timeout for artifact downloads. The original configured
    /// none; absent means none.
    pub fetch_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramConfig {
    pub interpreter: String,
    /// Entry file inside the working directory.
    pub entry: String,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            entry: "youtube.py".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        let artifact = |url: String, filename: &str| {
            ArtifactSpec::new(url, filename).expect("default artifact filenames are non-empty")
        };
        Self {
            timezone: "UTC".to_string(),
            workdir: None,
            system_packages: vec!["python3-pip".to_string()],
            artifacts: vec![
                artifact(format!("{LIBRARY_BASE}/requirements.txt"), "requirements.txt"),
                artifact(
                    format!("{LIBRARY_BASE}/internet_scholar.py"),
                    "internet_scholar.py",
                ),
                // Renamed locally so it does not clobber the library manifest.
                artifact(
                    format!("{COLLECTOR_BASE}/requirements.txt"),
                    "youtube_requirements.txt",
                ),
                artifact(format!("{COLLECTOR_BASE}/youtube.py"), "youtube.py"),
            ],
            manifests: vec![
                "requirements.txt".to_string(),
                "youtube_requirements.txt".to_string(),
            ],
            trusted_hosts: vec![
                "pypi.org".to_string(),
                "files.pythonhosted.org".to_string(),
            ],
            program: ProgramConfig::default(),
            fetch_timeout_seconds: None,
        }
    }
}

impl BootstrapConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.expanded())
    }

    /// Default on-disk location, `~/.vmboot/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".vmboot").join("config.toml"))
    }

    /// The resolved working directory. Falls back to the current directory
    /// when no home directory can be determined.
    #[must_use]
    pub fn workdir(&self) -> PathBuf {
        self.workdir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Expand `${VAR}` references in the string-valued fields.
    #[must_use]
    fn expanded(mut self) -> Self {
        for artifact in &mut self.artifacts {
            artifact.url = expand_env_vars(&artifact.url);
        }
        if let Some(workdir) = self.workdir.take() {
            let expanded = expand_env_vars(&workdir.to_string_lossy());
            self.workdir = Some(PathBuf::from(expanded));
        }
        self
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i..].starts_with("${") {
            let start = i + 2;
            if let Some(end_rel) = value[start..].find('}') {
                let end = start + end_rel;
                let var = &value[start..end];
                if !var.is_empty() {
                    let replacement = env::var(var).unwrap_or_default();
                    out.push_str(&replacement);
                }
                i = end + 1;
                continue;
            }
        }

        let ch = value[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}
