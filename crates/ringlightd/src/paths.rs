use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG: &str = "RINGLIGHT_CONFIG";
pub const PROFILE_FILE: &str = "ringlight.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "ringlight";
const APPLICATION: &str = "ringlight";

/// Where the profile path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    Flag,
    Environment,
    Default,
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::Flag => f.write_str("--config"),
            ProfileSource::Environment => write!(f, "${ENV_CONFIG}"),
            ProfileSource::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLocation {
    pub path: PathBuf,
    pub source: ProfileSource,
}

impl ProfileLocation {
    /// `--config` wins over `RINGLIGHT_CONFIG`, which wins over the platform
    /// config directory.
    pub fn resolve(flag: Option<&Path>) -> Result<Self> {
        if let Some(path) = flag {
            return Ok(Self {
                path: path.to_path_buf(),
                source: ProfileSource::Flag,
            });
        }
        if let Some(path) = env_override(ENV_CONFIG) {
            return Ok(Self {
                path,
                source: ProfileSource::Environment,
            });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            path: project_dirs.config_dir().join(PROFILE_FILE),
            source: ProfileSource::Default,
        })
    }

    /// A missing file is only an error when the user named it explicitly.
    pub fn is_required(&self) -> bool {
        self.source != ProfileSource::Default
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}
