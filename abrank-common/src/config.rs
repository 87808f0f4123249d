//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "ABRANK_ROOT_FOLDER";

/// Resolve the root folder in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Locate the configuration file for the platform
fn locate_config_file() -> Result<PathBuf> {
    let candidate = if cfg!(target_os = "linux") {
        // Try ~/.config/abrank/config.toml first, then /etc/abrank/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("abrank").join("config.toml"));
        let system_config = PathBuf::from("/etc/abrank/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    } else {
        dirs::config_dir()
            .map(|d| d.join("abrank").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
    };

    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", candidate)))
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("abrank"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/abrank"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("abrank"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/abrank"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("abrank"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\abrank"))
    } else {
        PathBuf::from("./abrank_data")
    }
}

/// Well-known file locations under the root folder
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// sqlite database holding users and per-user annotations
    pub fn database(&self) -> PathBuf {
        self.root.join("abrank.db")
    }

    /// Source question set (JSON array)
    pub fn questions(&self) -> PathBuf {
        self.root.join("questions.json")
    }

    /// Locally-created questions (JSON array)
    pub fn local_questions(&self) -> PathBuf {
        self.root.join("local_questions.json")
    }

    /// Anonymous-mode annotation map (single JSON document)
    pub fn local_annotations(&self) -> PathBuf {
        self.root.join("local_annotations.json")
    }

    /// Directory of shareable HTML snapshots
    pub fn previews_dir(&self) -> PathBuf {
        self.root.join("previews")
    }

    /// Create the root folder and previews directory if missing
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.previews_dir())?;
        Ok(())
    }
}
