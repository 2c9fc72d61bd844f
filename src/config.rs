use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub content: ContentConfig,
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Location of the version-controlled working tree that mirrors entry
/// text, one file per slug.
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub root: PathBuf,
}

/// Identity used for commits made on the wiki's behalf.
#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

fn default_author_name() -> String {
    "wicket".to_string()
}

fn default_author_email() -> String {
    "wicket@localhost".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }
    if config.content.root.as_os_str().is_empty() {
        anyhow::bail!("content.root must not be empty");
    }
    if config.git.author_name.trim().is_empty() {
        anyhow::bail!("git.author_name must not be empty");
    }
    if config.git.author_email.trim().is_empty() {
        anyhow::bail!("git.author_email must not be empty");
    }

    Ok(config)
}
