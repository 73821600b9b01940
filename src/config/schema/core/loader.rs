use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load `~/.strandkeep/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_at(&home.join(".strandkeep").join("config.toml"))
    }

    /// Load the config at `config_path`, writing defaults if it is missing.
    /// The workspace directory sits next to the config file.
    pub fn load_or_init_at(config_path: &Path) -> Result<Self> {
        let base_dir = config_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let workspace_dir = base_dir.join("workspace");

        fs::create_dir_all(&workspace_dir).with_context(|| {
            format!(
                "Failed to create workspace directory: {}",
                workspace_dir.display()
            )
        })?;

        if config_path.exists() {
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path = config_path.to_path_buf();
            config.workspace_dir = workspace_dir;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                workspace_dir,
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
