use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::llm::summarizer::PromptConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("openai.user_prompt_template must contain the {{transcript}} placeholder")]
    MissingTranscriptPlaceholder,
    #[error("youtube.max_results must be between 1 and 50, got {0}")]
    MaxResultsOutOfRange(u32),
    #[error("channel {0} already exists")]
    ChannelExists(String),
    #[error("channel {0} not found")]
    ChannelNotFound(String),
}

/// One entry of the channel registry. The registry itself lives in the
/// configuration file; the pipeline only ever reads a snapshot of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    20
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; usually left unset here and supplied via
    /// `DATABASE_URL` instead.
    #[serde(default)]
    pub url: Option<String>,
}

/// The application configuration file. All four sections must be present,
/// matching `config.example.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub youtube: YoutubeConfig,
    pub openai: PromptConfig,
    pub database: DatabaseConfig,
    pub channels: Vec<ChannelRecord>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = serde_yaml::to_string(self)?;
        fs::write(path, raw).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Startup validation for a pipeline run. A failure here means the run
    /// never begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.openai.validate()?;
        if !(1..=50).contains(&self.youtube.max_results) {
            return Err(ConfigError::MaxResultsOutOfRange(self.youtube.max_results));
        }
        Ok(())
    }

    pub fn enabled_channels(&self) -> Vec<ChannelRecord> {
        self.channels.iter().filter(|c| c.enabled).cloned().collect()
    }

    pub fn add_channel(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        enabled: bool,
    ) -> Result<(), ConfigError> {
        let id = id.into();
        if self.channels.iter().any(|c| c.id == id) {
            return Err(ConfigError::ChannelExists(id));
        }
        self.channels.push(ChannelRecord {
            id,
            name: name.into(),
            enabled,
        });
        Ok(())
    }

    pub fn remove_channel(&mut self, id: &str) -> Result<(), ConfigError> {
        let before = self.channels.len();
        self.channels.retain(|c| c.id != id);
        if self.channels.len() == before {
            return Err(ConfigError::ChannelNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn set_channel_enabled(&mut self, id: &str, enabled: bool) -> Result<(), ConfigError> {
        self.channel_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn rename_channel(&mut self, id: &str, name: impl Into<String>) -> Result<(), ConfigError> {
        self.channel_mut(id)?.name = name.into();
        Ok(())
    }

    fn channel_mut(&mut self, id: &str) -> Result<&mut ChannelRecord, ConfigError> {
        self.channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ConfigError::ChannelNotFound(id.to_string()))
    }
}
