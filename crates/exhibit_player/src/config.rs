//! 播放器配置
//!
//! 配置文件为 TOML，所有字段都有默认值。文件不存在时使用默认配置。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use exhibit_catalog::LanguageCode;
use serde::{Deserialize, Serialize};

use crate::{AutoplayPolicy, EngineConfig};

/// 默认配置文件名（当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "exhibit-player.toml";

/// 配置错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// 元数据就绪后是否自动播放
    pub autoplay: bool,
    /// 进度信号间隔（毫秒）
    pub time_update_interval_ms: u64,
    /// 输出缓冲大小（采样数）
    pub output_buffer_size: usize,
    /// 音量 (0.0 - 1.0)
    pub volume: f32,
    pub default_language: LanguageCode,
    /// 展品数据 JSON 文件
    pub artifacts_path: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            time_update_interval_ms: 250,
            output_buffer_size: 8192,
            volume: 1.0,
            default_language: LanguageCode::En,
            artifacts_path: None,
        }
    }
}

impl PlayerConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 读取配置；`path` 为 None 时尝试默认文件
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content, path)?;
        tracing::info!(path = %path.display(), "loaded player config");
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            autoplay: if self.autoplay {
                AutoplayPolicy::Allow
            } else {
                AutoplayPolicy::Deny
            },
            time_update_interval: Duration::from_millis(self.time_update_interval_ms.max(10)),
            output_buffer_size: self.output_buffer_size.max(1024),
            volume: self.volume.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "autoplay = false\ndefault_language = \"vi\"").unwrap();

        let config = PlayerConfig::load(Some(file.path())).unwrap();
        assert!(!config.autoplay);
        assert_eq!(config.default_language, LanguageCode::Vi);
        assert_eq!(config.time_update_interval_ms, 250);

        let engine = config.engine_config();
        assert_eq!(engine.autoplay, AutoplayPolicy::Deny);
        assert_eq!(engine.time_update_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_engine_config_clamps_values() {
        let config = PlayerConfig {
            volume: 3.0,
            time_update_interval_ms: 0,
            output_buffer_size: 16,
            ..Default::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.volume, 1.0);
        assert_eq!(engine.time_update_interval, Duration::from_millis(10));
        assert_eq!(engine.output_buffer_size, 1024);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "autoplay = \"maybe\"").unwrap();
        assert!(matches!(
            PlayerConfig::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }
}
