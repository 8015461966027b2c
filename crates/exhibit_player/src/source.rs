//! 音源定位与读取
//!
//! 支持本地路径、`file://` 和 `http(s)://`。远程音频一次性下载到内存。

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use symphonia::core::io::MediaSource;

/// 音源错误
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// 解析后的音源位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    File(PathBuf),
    Remote(String),
}

impl MediaLocation {
    pub fn parse(url: &str) -> Result<Self, SourceError> {
        let url = url.trim();
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(MediaLocation::File(PathBuf::from(path)));
        }

        match url.split_once("://") {
            Some((scheme, _)) => match scheme.to_ascii_lowercase().as_str() {
                "http" | "https" => Ok(MediaLocation::Remote(url.to_string())),
                _ => Err(SourceError::UnsupportedScheme(scheme.to_string())),
            },
            None => Ok(MediaLocation::File(PathBuf::from(url))),
        }
    }

    /// 用作解码提示的扩展名（小写）
    pub fn extension_hint(&self) -> Option<String> {
        let path = match self {
            MediaLocation::File(path) => path.as_path(),
            MediaLocation::Remote(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                Path::new(without_query)
            }
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// 打开为 symphonia 可读取的媒体源
    pub fn open(&self) -> Result<Box<dyn MediaSource>, SourceError> {
        match self {
            MediaLocation::File(path) => Ok(Box::new(File::open(path)?)),
            MediaLocation::Remote(url) => {
                let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
                tracing::debug!(%url, len = bytes.len(), "fetched remote narration");
                Ok(Box::new(Cursor::new(bytes.to_vec())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            MediaLocation::parse("/srv/audio/en.mp3").unwrap(),
            MediaLocation::File(PathBuf::from("/srv/audio/en.mp3"))
        );
        assert_eq!(
            MediaLocation::parse("file:///srv/audio/vi.ogg").unwrap(),
            MediaLocation::File(PathBuf::from("/srv/audio/vi.ogg"))
        );
        assert_eq!(
            MediaLocation::parse("HTTPS://cdn.example.org/a.mp3").unwrap(),
            MediaLocation::Remote("HTTPS://cdn.example.org/a.mp3".to_string())
        );
        assert!(matches!(
            MediaLocation::parse("ftp://host/a.mp3"),
            Err(SourceError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }

    #[test]
    fn test_extension_hint_ignores_query() {
        let remote = MediaLocation::parse("https://cdn.example.org/en.MP3?sig=abc").unwrap();
        assert_eq!(remote.extension_hint().as_deref(), Some("mp3"));

        let local = MediaLocation::parse("narration").unwrap();
        assert_eq!(local.extension_hint(), None);
    }

    #[test]
    fn test_open_missing_file() {
        let location = MediaLocation::File(PathBuf::from("/definitely/not/here.mp3"));
        assert!(matches!(location.open(), Err(SourceError::Io(_))));
    }
}
