//! exhibit_catalog - 语言目录与展品数据
//!
//! 提供固定的解说语言目录，以及按语言查询展品标题、描述和音频 URL。

mod artifact;
mod language;

pub use artifact::*;
pub use language::*;

/// 目录错误
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),
}
