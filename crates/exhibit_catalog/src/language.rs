//! 解说语言目录
//!
//! 固定的七种语言，启动后只读。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// 语言代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Vi,
    Zh,
    Ko,
    Ja,
    Fr,
    De,
}

impl LanguageCode {
    /// 目录顺序
    pub const ALL: [LanguageCode; 7] = [
        LanguageCode::En,
        LanguageCode::Vi,
        LanguageCode::Zh,
        LanguageCode::Ko,
        LanguageCode::Ja,
        LanguageCode::Fr,
        LanguageCode::De,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Vi => "vi",
            LanguageCode::Zh => "zh",
            LanguageCode::Ko => "ko",
            LanguageCode::Ja => "ja",
            LanguageCode::Fr => "fr",
            LanguageCode::De => "de",
        }
    }

    /// 本地化显示名
    pub fn display_name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Vi => "Tiếng Việt",
            LanguageCode::Zh => "中文",
            LanguageCode::Ko => "한국어",
            LanguageCode::Ja => "日本語",
            LanguageCode::Fr => "Français",
            LanguageCode::De => "Deutsch",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        LanguageCode::ALL
            .into_iter()
            .find(|lang| lang.as_str() == code)
            .ok_or_else(|| CatalogError::UnknownLanguage(s.to_string()))
    }
}

/// 语言目录：代码 -> 显示名
pub struct LanguageCatalog;

impl LanguageCatalog {
    /// 按目录顺序遍历 (代码, 显示名)
    pub fn entries() -> impl Iterator<Item = (LanguageCode, &'static str)> {
        LanguageCode::ALL
            .into_iter()
            .map(|lang| (lang, lang.display_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_names() {
        let entries: Vec<_> = LanguageCatalog::entries().collect();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0], (LanguageCode::En, "English"));
        assert_eq!(entries[1], (LanguageCode::Vi, "Tiếng Việt"));
        assert_eq!(entries[6], (LanguageCode::De, "Deutsch"));
    }

    #[test]
    fn test_parse_language_code() {
        assert_eq!("ko".parse::<LanguageCode>().unwrap(), LanguageCode::Ko);
        assert_eq!(" JA ".parse::<LanguageCode>().unwrap(), LanguageCode::Ja);
        assert!(matches!(
            "es".parse::<LanguageCode>(),
            Err(CatalogError::UnknownLanguage(code)) if code == "es"
        ));
    }

    #[test]
    fn test_serde_uses_lowercase_codes() {
        let json = serde_json::to_string(&LanguageCode::Fr).unwrap();
        assert_eq!(json, "\"fr\"");
        let lang: LanguageCode = serde_json::from_str("\"zh\"").unwrap();
        assert_eq!(lang, LanguageCode::Zh);
    }
}
