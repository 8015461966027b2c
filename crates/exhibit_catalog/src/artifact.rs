//! 展品数据
//!
//! 展品数据由外部提供，这里只做只读查询。缺失或为空的字段按回退文本处理。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, LanguageCode};

/// 没有描述时显示的文本
pub const FALLBACK_DESCRIPTION: &str =
    "Discover the fascinating story behind this remarkable piece";

/// 单个展品的多语言数据
///
/// 键使用原始字符串，未知语言代码不会导致整个文件解析失败。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactData {
    pub audio_urls: HashMap<String, String>,
    pub title: HashMap<String, String>,
    pub description: HashMap<String, String>,
    pub image_url: Option<String>,
}

impl ArtifactData {
    /// 指定语言的音频 URL
    pub fn audio_url(&self, lang: LanguageCode) -> Option<&str> {
        lookup(&self.audio_urls, lang)
    }

    pub fn title(&self, lang: LanguageCode) -> Option<&str> {
        lookup(&self.title, lang)
    }

    pub fn description(&self, lang: LanguageCode) -> Option<&str> {
        lookup(&self.description, lang)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    /// 标题，缺失时为 `Artifact <code>`
    pub fn display_title(&self, lang: LanguageCode, artifact_code: &str) -> String {
        match self.title(lang) {
            Some(title) => title.to_string(),
            None => fallback_title(artifact_code),
        }
    }

    pub fn display_description(&self, lang: LanguageCode) -> &str {
        self.description(lang).unwrap_or(FALLBACK_DESCRIPTION)
    }

    /// 有音频的语言（目录顺序）
    pub fn available_languages(&self) -> Vec<LanguageCode> {
        LanguageCode::ALL
            .into_iter()
            .filter(|lang| self.audio_url(*lang).is_some())
            .collect()
    }
}

pub fn fallback_title(artifact_code: &str) -> String {
    format!("Artifact {}", artifact_code)
}

fn lookup(map: &HashMap<String, String>, lang: LanguageCode) -> Option<&str> {
    map.get(lang.as_str())
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// 展品集合：展品编号 -> 数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactCollection {
    artifacts: BTreeMap<String, ArtifactData>,
}

impl ArtifactCollection {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let collection = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            count = collection.len(),
            "loaded artifact collection"
        );
        Ok(collection)
    }

    pub fn get(&self, code: &str) -> Option<&ArtifactData> {
        self.artifacts.get(code)
    }

    /// 按编号排序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtifactData)> {
        self.artifacts.iter().map(|(code, data)| (code.as_str(), data))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "BT-017": {
            "audio_urls": { "en": "https://cdn.example.org/bt017/en.mp3", "vi": "", "es": "x.mp3" },
            "title": { "en": "Bronze Drum", "vi": "Trống đồng" },
            "description": { "en": "A Dong Son bronze drum." },
            "image_url": "https://cdn.example.org/bt017.jpg"
        },
        "BT-018": {}
    }"#;

    #[test]
    fn test_lookup_and_fallbacks() {
        let collection = ArtifactCollection::from_json(SAMPLE).unwrap();
        let drum = collection.get("BT-017").unwrap();

        assert_eq!(
            drum.audio_url(LanguageCode::En),
            Some("https://cdn.example.org/bt017/en.mp3")
        );
        // 空字符串视为缺失
        assert_eq!(drum.audio_url(LanguageCode::Vi), None);
        assert_eq!(drum.audio_url(LanguageCode::De), None);

        assert_eq!(drum.display_title(LanguageCode::Vi, "BT-017"), "Trống đồng");
        assert_eq!(drum.display_title(LanguageCode::Ja, "BT-017"), "Artifact BT-017");
        assert_eq!(drum.display_description(LanguageCode::Fr), FALLBACK_DESCRIPTION);
        assert_eq!(drum.available_languages(), vec![LanguageCode::En]);
    }

    #[test]
    fn test_empty_artifact_degrades() {
        let collection = ArtifactCollection::from_json(SAMPLE).unwrap();
        let empty = collection.get("BT-018").unwrap();
        assert_eq!(empty.image_url(), None);
        assert!(empty.available_languages().is_empty());
        assert_eq!(empty.display_title(LanguageCode::En, "BT-018"), "Artifact BT-018");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let collection = ArtifactCollection::load(file.path()).unwrap();
        let codes: Vec<_> = collection.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["BT-017", "BT-018"]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ArtifactCollection::from_json("{ not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
