//! 展品解说播放器
//!
//! 由父级提供 (语言, 展品编号, 展品数据)，据此推导当前语言的音频 URL，
//! 并交给 [`PlaybackController`]。展品数据只读。

use exhibit_catalog::{fallback_title, ArtifactData, LanguageCode};

use crate::{MediaHandle, PlaybackController, PlaybackSnapshot};

pub struct NarrationPlayer<H: MediaHandle> {
    language: LanguageCode,
    artifact_code: String,
    artifact: Option<ArtifactData>,
    controller: PlaybackController<H>,
}

impl<H: MediaHandle> NarrationPlayer<H> {
    pub fn new(
        handle: H,
        language: LanguageCode,
        artifact_code: impl Into<String>,
        artifact: Option<ArtifactData>,
    ) -> Self {
        let mut player = Self {
            language,
            artifact_code: artifact_code.into(),
            artifact,
            controller: PlaybackController::new(handle),
        };
        player.sync_source();
        player
    }

    /// 切换语言；音频 URL 变化时开始新会话
    pub fn set_language(&mut self, language: LanguageCode) {
        self.language = language;
        self.sync_source();
    }

    fn sync_source(&mut self) {
        let url = self.audio_url().map(str::to_string);
        self.controller.set_source(url);
    }

    /// 当前语言的音频 URL
    pub fn audio_url(&self) -> Option<&str> {
        self.artifact
            .as_ref()
            .and_then(|artifact| artifact.audio_url(self.language))
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn artifact_code(&self) -> &str {
        &self.artifact_code
    }

    pub fn title(&self) -> String {
        match &self.artifact {
            Some(artifact) => artifact.display_title(self.language, &self.artifact_code),
            None => fallback_title(&self.artifact_code),
        }
    }

    pub fn description(&self) -> &str {
        match &self.artifact {
            Some(artifact) => artifact.display_description(self.language),
            None => exhibit_catalog::FALLBACK_DESCRIPTION,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.artifact.as_ref().and_then(|a| a.image_url())
    }

    pub fn controller(&self) -> &PlaybackController<H> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<H> {
        &mut self.controller
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.controller.snapshot()
    }

    /// 处理资源信号，见 [`PlaybackController::poll`]
    pub fn poll(&mut self) -> bool {
        self.controller.poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{Call, FakeHandle};
    use crate::{PlaybackError, PlaybackStatus, ResourceSignal};
    use std::collections::HashMap;
    use std::time::Duration;

    fn drum() -> ArtifactData {
        ArtifactData {
            audio_urls: HashMap::from([
                ("en".to_string(), "/audio/drum-en.mp3".to_string()),
                ("fr".to_string(), "/audio/drum-fr.mp3".to_string()),
            ]),
            title: HashMap::from([("en".to_string(), "Bronze Drum".to_string())]),
            description: HashMap::new(),
            image_url: Some("/img/drum.jpg".to_string()),
        }
    }

    #[test]
    fn test_language_selects_audio_url() {
        let player = NarrationPlayer::new(FakeHandle::default(), LanguageCode::En, "BT-017", Some(drum()));
        assert_eq!(player.audio_url(), Some("/audio/drum-en.mp3"));
        assert_eq!(player.controller().status(), PlaybackStatus::Loading);
        assert_eq!(player.title(), "Bronze Drum");
        assert_eq!(player.image_url(), Some("/img/drum.jpg"));
    }

    #[test]
    fn test_every_defined_language_loads_and_never_errors() {
        let mut player =
            NarrationPlayer::new(FakeHandle::default(), LanguageCode::En, "BT-017", Some(drum()));
        for lang in [LanguageCode::Fr, LanguageCode::En] {
            player.set_language(lang);
            assert_eq!(player.controller().status(), PlaybackStatus::Loading);

            let id = player.controller().session_id().unwrap();
            player.controller().handle().emit(
                id,
                ResourceSignal::MetadataReady {
                    duration: Some(Duration::from_secs(90)),
                },
            );
            player.poll();
            assert!(matches!(
                player.controller().status(),
                PlaybackStatus::Playing | PlaybackStatus::Paused
            ));
        }
    }

    #[test]
    fn test_language_without_audio_errors_immediately() {
        let mut player =
            NarrationPlayer::new(FakeHandle::default(), LanguageCode::En, "BT-017", Some(drum()));
        player.set_language(LanguageCode::Ko);

        assert_eq!(player.controller().status(), PlaybackStatus::Errored);
        assert_eq!(
            player.controller().error(),
            Some(&PlaybackError::NoAudioForLanguage)
        );
        let loads: Vec<_> = player
            .controller()
            .handle()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Load(..)))
            .collect();
        assert_eq!(loads.len(), 1);
        assert_eq!(player.title(), "Artifact BT-017");
        assert_eq!(player.description(), exhibit_catalog::FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_missing_artifact_data_degrades() {
        let player = NarrationPlayer::new(FakeHandle::default(), LanguageCode::Vi, "X-1", None);
        assert_eq!(player.controller().status(), PlaybackStatus::Errored);
        assert_eq!(player.title(), "Artifact X-1");
        assert_eq!(player.image_url(), None);
    }
}
