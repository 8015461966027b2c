//! 应用状态

use std::path::PathBuf;

use exhibit_catalog::{ArtifactCollection, LanguageCode};
use exhibit_player::{AudioEngine, EngineConfig, NarrationPlayer, PlaybackStatus, PlayerConfig};

/// 当前页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// 入口：选择语言
    Welcome,
    /// 展品列表
    Gallery,
    /// 解说播放
    Player,
}

/// 应用状态
pub struct AppState {
    pub route: Route,
    pub language: LanguageCode,
    pub artifacts: ArtifactCollection,
    pub data_path: Option<PathBuf>,
    pub data_error: Option<String>,
    /// 展品编号输入框
    pub code_query: String,
    /// 播放页存在时才有播放器；离开播放页即销毁
    pub player: Option<NarrationPlayer<AudioEngine>>,
    /// 音量 (0.0 - 1.0)
    pub volume: f32,
    config: PlayerConfig,
}

impl AppState {
    pub fn new(config: PlayerConfig) -> Self {
        let mut state = Self {
            route: Route::Welcome,
            language: config.default_language,
            artifacts: ArtifactCollection::default(),
            data_path: None,
            data_error: None,
            code_query: String::new(),
            player: None,
            volume: config.volume.clamp(0.0, 1.0),
            config,
        };
        if let Some(path) = state.config.artifacts_path.clone() {
            state.load_artifacts(path);
        }
        state
    }

    pub fn load_artifacts(&mut self, path: PathBuf) {
        match ArtifactCollection::load(&path) {
            Ok(artifacts) => {
                self.artifacts = artifacts;
                self.data_error = None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load artifacts");
                self.data_error = Some(format!("Could not load {}: {}", path.display(), e));
            }
        }
        self.data_path = Some(path);
    }

    pub fn open_data_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Exhibit data", &["json"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_artifacts(path);
        }
    }

    /// 入口页选择语言后进入展品列表
    pub fn choose_language(&mut self, language: LanguageCode) {
        self.language = language;
        self.route = Route::Gallery;
    }

    /// 打开展品播放页
    pub fn open_artifact(&mut self, code: &str) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }

        // 先销毁旧播放器，再创建新的
        self.player = None;
        let data = self.artifacts.get(code).cloned();
        if data.is_none() {
            tracing::info!(%code, "artifact has no data, showing fallback");
        }

        let engine = match AudioEngine::spawn(EngineConfig {
            volume: self.volume,
            ..self.config.engine_config()
        }) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(error = %e, "cannot open narration player");
                self.data_error = Some(e.to_string());
                return;
            }
        };
        self.player = Some(NarrationPlayer::new(engine, self.language, code, data));
        self.route = Route::Player;
    }

    /// 播放页的语言切换
    pub fn change_language(&mut self, language: LanguageCode) {
        self.language = language;
        if let Some(player) = &mut self.player {
            player.set_language(language);
        }
    }

    /// 返回上一级
    pub fn back(&mut self) {
        self.route = match self.route {
            Route::Player => {
                self.player = None;
                Route::Gallery
            }
            Route::Gallery | Route::Welcome => Route::Welcome,
        };
    }

    /// 返回入口页
    pub fn back_to_home(&mut self) {
        self.player = None;
        self.code_query.clear();
        self.route = Route::Welcome;
    }

    /// 调整音量，同时作用于当前播放器
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(player) = &self.player {
            player.controller().handle().set_volume(self.volume);
        }
    }

    /// 处理播放引擎信号，返回是否需要重绘
    pub fn poll_player(&mut self) -> bool {
        self.player.as_mut().map(|p| p.poll()).unwrap_or(false)
    }

    /// 加载、等待播放结果或播放中需要持续刷新
    pub fn is_animating(&self) -> bool {
        self.player
            .as_ref()
            .is_some_and(|p| needs_repaint(p.controller().status()))
    }
}

fn needs_repaint(status: PlaybackStatus) -> bool {
    matches!(
        status,
        PlaybackStatus::Loading | PlaybackStatus::Ready | PlaybackStatus::Playing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn state_with_data() -> AppState {
        let file = tempfile_json(
            r#"{ "H-02": { "title": { "en": "Celadon Bowl" }, "audio_urls": {} } }"#,
        );
        let config = PlayerConfig {
            artifacts_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let state = AppState::new(config);
        drop(file);
        state
    }

    fn tempfile_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_navigation_between_routes() {
        let mut state = state_with_data();
        assert_eq!(state.route, Route::Welcome);
        assert_eq!(state.artifacts.len(), 1);

        state.choose_language(LanguageCode::Vi);
        assert_eq!(state.route, Route::Gallery);

        state.open_artifact("H-02");
        assert_eq!(state.route, Route::Player);
        let player = state.player.as_ref().unwrap();
        assert_eq!(player.language(), LanguageCode::Vi);
        // 没有越南语音频
        assert_eq!(player.controller().status(), PlaybackStatus::Errored);

        state.back();
        assert_eq!(state.route, Route::Gallery);
        assert!(state.player.is_none());

        state.open_artifact("H-02");
        state.back_to_home();
        assert_eq!(state.route, Route::Welcome);
        assert!(state.player.is_none());
    }

    #[test]
    fn test_change_language_updates_player() {
        let mut state = state_with_data();
        state.open_artifact("H-02");
        state.change_language(LanguageCode::Ja);

        assert_eq!(state.language, LanguageCode::Ja);
        assert_eq!(
            state.player.as_ref().map(|p| p.language()),
            Some(LanguageCode::Ja)
        );
        assert!(!state.is_animating());
    }

    #[test]
    fn test_repaint_while_autoplay_result_pending() {
        assert!(needs_repaint(PlaybackStatus::Loading));
        assert!(needs_repaint(PlaybackStatus::Ready));
        assert!(needs_repaint(PlaybackStatus::Playing));
        assert!(!needs_repaint(PlaybackStatus::Paused));
        assert!(!needs_repaint(PlaybackStatus::Ended));
        assert!(!needs_repaint(PlaybackStatus::Errored));
    }

    #[test]
    fn test_bad_data_file_reports_error() {
        let file = tempfile_json("[1, 2");
        let mut state = AppState::new(PlayerConfig::default());
        state.load_artifacts(file.path().to_path_buf());
        assert!(state.data_error.is_some());
        assert!(state.artifacts.is_empty());
    }
}
