//! 播放控制器
//!
//! 持有唯一的播放会话，驱动媒体句柄完成加载、自动播放、暂停、重播和结束。
//! 控制器本身是单线程的：资源信号经 channel 排队，由 UI 循环调用
//! [`PlaybackController::poll`] 逐个处理。

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::{
    format_time, format_total, progress_percentage, MediaHandle, PendingPlay, PlayOrigin,
    PlaybackStatus, ResourceSignal, SessionId, SessionSignal, SignalBinding,
};

/// 会话级错误，切换语言即可恢复
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Audio not available for this language.")]
    NoAudioForLanguage,
    #[error("Audio failed to load: {0}")]
    ResourceLoadFailed(String),
}

/// 当前状态不允许该操作
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("playback controls are disabled while {0:?}")]
    Disabled(PlaybackStatus),
}

/// 供 UI 渲染的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub current_time: f64,
    pub duration: f64,
    pub error: Option<PlaybackError>,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.current_time, self.duration)
    }

    pub fn current_label(&self) -> String {
        format_time(self.current_time)
    }

    pub fn total_label(&self) -> String {
        format_total(self.duration)
    }
}

struct Session {
    id: SessionId,
    source_url: Option<String>,
    status: PlaybackStatus,
    current_time: f64,
    duration: f64,
    error: Option<PlaybackError>,
    pending_play: Option<PendingPlay>,
    _binding: Option<SignalBinding>,
}

impl Session {
    fn new(id: SessionId, source_url: Option<String>) -> Self {
        Self {
            id,
            source_url,
            status: PlaybackStatus::Idle,
            current_time: 0.0,
            duration: 0.0,
            error: None,
            pending_play: None,
            _binding: None,
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!(session = %self.id, from = ?self.status, to = ?status, "playback transition");
            self.status = status;
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        self.pending_play = None;
        self.error = Some(error);
        self.set_status(PlaybackStatus::Errored);
    }
}

/// 播放控制器
pub struct PlaybackController<H: MediaHandle> {
    handle: H,
    signal_tx: Sender<SessionSignal>,
    signal_rx: Receiver<SessionSignal>,
    next_session: u64,
    session: Option<Session>,
}

impl<H: MediaHandle> PlaybackController<H> {
    pub fn new(handle: H) -> Self {
        let (signal_tx, signal_rx) = unbounded();
        Self {
            handle,
            signal_tx,
            signal_rx,
            next_session: 1,
            session: None,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// 切换音源；与当前音源相同时不做任何事
    ///
    /// 旧会话的监听器先被摘除，然后才挂接新会话。
    pub fn set_source(&mut self, source_url: Option<String>) {
        let source_url = source_url.filter(|url| !url.trim().is_empty());
        if let Some(session) = &self.session {
            if session.source_url == source_url {
                return;
            }
        }

        self.teardown();

        let id = SessionId::new(self.next_session);
        self.next_session += 1;
        let mut session = Session::new(id, source_url.clone());

        match source_url {
            Some(url) => {
                info!(session = %id, url = %url, "loading narration");
                session._binding = Some(self.handle.attach(id, self.signal_tx.clone()));
                session.set_status(PlaybackStatus::Loading);
                self.handle.load(id, &url);
            }
            None => {
                info!(session = %id, "no narration for this language");
                session.fail(PlaybackError::NoAudioForLanguage);
            }
        }

        self.session = Some(session);
    }

    /// 销毁当前会话并停止资源
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            let had_source = session.source_url.is_some();
            drop(session);
            if had_source {
                self.handle.unload();
            }
        }
    }

    /// 处理排队的资源信号和已返回的播放请求，返回是否有状态变化
    pub fn poll(&mut self) -> bool {
        let before = self.snapshot();

        // 播放结果先于同一轮的信号生效，元数据触发的自动播放在信号之后结算
        self.resolve_pending_play();
        let signals: Vec<_> = self.signal_rx.try_iter().collect();
        for signal in signals {
            self.handle_signal(signal);
        }
        self.resolve_pending_play();

        self.snapshot() != before
    }

    fn handle_signal(&mut self, message: SessionSignal) {
        let Some(session) = self.session.as_mut() else {
            debug!(session = %message.session, "dropping signal without a live session");
            return;
        };
        if message.session != session.id {
            debug!(
                stale = %message.session,
                live = %session.id,
                "dropping signal from a torn-down session"
            );
            return;
        }

        match message.signal {
            ResourceSignal::MetadataReady { duration } => {
                if session.status != PlaybackStatus::Loading {
                    return;
                }
                session.duration = duration.map(|d| d.as_secs_f64()).unwrap_or(0.0);
                session.error = None;
                session.set_status(PlaybackStatus::Ready);
                session.pending_play = Some(self.handle.play(session.id, PlayOrigin::Autoplay));
            }
            ResourceSignal::TimeUpdate { position } => {
                if matches!(
                    session.status,
                    PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused
                ) {
                    session.current_time = position.as_secs_f64();
                }
            }
            ResourceSignal::Error(reason) => {
                if matches!(session.status, PlaybackStatus::Idle | PlaybackStatus::Errored) {
                    return;
                }
                warn!(session = %session.id, %reason, "narration failed to load");
                session.fail(PlaybackError::ResourceLoadFailed(reason));
            }
            ResourceSignal::Ended => {
                if matches!(
                    session.status,
                    PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused
                ) {
                    session.pending_play = None;
                    session.current_time = 0.0;
                    session.set_status(PlaybackStatus::Ended);
                }
            }
        }
    }

    fn resolve_pending_play(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(outcome) = session.pending_play.as_ref().and_then(|p| p.try_resolve()) else {
            return;
        };
        let Some(pending) = session.pending_play.take() else {
            return;
        };
        if pending.session() != session.id {
            return;
        }

        match outcome {
            Ok(()) => {
                if matches!(
                    session.status,
                    PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused
                ) {
                    session.set_status(PlaybackStatus::Playing);
                }
            }
            Err(rejected) => {
                match pending.origin() {
                    PlayOrigin::Autoplay => {
                        warn!(session = %session.id, %rejected, "autoplay was prevented");
                    }
                    PlayOrigin::User => {
                        warn!(session = %session.id, %rejected, "play request was rejected");
                    }
                }
                if matches!(
                    session.status,
                    PlaybackStatus::Ready | PlaybackStatus::Playing
                ) {
                    session.set_status(PlaybackStatus::Paused);
                }
            }
        }
    }

    /// 播放/暂停切换；加载中或出错时不可用
    pub fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        let session = controllable(&mut self.session)?;

        if session.status == PlaybackStatus::Playing {
            session.pending_play = None;
            session.set_status(PlaybackStatus::Paused);
            self.handle.pause();
        } else {
            session.pending_play = Some(self.handle.play(session.id, PlayOrigin::User));
            session.set_status(PlaybackStatus::Playing);
        }
        Ok(())
    }

    /// 回到开头；未在播放时同时开始播放
    pub fn replay(&mut self) -> Result<(), ControlError> {
        let session = controllable(&mut self.session)?;

        session.current_time = 0.0;
        self.handle.seek(Duration::ZERO);
        if session.status != PlaybackStatus::Playing {
            session.pending_play = Some(self.handle.play(session.id, PlayOrigin::User));
            session.set_status(PlaybackStatus::Playing);
        }
        Ok(())
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(PlaybackStatus::Idle)
    }

    pub fn current_time(&self) -> f64 {
        self.session.as_ref().map(|s| s.current_time).unwrap_or(0.0)
    }

    pub fn duration(&self) -> f64 {
        self.session.as_ref().map(|s| s.duration).unwrap_or(0.0)
    }

    pub fn error(&self) -> Option<&PlaybackError> {
        self.session.as_ref().and_then(|s| s.error.as_ref())
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status() == PlaybackStatus::Loading
    }

    /// 播放、暂停和重播按钮是否可用
    pub fn controls_enabled(&self) -> bool {
        !matches!(
            self.status(),
            PlaybackStatus::Idle | PlaybackStatus::Loading | PlaybackStatus::Errored
        )
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.current_time(), self.duration())
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status(),
            current_time: self.current_time(),
            duration: self.duration(),
            error: self.error().cloned(),
        }
    }
}

fn controllable(session: &mut Option<Session>) -> Result<&mut Session, ControlError> {
    let status = session
        .as_ref()
        .map_or(PlaybackStatus::Idle, |session| session.status);
    if matches!(
        status,
        PlaybackStatus::Idle | PlaybackStatus::Loading | PlaybackStatus::Errored
    ) {
        return Err(ControlError::Disabled(status));
    }
    session.as_mut().ok_or(ControlError::Disabled(status))
}

impl<H: MediaHandle> Drop for PlaybackController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
