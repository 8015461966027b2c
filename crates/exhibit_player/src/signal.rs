//! 会话、资源信号和引擎命令定义

use std::time::Duration;

use crossbeam_channel::Sender;

/// 播放会话标识
///
/// 每次切换音源都会分配新的会话；所有资源信号都带有会话标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 监听器类别，对应资源的四种事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    MetadataReady,
    TimeUpdate,
    Error,
    Ended,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::MetadataReady,
        SignalKind::TimeUpdate,
        SignalKind::Error,
        SignalKind::Ended,
    ];
}

/// 资源信号（资源 -> 控制器）
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSignal {
    /// 元数据可用；时长未知时为 None
    MetadataReady { duration: Option<Duration> },
    /// 播放位置更新
    TimeUpdate { position: Duration },
    /// 加载或解码失败
    Error(String),
    /// 播放到结尾
    Ended,
}

impl ResourceSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            ResourceSignal::MetadataReady { .. } => SignalKind::MetadataReady,
            ResourceSignal::TimeUpdate { .. } => SignalKind::TimeUpdate,
            ResourceSignal::Error(_) => SignalKind::Error,
            ResourceSignal::Ended => SignalKind::Ended,
        }
    }
}

/// 带会话标识的信号
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSignal {
    pub session: SessionId,
    pub signal: ResourceSignal,
}

/// 播放请求来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrigin {
    /// 元数据就绪后的自动播放
    Autoplay,
    /// 用户点击
    User,
}

/// 播放请求被拒绝
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("play rejected: {reason}")]
pub struct PlayRejected {
    pub reason: String,
}

impl PlayRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type PlayOutcome = Result<(), PlayRejected>;

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Errored,
}

/// 引擎命令（控制器 -> 引擎线程）
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// 为会话加载音源
    Load { session: SessionId, url: String },
    /// 卸载当前音源
    Unload,
    /// 开始播放，结果通过 reply 回传
    Play {
        session: SessionId,
        origin: PlayOrigin,
        reply: Sender<PlayOutcome>,
    },
    Pause,
    Seek(Duration),
    /// 设置音量 (0.0 - 1.0)
    SetVolume(f32),
    Shutdown,
}
