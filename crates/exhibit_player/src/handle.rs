//! 媒体句柄抽象
//!
//! 控制器只通过 [`MediaHandle`] 操作底层资源；真实实现是 [`crate::AudioEngine`]，
//! 测试中使用脚本化的假句柄。

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::{PlayOrigin, PlayOutcome, PlayRejected, SessionId, SessionSignal, SignalBinding};

/// 可播放的媒体句柄
pub trait MediaHandle {
    /// 为会话挂接全部监听器，返回的 binding 被 drop 时摘除
    fn attach(&mut self, session: SessionId, sink: Sender<SessionSignal>) -> SignalBinding;

    /// 开始异步加载；结果通过元数据或错误信号返回
    fn load(&mut self, session: SessionId, url: &str);

    /// 停止并释放当前音源
    fn unload(&mut self);

    /// 请求开始播放，结果延迟返回
    fn play(&mut self, session: SessionId, origin: PlayOrigin) -> PendingPlay;

    fn pause(&mut self);

    fn seek(&mut self, position: Duration);
}

/// 尚未返回的播放请求
///
/// 与会话绑定；会话销毁时一起 drop，迟到的结果随之丢弃。
#[derive(Debug)]
pub struct PendingPlay {
    session: SessionId,
    origin: PlayOrigin,
    rx: Receiver<PlayOutcome>,
}

impl PendingPlay {
    /// 创建请求，返回 (请求, 回传端)
    pub fn channel(session: SessionId, origin: PlayOrigin) -> (Self, Sender<PlayOutcome>) {
        let (tx, rx) = bounded(1);
        (Self { session, origin, rx }, tx)
    }

    /// 已经有结果的请求
    pub fn resolved(session: SessionId, origin: PlayOrigin, outcome: PlayOutcome) -> Self {
        let (pending, tx) = Self::channel(session, origin);
        let _ = tx.send(outcome);
        pending
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn origin(&self) -> PlayOrigin {
        self.origin
    }

    /// 非阻塞检查结果；回传端被丢弃视为拒绝
    pub fn try_resolve(&self) -> Option<PlayOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(PlayRejected::new("play request was dropped")))
            }
        }
    }
}
