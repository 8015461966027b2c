//! 资源事件监听器
//!
//! 资源端持有 [`ListenerRegistry`]，按事件类别把信号分发给已挂接的监听器。
//! 监听器通过 [`ListenerGuard`] 挂接，guard 被 drop 时自动摘除，
//! 因此一个会话的监听器生命周期与它的 [`SignalBinding`] 完全一致。

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::{ResourceSignal, SessionId, SessionSignal, SignalKind};

type ListenerId = u64;

struct ListenerEntry {
    id: ListenerId,
    kind: SignalKind,
    sink: Sender<SessionSignal>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: ListenerId,
    listeners: Vec<ListenerEntry>,
}

/// 监听器注册表，可跨线程共享
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 挂接一个监听器
    pub fn add(&self, kind: SignalKind, sink: Sender<SessionSignal>) -> ListenerGuard {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(ListenerEntry { id, kind, sink });

        ListenerGuard {
            registry: self.clone(),
            id,
        }
    }

    /// 把信号分发给对应类别的所有监听器，返回送达数量
    pub fn dispatch(&self, session: SessionId, signal: ResourceSignal) -> usize {
        let kind = signal.kind();
        let inner = self.inner.lock();
        let mut delivered = 0;
        for entry in inner.listeners.iter().filter(|e| e.kind == kind) {
            let message = SessionSignal {
                session,
                signal: signal.clone(),
            };
            if entry.sink.send(message).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn remove(&self, id: ListenerId) {
        self.inner.lock().listeners.retain(|entry| entry.id != id);
    }
}

/// 单个监听器的挂接凭证，drop 时摘除
pub struct ListenerGuard {
    registry: ListenerRegistry,
    id: ListenerId,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// 一个会话的全部监听器（元数据、进度、错误、结束）
pub struct SignalBinding {
    session: SessionId,
    _guards: Vec<ListenerGuard>,
}

impl SignalBinding {
    /// 为会话挂接四类监听器，全部转发到同一个 sink
    pub fn attach(
        registry: &ListenerRegistry,
        session: SessionId,
        sink: Sender<SessionSignal>,
    ) -> Self {
        let guards = SignalKind::ALL
            .into_iter()
            .map(|kind| registry.add(kind, sink.clone()))
            .collect();

        Self {
            session,
            _guards: guards,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }
}

impl Drop for SignalBinding {
    fn drop(&mut self) {
        tracing::trace!(session = %self.session, "detaching resource listeners");
    }
}
