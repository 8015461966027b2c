//! 播放引擎
//!
//! 独立线程持有解码器和输出流，通过命令 channel 接收控制，
//! 通过 [`ListenerRegistry`] 向当前挂接的监听器发送资源信号。

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::{
    AudioDecoder, AudioOutput, DecoderError, EngineCommand, ListenerRegistry, MediaHandle,
    MediaLocation, OutputConfig, OutputError, PendingPlay, PlayOrigin, PlayOutcome, PlayRejected,
    ResourceSignal, SessionId, SessionSignal, SignalBinding, SourceError,
};

/// 自动播放策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    #[default]
    Allow,
    /// 拒绝非用户发起的播放
    Deny,
}

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub autoplay: AutoplayPolicy,
    pub time_update_interval: Duration,
    pub output_buffer_size: usize,
    pub volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoplay: AutoplayPolicy::Allow,
            time_update_interval: Duration::from_millis(250),
            output_buffer_size: 8192,
            volume: 1.0,
        }
    }
}

/// 加载失败
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("{0}")]
    Source(#[from] SourceError),
    #[error("{0}")]
    Decode(#[from] DecoderError),
    #[error("{0}")]
    Output(#[from] OutputError),
}

/// 引擎启动失败
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Failed to start audio engine: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 播放引擎句柄
pub struct AudioEngine {
    cmd_tx: Sender<EngineCommand>,
    registry: ListenerRegistry,
}

impl AudioEngine {
    /// 启动播放引擎线程
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = bounded(32);
        let registry = ListenerRegistry::new();
        let engine_registry = registry.clone();

        thread::Builder::new()
            .name("exhibit-audio".into())
            .spawn(move || run_engine(cmd_rx, engine_registry, config))?;

        Ok(Self { cmd_tx, registry })
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(EngineCommand::SetVolume(volume));
    }

    fn send(&self, cmd: EngineCommand) -> bool {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("audio engine is not running");
            return false;
        }
        true
    }
}

impl MediaHandle for AudioEngine {
    fn attach(&mut self, session: SessionId, sink: Sender<SessionSignal>) -> SignalBinding {
        SignalBinding::attach(&self.registry, session, sink)
    }

    fn load(&mut self, session: SessionId, url: &str) {
        let sent = self.send(EngineCommand::Load {
            session,
            url: url.to_string(),
        });
        if !sent {
            // 引擎线程已退出，没有人会再发出元数据
            self.registry.dispatch(
                session,
                ResourceSignal::Error("audio engine is not running".into()),
            );
        }
    }

    fn unload(&mut self) {
        self.send(EngineCommand::Unload);
    }

    fn play(&mut self, session: SessionId, origin: PlayOrigin) -> PendingPlay {
        let (pending, reply) = PendingPlay::channel(session, origin);
        // 发送失败时 reply 被丢弃，PendingPlay 解析为拒绝
        self.send(EngineCommand::Play {
            session,
            origin,
            reply,
        });
        pending
    }

    fn pause(&mut self) {
        self.send(EngineCommand::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(EngineCommand::Seek(position));
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

fn run_engine(cmd_rx: Receiver<EngineCommand>, registry: ListenerRegistry, config: EngineConfig) {
    let mut state = EngineState::new(registry, config);

    loop {
        // 非阻塞检查命令
        match cmd_rx.try_recv() {
            Ok(cmd) => {
                if !state.handle_command(cmd) {
                    break;
                }
                continue;
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {}
            Err(crossbeam_channel::TryRecvError::Disconnected) => break,
        }

        if state.playing {
            state.pump_audio();
            state.update_position();
        }

        // 避免 CPU 空转
        thread::sleep(Duration::from_millis(5));
    }

    debug!("audio engine stopped");
}

struct LoadedTrack {
    session: SessionId,
    decoder: AudioDecoder,
    output: AudioOutput,
    /// 已解码但输出缓冲暂时放不下的采样
    pending: Option<Vec<f32>>,
    exhausted: bool,
}

struct EngineState {
    registry: ListenerRegistry,
    config: EngineConfig,
    track: Option<LoadedTrack>,
    playing: bool,
    volume: f32,
    position_base: Duration,
    last_position_update: Instant,
}

impl EngineState {
    fn new(registry: ListenerRegistry, config: EngineConfig) -> Self {
        let volume = config.volume;
        Self {
            registry,
            config,
            track: None,
            playing: false,
            volume,
            position_base: Duration::ZERO,
            last_position_update: Instant::now(),
        }
    }

    fn handle_command(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::Load { session, url } => self.load(session, &url),
            EngineCommand::Unload => self.unload(),
            EngineCommand::Play {
                session,
                origin,
                reply,
            } => {
                let outcome = self.play(session, origin);
                let _ = reply.send(outcome);
            }
            EngineCommand::Pause => self.pause(),
            EngineCommand::Seek(pos) => self.seek(pos),
            EngineCommand::SetVolume(vol) => {
                self.volume = vol.clamp(0.0, 1.0);
            }
            EngineCommand::Shutdown => return false,
        }
        true
    }

    fn emit(&self, session: SessionId, signal: ResourceSignal) {
        self.registry.dispatch(session, signal);
    }

    fn load(&mut self, session: SessionId, url: &str) {
        self.unload();

        match open_track(url, self.config.output_buffer_size) {
            Ok((decoder, output)) => {
                let duration = decoder.info.duration;
                info!(
                    %session,
                    codec = %decoder.info.codec,
                    sample_rate = decoder.info.sample_rate,
                    ?duration,
                    "narration loaded"
                );
                self.track = Some(LoadedTrack {
                    session,
                    decoder,
                    output,
                    pending: None,
                    exhausted: false,
                });
                self.emit(session, ResourceSignal::MetadataReady { duration });
            }
            Err(e) => {
                warn!(%session, %url, error = %e, "failed to load narration");
                self.emit(session, ResourceSignal::Error(e.to_string()));
            }
        }
    }

    fn unload(&mut self) {
        if let Some(track) = self.track.take() {
            track.output.set_playing(false);
        }
        self.playing = false;
        self.position_base = Duration::ZERO;
    }

    fn play(&mut self, session: SessionId, origin: PlayOrigin) -> PlayOutcome {
        let Some(track) = &self.track else {
            return Err(PlayRejected::new("no narration loaded"));
        };
        if track.session != session {
            return Err(PlayRejected::new("narration was replaced"));
        }
        if origin == PlayOrigin::Autoplay && self.config.autoplay == AutoplayPolicy::Deny {
            return Err(PlayRejected::new("autoplay is disabled"));
        }

        track.output.set_playing(true);
        self.playing = true;
        self.last_position_update = Instant::now();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(track) = &self.track {
            track.output.set_playing(false);
        }
        self.playing = false;
    }

    fn seek(&mut self, pos: Duration) {
        let Some(track) = &mut self.track else {
            return;
        };
        let session = track.session;

        match track.decoder.seek(pos) {
            Ok(position) => {
                track.output.clear();
                track.output.reset_position();
                track.pending = None;
                track.exhausted = false;
                self.position_base = position;
                self.emit(session, ResourceSignal::TimeUpdate { position });
            }
            Err(e) => warn!(%session, error = %e, "seek failed"),
        }
    }

    /// 解码并填满输出缓冲；流结束且缓冲播完时结束曲目
    fn pump_audio(&mut self) {
        let Some(track) = &mut self.track else {
            return;
        };
        let session = track.session;

        for _ in 0..16 {
            if track.pending.is_none() && !track.exhausted {
                match track.decoder.next_chunk(self.volume) {
                    Ok(Some(samples)) => track.pending = Some(samples),
                    Ok(None) => track.exhausted = true,
                    Err(e) => {
                        warn!(%session, error = %e, "decode error");
                        track.output.set_playing(false);
                        self.playing = false;
                        self.registry
                            .dispatch(session, ResourceSignal::Error(e.to_string()));
                        return;
                    }
                }
            }

            match track.pending.take() {
                Some(samples) => {
                    if !track.output.write(&samples) {
                        track.pending = Some(samples);
                        break;
                    }
                }
                None => break,
            }
        }

        if track.exhausted && track.pending.is_none() && track.output.buffered() == 0 {
            self.finish_track();
        }
    }

    /// 播放到结尾：回到开头并停止
    fn finish_track(&mut self) {
        let Some(track) = &mut self.track else {
            return;
        };
        let session = track.session;

        track.output.set_playing(false);
        if let Err(e) = track.decoder.seek(Duration::ZERO) {
            warn!(%session, error = %e, "failed to rewind narration");
        }
        track.output.reset_position();
        track.exhausted = false;
        self.playing = false;
        self.position_base = Duration::ZERO;

        debug!(%session, "narration ended");
        self.emit(session, ResourceSignal::Ended);
    }

    fn update_position(&mut self) {
        if self.last_position_update.elapsed() < self.config.time_update_interval {
            return;
        }
        if let Some(track) = &self.track {
            let position = self.position_base + Duration::from_secs_f64(track.output.position());
            self.emit(track.session, ResourceSignal::TimeUpdate { position });
        }
        self.last_position_update = Instant::now();
    }
}

fn open_track(url: &str, buffer_size: usize) -> Result<(AudioDecoder, AudioOutput), LoadError> {
    let location = MediaLocation::parse(url)?;
    let hint = location.extension_hint();
    let source = location.open()?;
    let decoder = AudioDecoder::new(source, hint.as_deref())?;

    let output = AudioOutput::new(OutputConfig {
        sample_rate: decoder.info.sample_rate,
        channels: decoder.info.channels as u16,
        buffer_size,
    })?;

    Ok((decoder, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlaybackController, PlaybackError, PlaybackStatus};

    /// 引擎线程已退出的句柄
    fn stopped_engine() -> AudioEngine {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        AudioEngine {
            cmd_tx,
            registry: ListenerRegistry::new(),
        }
    }

    #[test]
    fn test_load_on_stopped_engine_reports_error() {
        let mut controller = PlaybackController::new(stopped_engine());
        controller.set_source(Some("narration/en.mp3".to_string()));
        assert_eq!(controller.status(), PlaybackStatus::Loading);

        controller.poll();

        assert_eq!(controller.status(), PlaybackStatus::Errored);
        assert_eq!(
            controller.error(),
            Some(&PlaybackError::ResourceLoadFailed(
                "audio engine is not running".into()
            ))
        );
    }

    #[test]
    fn test_play_on_stopped_engine_is_rejected() {
        let mut engine = stopped_engine();
        let pending = engine.play(SessionId::new(1), PlayOrigin::User);
        assert!(matches!(pending.try_resolve(), Some(Err(_))));
    }

    #[test]
    fn test_spawned_engine_accepts_commands() {
        let engine = AudioEngine::spawn(EngineConfig::default()).unwrap();
        assert!(engine.send(EngineCommand::Pause));
    }
}
