//! 音频输出
//!
//! 使用 cpal 进行音频播放

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;

/// 音频输出错误
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("No output device available")]
    NoDevice,
    #[error("No supported config")]
    NoConfig,
    #[error("Stream error: {0}")]
    Stream(String),
}

/// 音频输出配置
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            buffer_size: 8192,
        }
    }
}

/// 音频输出流
pub struct AudioOutput {
    _stream: Stream,
    ring: Arc<RingBuffer>,
    is_playing: Arc<AtomicBool>,
    position_frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl AudioOutput {
    /// 使用默认设备创建音频输出
    pub fn new(config: OutputConfig) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

        Self::with_device(&device, config)
    }

    /// 使用指定设备创建音频输出
    pub fn with_device(device: &Device, config: OutputConfig) -> Result<Self, OutputError> {
        let supported_config = device
            .supported_output_configs()
            .map_err(|e| OutputError::Stream(e.to_string()))?
            .find(|c| {
                c.channels() == config.channels
                    && c.min_sample_rate().0 <= config.sample_rate
                    && c.max_sample_rate().0 >= config.sample_rate
                    && c.sample_format() == SampleFormat::F32
            })
            .ok_or(OutputError::NoConfig)?;

        let stream_config: StreamConfig = supported_config
            .with_sample_rate(cpal::SampleRate(config.sample_rate))
            .into();

        let ring = Arc::new(RingBuffer::new(config.buffer_size * 4));
        let is_playing = Arc::new(AtomicBool::new(false));
        let position_frames = Arc::new(AtomicU64::new(0));

        let ring_clone = ring.clone();
        let is_playing_clone = is_playing.clone();
        let position_clone = position_frames.clone();
        let channels = config.channels.max(1) as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if is_playing_clone.load(Ordering::Relaxed) {
                        let read = ring_clone.read(data);
                        for sample in &mut data[read..] {
                            *sample = 0.0;
                        }
                        position_clone.fetch_add((read / channels) as u64, Ordering::Relaxed);
                    } else {
                        // 暂停时输出静音
                        data.fill(0.0);
                    }
                },
                |err| {
                    tracing::error!(%err, "audio output stream error");
                },
                None,
            )
            .map_err(|e| OutputError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| OutputError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            ring,
            is_playing,
            position_frames,
            sample_rate: config.sample_rate,
        })
    }

    /// 写入采样；空间不足时不写入并返回 false
    pub fn write(&self, samples: &[f32]) -> bool {
        self.ring.write(samples)
    }

    /// 缓冲区中尚未播放的采样数
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    pub fn set_playing(&self, playing: bool) {
        self.is_playing.store(playing, Ordering::Relaxed);
    }

    /// 自上次重置以来播放的时长（秒）
    pub fn position(&self) -> f64 {
        let frames = self.position_frames.load(Ordering::Relaxed);
        frames as f64 / self.sample_rate as f64
    }

    pub fn reset_position(&self) {
        self.position_frames.store(0, Ordering::Relaxed);
    }

    /// 丢弃尚未播放的采样（跳转时使用）
    pub fn clear(&self) {
        self.ring.clear();
    }
}

/// 有界采样缓冲区
struct RingBuffer {
    buffer: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn write(&self, data: &[f32]) -> bool {
        let mut buf = self.buffer.lock();
        // 单个数据块大于容量时仍然接受，避免卡死
        if !buf.is_empty() && buf.len() + data.len() > self.capacity {
            return false;
        }
        buf.extend(data.iter().copied());
        true
    }

    fn read(&self, output: &mut [f32]) -> usize {
        let mut buf = self.buffer.lock();
        let to_read = output.len().min(buf.len());
        for (slot, sample) in output.iter_mut().zip(buf.drain(..to_read)) {
            *slot = sample;
        }
        to_read
    }

    fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    fn clear(&self) {
        self.buffer.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_rejects_overflow() {
        let ring = RingBuffer::new(8);
        assert!(ring.write(&[0.1; 6]));
        assert!(!ring.write(&[0.2; 4]));
        assert_eq!(ring.len(), 6);

        let mut out = [0.0f32; 4];
        assert_eq!(ring.read(&mut out), 4);
        assert!(ring.write(&[0.2; 4]));
        assert_eq!(ring.len(), 6);
    }

    #[test]
    fn test_ring_buffer_accepts_oversized_chunk_when_empty() {
        let ring = RingBuffer::new(4);
        assert!(ring.write(&[0.5; 10]));
        let mut out = [0.0f32; 16];
        assert_eq!(ring.read(&mut out), 10);
        assert_eq!(out[9], 0.5);
        ring.clear();
        assert_eq!(ring.len(), 0);
    }
}
