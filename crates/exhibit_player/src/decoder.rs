//! 解说音轨解码
//!
//! 打开时先探测容器与首个音轨，得到元数据（时长、采样率、声道）；
//! 之后按包解码为交错 f32 采样，并在解码时直接乘上音量。

use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

const FALLBACK_SAMPLE_RATE: u32 = 44100;
const FALLBACK_CHANNELS: usize = 2;

#[derive(thiserror::Error, Debug)]
pub enum DecoderError {
    #[error("Unrecognized audio format: {0}")]
    Probe(String),
    #[error("No supported audio track found")]
    NoTrack,
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Seek failed: {0}")]
    Seek(String),
}

impl From<SymphoniaError> for DecoderError {
    fn from(e: SymphoniaError) -> Self {
        DecoderError::Decode(e.to_string())
    }
}

/// 解说音轨的元数据
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    /// 容器未给出帧数时为 None
    pub duration: Option<Duration>,
    pub codec: String,
}

impl AudioInfo {
    fn from_params(params: &CodecParameters) -> Self {
        let sample_rate = params.sample_rate.unwrap_or(FALLBACK_SAMPLE_RATE);
        let time_base = params
            .time_base
            .unwrap_or_else(|| TimeBase::new(1, sample_rate));

        Self {
            sample_rate,
            channels: params
                .channels
                .map(|c| c.count())
                .unwrap_or(FALLBACK_CHANNELS),
            duration: params
                .n_frames
                .map(|frames| to_duration(time_base.calc_time(frames))),
            codec: format!("{:?}", params.codec),
        }
    }
}

fn to_duration(time: Time) -> Duration {
    Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac.max(0.0))
}

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: TimeBase,
    sample_buf: Option<SampleBuffer<f32>>,
    pub info: AudioInfo,
}

impl AudioDecoder {
    /// 探测媒体源并打开首个音轨，`hint` 为文件扩展名
    pub fn new(source: Box<dyn MediaSource>, hint: Option<&str>) -> Result<Self, DecoderError> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecoderError::Probe(e.to_string()))?
            .format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecoderError::NoTrack)?;

        let params = track.codec_params.clone();
        let track_id = track.id;
        let info = AudioInfo::from_params(&params);
        let time_base = params
            .time_base
            .unwrap_or_else(|| TimeBase::new(1, info.sample_rate));

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|_| DecoderError::UnsupportedCodec(info.codec.clone()))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            time_base,
            sample_buf: None,
            info,
        })
    }

    /// 解码下一段交错采样并乘以 `gain`；流结束时返回 None
    pub fn next_chunk(&mut self, gain: f32) -> Result<Option<Vec<f32>>, DecoderError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                // 损坏的包直接跳过
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let frames = decoded.capacity();
            if self
                .sample_buf
                .as_ref()
                .is_some_and(|buf| buf.capacity() < frames * spec.channels.count())
            {
                self.sample_buf = None;
            }
            let sample_buf = self
                .sample_buf
                .get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
            sample_buf.copy_interleaved_ref(decoded);

            let samples = sample_buf.samples();
            if gain == 1.0 {
                return Ok(Some(samples.to_vec()));
            }
            return Ok(Some(samples.iter().map(|s| s * gain).collect()));
        }
    }

    /// 跳转并返回实际到达的位置
    pub fn seek(&mut self, position: Duration) -> Result<Duration, DecoderError> {
        let target = match self.info.duration {
            Some(duration) if position > duration => duration,
            _ => position,
        };
        let seeked = self
            .format
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::from(target.as_secs_f64()),
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| DecoderError::Seek(e.to_string()))?;

        self.decoder.reset();
        Ok(to_duration(self.time_base.calc_time(seeked.actual_ts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// 单声道 16 位 PCM WAV
    fn wav(sample_rate: u32, frames: u32) -> Vec<u8> {
        let data_len = frames * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for i in 0..frames {
            let sample = if i % 2 == 0 { 8000i16 } else { -8000i16 };
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    fn open(bytes: Vec<u8>) -> Result<AudioDecoder, DecoderError> {
        AudioDecoder::new(Box::new(Cursor::new(bytes)), Some("wav"))
    }

    fn drain(decoder: &mut AudioDecoder, gain: f32) -> Vec<f32> {
        let mut all = Vec::new();
        while let Some(chunk) = decoder.next_chunk(gain).unwrap() {
            all.extend(chunk);
        }
        all
    }

    #[test]
    fn test_probe_reports_narration_metadata() {
        let decoder = open(wav(8000, 4000)).unwrap();
        assert_eq!(decoder.info.sample_rate, 8000);
        assert_eq!(decoder.info.channels, 1);
        assert_eq!(decoder.info.duration, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_decodes_whole_track_with_gain() {
        let mut decoder = open(wav(8000, 4000)).unwrap();
        let full = drain(&mut decoder, 1.0);
        assert_eq!(full.len(), 4000);

        decoder.seek(Duration::ZERO).unwrap();
        let quiet = drain(&mut decoder, 0.5);
        assert_eq!(quiet.len(), 4000);
        assert!((quiet[0] - full[0] * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rewind_after_end_of_stream() {
        let mut decoder = open(wav(8000, 800)).unwrap();
        drain(&mut decoder, 1.0);
        assert!(decoder.next_chunk(1.0).unwrap().is_none());

        let position = decoder.seek(Duration::ZERO).unwrap();
        assert_eq!(position, Duration::ZERO);
        assert!(decoder.next_chunk(1.0).unwrap().is_some());
    }

    #[test]
    fn test_unrecognized_bytes_fail_probe() {
        let result = open(b"definitely not a narration file".to_vec());
        assert!(matches!(result, Err(DecoderError::Probe(_))));
    }
}
