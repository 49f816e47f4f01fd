//! PCM Buffer - 16 位线性 PCM 样本

use crate::domain::DecodeError;

/// 上游 TTS 未声明采样率时的默认值
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// 单声道最大采样率，`rate * 2 * channels` 须放进 u32 的 byte rate 字段
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / 2;
/// `channels * 2` 须放进 u16 的 block align 字段
pub const MAX_CHANNELS: u16 = u16::MAX / 2;
/// `36 + 2 * len` 须放进 u32 的 RIFF 大小字段
pub const MAX_SAMPLES: usize = ((u32::MAX - 36) / 2) as usize;

/// PCM 音频缓冲
///
/// 不变量:
/// - 1 <= channels <= MAX_CHANNELS
/// - 1 <= sample_rate，且 sample_rate * 2 * channels <= u32::MAX
/// - len <= MAX_SAMPLES
/// - 多声道时样本按帧交错排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Self, DecodeError> {
        check_header_fields(samples.len(), channels, sample_rate)?;
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// 单声道缓冲
    pub fn mono(samples: Vec<i16>, sample_rate: u32) -> Result<Self, DecodeError> {
        Self::new(samples, 1, sample_rate)
    }

    /// 将原始字节按 i16 小端解释为样本
    ///
    /// 奇数长度的字节流不是合法的 16 位 PCM
    pub fn from_le_bytes(bytes: &[u8], channels: u16, sample_rate: u32) -> Result<Self, DecodeError> {
        if bytes.len() % 2 != 0 {
            return Err(DecodeError::Audio(format!(
                "PCM payload has odd length: {} bytes",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, channels, sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }

}

/// 校验元数据能写进 WAV 头部的定宽字段
fn check_header_fields(len: usize, channels: u16, sample_rate: u32) -> Result<(), DecodeError> {
    if channels == 0 {
        return Err(DecodeError::Audio("channel count must be positive".to_string()));
    }
    if channels > MAX_CHANNELS {
        return Err(DecodeError::Audio(format!(
            "channel count {} exceeds {}",
            channels, MAX_CHANNELS
        )));
    }
    if sample_rate == 0 {
        return Err(DecodeError::Audio("sample rate must be positive".to_string()));
    }
    let byte_rate = sample_rate as u64 * 2 * channels as u64;
    if byte_rate > u32::MAX as u64 {
        return Err(DecodeError::Audio(format!(
            "byte rate {} Hz x {} channels does not fit a WAV header",
            sample_rate, channels
        )));
    }
    if len > MAX_SAMPLES {
        return Err(DecodeError::Audio(format!(
            "{} samples exceed the WAV size limit",
            len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_le_bytes() {
        let bytes = [0x00, 0x00, 0x00, 0x40, 0x00, 0xC0];
        let pcm = PcmBuffer::from_le_bytes(&bytes, 1, 24000).unwrap();
        assert_eq!(pcm.samples(), &[0, 16384, -16384]);
    }

    #[test]
    fn test_from_le_bytes_rejects_odd_length() {
        let err = PcmBuffer::from_le_bytes(&[1, 2, 3], 1, 24000).unwrap_err();
        assert!(matches!(err, DecodeError::Audio(_)));
    }

    #[test]
    fn test_rejects_zero_channels_and_rate() {
        assert!(PcmBuffer::new(vec![], 0, 24000).is_err());
        assert!(PcmBuffer::new(vec![], 1, 0).is_err());
    }

    #[test]
    fn test_header_field_limits() {
        assert!(PcmBuffer::new(vec![], 1, MAX_SAMPLE_RATE).is_ok());
        assert!(PcmBuffer::new(vec![], 1, MAX_SAMPLE_RATE + 1).is_err());
        assert!(PcmBuffer::new(vec![], 1, 3_000_000_000).is_err());

        assert!(PcmBuffer::new(vec![], MAX_CHANNELS, 65538).is_ok());
        assert!(PcmBuffer::new(vec![], MAX_CHANNELS, 65539).is_err());
        assert!(PcmBuffer::new(vec![], MAX_CHANNELS + 1, 8000).is_err());
        assert!(PcmBuffer::new(vec![1, 2], 40000, 8000).is_err());

        assert!(check_header_fields(MAX_SAMPLES, 1, 24000).is_ok());
        assert!(matches!(
            check_header_fields(MAX_SAMPLES + 1, 1, 24000),
            Err(DecodeError::Audio(_))
        ));
    }

    #[test]
    fn test_duration() {
        let pcm = PcmBuffer::mono(vec![0; 24000], 24000).unwrap();
        assert_eq!(pcm.duration_ms(), 1000);

        let stereo = PcmBuffer::new(vec![0; 48000], 2, 24000).unwrap();
        assert_eq!(stereo.duration_ms(), 1000);
    }
}
