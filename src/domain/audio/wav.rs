//! WAV Container - RIFF/WAVE 编码与解析
//!
//! 只处理 16 位线性 PCM（format code 1）

use super::pcm::PcmBuffer;
use crate::domain::DecodeError;

/// WAV 头部长度（RIFF + fmt + data 三个块头）
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = 2;

/// 将 PCM 样本封装为 WAV 容器
///
/// 输出长度恒为 `44 + 2 * sample_count`，零样本也会得到结构合法的静音文件。
/// 头部各字段的取值范围由 `PcmBuffer` 的构造保证，这里不会溢出
pub fn encode_wav(pcm: &PcmBuffer) -> Vec<u8> {
    let num_channels = pcm.channels();
    let sample_rate = pcm.sample_rate();
    let byte_rate = sample_rate * BYTES_PER_SAMPLE * num_channels as u32;
    let block_align = num_channels * BYTES_PER_SAMPLE as u16;

    let data_size = (pcm.len() * BYTES_PER_SAMPLE as usize) as u32;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());

    for sample in pcm.samples() {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

/// WAV 文件信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// data 块负载的起始偏移
    pub data_offset: usize,
    /// data 块负载长度（字节）
    pub data_size: usize,
}

impl WavInfo {
    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        let frame_bytes = self.block_align as u64;
        if frame_bytes == 0 || self.sample_rate == 0 {
            return 0;
        }
        (self.data_size as u64 / frame_bytes) * 1000 / self.sample_rate as u64
    }
}

#[derive(Debug)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// 解析 WAV 头部
///
/// 逐块扫描，允许 fmt 与 data 之间存在其它块（如 LIST）
pub fn parse_wav(data: &[u8]) -> Result<WavInfo, DecodeError> {
    if data.len() < 12 {
        return Err(DecodeError::Audio("WAV data too short".to_string()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(DecodeError::Audio(
            "Invalid WAV: missing RIFF header".to_string(),
        ));
    }
    if &data[8..12] != b"WAVE" {
        return Err(DecodeError::Audio(
            "Invalid WAV: missing WAVE identifier".to_string(),
        ));
    }

    let mut pos = 12;
    let mut fmt_chunk: Option<FmtChunk> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body + 16 > data.len() {
                    return Err(DecodeError::Audio("Invalid fmt chunk size".to_string()));
                }
                fmt_chunk = Some(FmtChunk {
                    audio_format: read_u16(data, body),
                    num_channels: read_u16(data, body + 2),
                    sample_rate: read_u32(data, body + 4),
                    byte_rate: read_u32(data, body + 8),
                    block_align: read_u16(data, body + 12),
                    bits_per_sample: read_u16(data, body + 14),
                });
            }
            b"data" => {
                if body + chunk_size > data.len() {
                    return Err(DecodeError::Audio(format!(
                        "data chunk declares {} bytes but only {} are present",
                        chunk_size,
                        data.len() - body
                    )));
                }
                data_chunk = Some((body, chunk_size));
                break;
            }
            _ => {}
        }

        pos = body + chunk_size;
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos += 1;
        }
    }

    let fmt = fmt_chunk
        .ok_or_else(|| DecodeError::Audio("Invalid WAV: missing fmt chunk".to_string()))?;
    let (data_offset, data_size) = data_chunk
        .ok_or_else(|| DecodeError::Audio("Invalid WAV: missing data chunk".to_string()))?;

    Ok(WavInfo {
        audio_format: fmt.audio_format,
        channels: fmt.num_channels,
        sample_rate: fmt.sample_rate,
        byte_rate: fmt.byte_rate,
        block_align: fmt.block_align,
        bits_per_sample: fmt.bits_per_sample,
        data_offset,
        data_size,
    })
}

/// 读回 WAV 中的 16 位 PCM 样本
pub fn decode_wav(data: &[u8]) -> Result<PcmBuffer, DecodeError> {
    let info = parse_wav(data)?;
    if info.audio_format != PCM_FORMAT || info.bits_per_sample != BITS_PER_SAMPLE {
        return Err(DecodeError::Audio(format!(
            "Unsupported WAV encoding: format={}, bits={}",
            info.audio_format, info.bits_per_sample
        )));
    }
    let payload = &data[info.data_offset..info.data_offset + info.data_size];
    PcmBuffer::from_le_bytes(payload, info.channels, info.sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    fn mono(samples: Vec<i16>, rate: u32) -> PcmBuffer {
        PcmBuffer::mono(samples, rate).unwrap()
    }

    #[test]
    fn test_three_sample_layout() {
        let wav = encode_wav(&mono(vec![0, 16384, -16384], 24000));

        assert_eq!(wav.len(), 50);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32(&wav, 4), 42);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32(&wav, 16), 16);
        assert_eq!(read_u16(&wav, 20), 1);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(&wav[24..28], &24000u32.to_le_bytes());
        assert_eq!(read_u32(&wav, 28), 48000);
        assert_eq!(read_u16(&wav, 32), 2);
        assert_eq!(read_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32(&wav, 40), 6);
        assert_eq!(&wav[44..50], &[0x00, 0x00, 0x00, 0x40, 0x00, 0xC0]);
    }

    #[test]
    fn test_empty_buffer_is_valid_container() {
        let wav = encode_wav(&mono(vec![], 24000));
        assert_eq!(wav.len(), WAV_HEADER_LEN);

        let info = parse_wav(&wav).unwrap();
        assert_eq!(info.data_size, 0);
        assert_eq!(info.duration_ms(), 0);
        assert!(decode_wav(&wav).unwrap().is_empty());
    }

    #[test]
    fn test_header_reports_channels_rate_and_size() {
        for &(count, channels, rate) in &[(0usize, 1u16, 8000u32), (7, 1, 24000), (10, 2, 44100), (1, 6, 48000)] {
            let pcm = PcmBuffer::new(vec![1; count], channels, rate).unwrap();
            let info = parse_wav(&encode_wav(&pcm)).unwrap();
            assert_eq!(info.channels, channels);
            assert_eq!(info.sample_rate, rate);
            assert_eq!(info.data_size, 2 * count);
            assert_eq!(info.byte_rate, rate * 2 * channels as u32);
            assert_eq!(info.block_align, channels * 2);
        }
    }

    #[test]
    fn test_header_at_field_limits() {
        use crate::domain::audio::{MAX_CHANNELS, MAX_SAMPLE_RATE};

        for &(channels, rate) in &[(1u16, MAX_SAMPLE_RATE), (MAX_CHANNELS, 65538u32)] {
            let pcm = PcmBuffer::new(vec![7; channels as usize], channels, rate).unwrap();
            let wav = encode_wav(&pcm);
            assert_eq!(wav.len(), WAV_HEADER_LEN + 2 * channels as usize);

            let info = parse_wav(&wav).unwrap();
            assert_eq!(info.channels, channels);
            assert_eq!(info.sample_rate, rate);
            assert_eq!(info.byte_rate as u64, rate as u64 * 2 * channels as u64);
            assert_eq!(info.block_align as u32, channels as u32 * 2);
        }
    }

    #[test]
    fn test_samples_round_trip_with_extremes() {
        let samples = vec![i16::MIN, -1, 0, 1, i16::MAX, 12345, -12345];
        let wav = encode_wav(&mono(samples.clone(), 16000));
        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.samples(), samples.as_slice());
        assert_eq!(decoded.sample_rate(), 16000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_wav(b"not a wav").is_err());
        assert!(parse_wav(b"RIFF\0\0\0\0AVI LIST").is_err());

        let mut truncated = encode_wav(&mono(vec![1, 2, 3], 24000));
        truncated.truncate(46);
        assert!(matches!(parse_wav(&truncated), Err(DecodeError::Audio(_))));
    }

    #[test]
    fn test_parse_skips_unknown_chunks() {
        let wav = encode_wav(&mono(vec![7, 8], 24000));
        // 在 fmt 与 data 之间插入一个奇数长度的 LIST 块
        let mut with_list = wav[..36].to_vec();
        with_list.extend_from_slice(b"LIST");
        with_list.extend_from_slice(&3u32.to_le_bytes());
        with_list.extend_from_slice(&[1, 2, 3, 0]);
        with_list.extend_from_slice(&wav[36..]);

        let decoded = decode_wav(&with_list).unwrap();
        assert_eq!(decoded.samples(), &[7, 8]);
    }

    #[test]
    fn test_standard_decoder_reads_output() {
        let samples: Vec<i16> = (0..2400).map(|i| ((i % 100) * 300 - 15000) as i16).collect();
        let wav = encode_wav(&mono(samples.clone(), 24000));

        let mss = MediaSourceStream::new(Box::new(Cursor::new(wav)), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .unwrap();
        let mut format = probed.format;
        let track = format.default_track().unwrap();
        assert_eq!(track.codec_params.sample_rate, Some(24000));

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .unwrap();

        let mut decoded_samples: Vec<i16> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => panic!("packet read error: {}", e),
            };
            let decoded = decoder.decode(&packet).unwrap();
            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<i16>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            decoded_samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        assert_eq!(decoded_samples, samples);
    }
}
