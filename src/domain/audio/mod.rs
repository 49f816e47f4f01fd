//! Audio - PCM 缓冲与 WAV 容器

mod mime;
mod pcm;
mod wav;

pub use mime::{is_audio_mime, sample_rate_from_mime};
pub use pcm::{PcmBuffer, DEFAULT_SAMPLE_RATE, MAX_CHANNELS, MAX_SAMPLES, MAX_SAMPLE_RATE};
pub use wav::{decode_wav, encode_wav, parse_wav, WavInfo, WAV_HEADER_LEN};
