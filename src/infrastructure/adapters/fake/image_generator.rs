//! Fake Image Generator - 离线图片生成
//!
//! 根据提示词生成确定性的纯色图片；拼图提示词得到四色 2×2 网格

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{GeneratedImage, ImageGeneratorPort, UpstreamError};
use crate::domain::image::encode_png;

/// 生成图片的边长
pub const FAKE_IMAGE_SIZE: u32 = 512;

const GRID_COLORS: [Rgba<u8>; 4] = [
    Rgba([239, 68, 68, 255]),
    Rgba([34, 197, 94, 255]),
    Rgba([59, 130, 246, 255]),
    Rgba([234, 179, 8, 255]),
];

pub struct FakeImageGenerator {
    /// 模拟上游失败
    failing: bool,
    calls: AtomicUsize,
}

impl FakeImageGenerator {
    pub fn new() -> Self {
        Self {
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次请求都返回服务错误
    pub fn failing() -> Self {
        Self {
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 由提示词得到一个稳定的颜色
fn prompt_color(prompt: &str) -> Rgba<u8> {
    let hash = prompt
        .bytes()
        .fold(0x811c9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x01000193));
    let [r, g, b, _] = hash.to_le_bytes();
    Rgba([r, g, b, 255])
}

fn render(prompt: &str) -> RgbaImage {
    if prompt.contains("2x2 grid") {
        let half = FAKE_IMAGE_SIZE / 2;
        RgbaImage::from_fn(FAKE_IMAGE_SIZE, FAKE_IMAGE_SIZE, |x, y| {
            let index = (y / half) * 2 + (x / half);
            GRID_COLORS[index as usize]
        })
    } else {
        RgbaImage::from_pixel(FAKE_IMAGE_SIZE, FAKE_IMAGE_SIZE, prompt_color(prompt))
    }
}

#[async_trait]
impl ImageGeneratorPort for FakeImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(UpstreamError::Service {
                status: 503,
                message: "fake image generator is failing".to_string(),
            });
        }

        let data = encode_png(&DynamicImage::ImageRgba8(render(prompt)))
            .map_err(|e| UpstreamError::malformed(e.to_string()))?;

        tracing::debug!(
            prompt_len = prompt.len(),
            size_bytes = data.len(),
            "FakeImageGenerator: returning synthetic image"
        );

        Ok(GeneratedImage {
            data,
            mime_type: "image/png".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::split_composite;
    use image::GenericImageView;

    #[tokio::test]
    async fn test_composite_quadrants_have_distinct_colors() {
        let generator = FakeImageGenerator::new();
        let image = generator.generate("a 2x2 grid of steps").await.unwrap();
        let quads = split_composite(&image.data).unwrap();

        for (quad, color) in quads.iter().zip(GRID_COLORS) {
            assert_eq!(quad.dimensions(), (256, 256));
            assert_eq!(quad.get_pixel(10, 10), color);
        }
    }

    #[tokio::test]
    async fn test_failing_generator() {
        let generator = FakeImageGenerator::failing();
        assert!(generator.generate("anything").await.is_err());
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn test_prompt_color_is_stable() {
        assert_eq!(prompt_color("bridge"), prompt_color("bridge"));
        assert_ne!(prompt_color("bridge"), prompt_color("pizza"));
    }
}
