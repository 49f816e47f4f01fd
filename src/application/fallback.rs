//! Fallback Policy - 图片生成失败时的处理策略
//!
//! 核心变换从不替换默认值；是否用占位图代替失败的生成结果，
//! 只在编排层按配置决定。分析与语音合成失败总是向上传播。

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::application::error::ApplicationError;
use crate::domain::image::{encode_png, QUADRANT_COUNT};
use crate::domain::EncodeError;

/// 占位图边长
pub const PLACEHOLDER_SIZE: u32 = 256;

const PLACEHOLDER_BACKGROUND: Rgba<u8> = Rgba([0xe5, 0xe7, 0xeb, 0xff]);
const PLACEHOLDER_FRAME: Rgba<u8> = Rgba([0x9c, 0xa3, 0xaf, 0xff]);
const FRAME_INSET: i32 = 16;
const FRAME_WIDTH: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// 以灰色占位图代替
    #[default]
    Placeholder,
    /// 直接返回错误
    Strict,
}

impl FallbackPolicy {
    /// 处理单张图片生成的结果
    pub fn recover_image(
        &self,
        what: &str,
        result: Result<Vec<u8>, ApplicationError>,
    ) -> Result<Vec<u8>, ApplicationError> {
        match (self, result) {
            (_, Ok(bytes)) => Ok(bytes),
            (FallbackPolicy::Strict, Err(e)) => Err(e),
            (FallbackPolicy::Placeholder, Err(e)) => {
                tracing::warn!(target_image = %what, error = %e, "Image generation failed, using placeholder");
                Ok(placeholder_png()?)
            }
        }
    }

    /// 处理拼图生成 + 切分的结果，失败时得到四张占位图
    pub fn recover_quadrants(
        &self,
        result: Result<[Vec<u8>; QUADRANT_COUNT], ApplicationError>,
    ) -> Result<[Vec<u8>; QUADRANT_COUNT], ApplicationError> {
        match (self, result) {
            (_, Ok(quads)) => Ok(quads),
            (FallbackPolicy::Strict, Err(e)) => Err(e),
            (FallbackPolicy::Placeholder, Err(e)) => {
                tracing::warn!(error = %e, "Composite split failed, using placeholders");
                let placeholder = placeholder_png()?;
                Ok(std::array::from_fn(|_| placeholder.clone()))
            }
        }
    }
}

/// 256×256 浅灰底、深灰边框的 PNG
pub fn placeholder_png() -> Result<Vec<u8>, EncodeError> {
    let mut canvas = RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_BACKGROUND);
    let side = PLACEHOLDER_SIZE as i32;
    for i in 0..FRAME_WIDTH {
        let size = (side - 2 * (FRAME_INSET + i)) as u32;
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(FRAME_INSET + i, FRAME_INSET + i).of_size(size, size),
            PLACEHOLDER_FRAME,
        );
    }
    encode_png(&DynamicImage::ImageRgba8(canvas))
}
