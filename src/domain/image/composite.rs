//! Composite Image Splitter - 2×2 拼图切分
//!
//! 生成接口一次只产出一张图，四个步骤被画在同一张图的四个象限里。
//! 这里把它确定性地切成四张独立图片，阅读顺序即步骤顺序。

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::domain::{DecodeError, EncodeError};

/// 象限数量
pub const QUADRANT_COUNT: usize = 4;

/// 象限位置，按阅读顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; QUADRANT_COUNT] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(&self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }

    /// 在 `width × height` 源图中的区域 (x, y, w, h)
    ///
    /// 象限尺寸取整除结果；奇数宽/高时最后一列/行被丢弃
    pub fn region(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let quad_w = width / 2;
        let quad_h = height / 2;
        let i = self.index() as u32;
        ((i % 2) * quad_w, (i / 2) * quad_h, quad_w, quad_h)
    }
}

/// 将已解码的图片切成四个象限
///
/// 纯像素拷贝，不做重采样
pub fn split_quadrants(image: &DynamicImage) -> [DynamicImage; QUADRANT_COUNT] {
    let (width, height) = image.dimensions();
    Quadrant::ALL.map(|quadrant| {
        let (x, y, w, h) = quadrant.region(width, height);
        image.crop_imm(x, y, w, h)
    })
}

/// 解码并切分拼图
pub fn split_composite(bytes: &[u8]) -> Result<[DynamicImage; QUADRANT_COUNT], DecodeError> {
    let image = decode_image(bytes)?;
    Ok(split_quadrants(&image))
}

/// 象限是否有像素；宽或高小于 2 时切分结果为空图，无法再编码
pub fn check_quadrants_nonempty(width: u32, height: u32) -> Result<(), DecodeError> {
    if width < 2 || height < 2 {
        return Err(DecodeError::Image(format!(
            "composite is {}x{}, at least 2x2 pixels are needed for non-empty quadrants",
            width, height
        )));
    }
    Ok(())
}

/// 解码并切分拼图，四个象限都必须非空
pub fn split_composite_nonempty(
    bytes: &[u8],
) -> Result<[DynamicImage; QUADRANT_COUNT], DecodeError> {
    let image = decode_image(bytes)?;
    let (width, height) = image.dimensions();
    check_quadrants_nonempty(width, height)?;
    Ok(split_quadrants(&image))
}

/// 解码任意支持格式的图片
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    image::load_from_memory(bytes).map_err(|e| DecodeError::Image(e.to_string()))
}

/// 编码为 PNG
///
/// 零面积图片无法编码为 PNG，返回 EncodeError
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| EncodeError(e.to_string()))?;
    Ok(buf)
}

/// 根据内容嗅探图片 MIME 类型
pub fn sniff_image_mime(bytes: &[u8]) -> Result<&'static str, DecodeError> {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .map_err(|e| DecodeError::Image(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, (x / 256) as u8, 255])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_split_400x300() {
        let source = gradient(400, 300);
        let quads = split_quadrants(&source);

        for quad in &quads {
            assert_eq!(quad.dimensions(), (200, 150));
        }
        assert_eq!(quads[0].get_pixel(5, 5), source.get_pixel(5, 5));
        assert_eq!(quads[1].get_pixel(5, 5), source.get_pixel(205, 5));
        assert_eq!(quads[2].get_pixel(5, 5), source.get_pixel(5, 155));
        assert_eq!(quads[3].get_pixel(5, 5), source.get_pixel(205, 155));
    }

    #[test]
    fn test_odd_dimensions_truncate() {
        let source = gradient(5, 3);
        let quads = split_quadrants(&source);

        for quad in &quads {
            assert_eq!(quad.dimensions(), (2, 1));
        }
        assert_eq!(quads[3].get_pixel(1, 0), source.get_pixel(3, 1));
    }

    #[test]
    fn test_one_pixel_yields_empty_quadrants() {
        let quads = split_quadrants(&gradient(1, 1));
        for quad in &quads {
            assert_eq!(quad.dimensions(), (0, 0));
        }
    }

    #[test]
    fn test_nonempty_split_rejects_thin_composites() {
        for &(w, h) in &[(1u32, 1u32), (1, 40), (40, 1)] {
            let png = encode_png(&gradient(w, h)).unwrap();
            assert!(split_composite(&png).is_ok());
            let err = split_composite_nonempty(&png).unwrap_err();
            assert!(err.to_string().contains(&format!("{}x{}", w, h)));
        }

        let png = encode_png(&gradient(2, 2)).unwrap();
        let quads = split_composite_nonempty(&png).unwrap();
        for quad in &quads {
            assert_eq!(quad.dimensions(), (1, 1));
            assert!(encode_png(quad).is_ok());
        }
    }

    #[test]
    fn test_split_composite_from_png_bytes() {
        let png = encode_png(&gradient(64, 32)).unwrap();
        let quads = split_composite(&png).unwrap();
        assert_eq!(quads[2].dimensions(), (32, 16));
    }

    #[test]
    fn test_split_composite_rejects_corrupt_bytes() {
        let err = split_composite(b"\x89PNG\r\n\x1a\nbroken").unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[test]
    fn test_quadrant_regions() {
        assert_eq!(Quadrant::TopLeft.region(400, 300), (0, 0, 200, 150));
        assert_eq!(Quadrant::TopRight.region(400, 300), (200, 0, 200, 150));
        assert_eq!(Quadrant::BottomLeft.region(400, 300), (0, 150, 200, 150));
        assert_eq!(Quadrant::BottomRight.region(400, 300), (200, 150, 200, 150));
    }

    #[test]
    fn test_sniff_mime() {
        let png = encode_png(&gradient(2, 2)).unwrap();
        assert_eq!(sniff_image_mime(&png).unwrap(), "image/png");
        assert!(sniff_image_mime(b"plain text").is_err());
    }
}
