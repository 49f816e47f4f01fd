//! 对比图 - 标题，原图与成品并排，下方为五轴雷达图

use ab_glyph::{FontRef, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use std::f32::consts::PI;

use crate::application::ports::{ComparisonRendererPort, ExportError};
use crate::domain::guide::{Scorecard, MAX_SCORE};
use crate::domain::image::{decode_image, encode_png};

pub const CANVAS_SIZE: u32 = 1200;
pub const PHOTO_SIZE: u32 = 500;
pub const ORIGINAL_ORIGIN: (u32, u32) = (50, 210);
pub const RESULT_ORIGIN: (u32, u32) = (650, 210);
const RADAR_CENTER: (f32, f32) = (600.0, 950.0);
const RADAR_RADIUS: f32 = 180.0;
const RADAR_RINGS: u32 = 5;
/// 轴标签到圆心的距离
const LABEL_RADIUS: f32 = RADAR_RADIUS + 25.0;

/// DejaVu Sans Bold，许可见 fonts/LICENSE-DejaVu
static FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");
const TITLE_SCALE: f32 = 48.0;
const CAPTION_SCALE: f32 = 24.0;
const LABEL_SCALE: f32 = 18.0;

const BACKGROUND: Rgb<u8> = Rgb([0xf9, 0xfa, 0xfb]);
const GRID: Rgb<u8> = Rgb([0xd1, 0xd5, 0xdb]);
const SPOKE: Rgb<u8> = Rgb([0x9c, 0xa3, 0xaf]);
const SCORE_STROKE: Rgb<u8> = Rgb([102, 126, 234]);
/// rgb(102,126,234) 以 0.3 透明度叠在背景上
const SCORE_FILL: Rgb<u8> = Rgb([205, 213, 246]);
const TITLE_COLOR: Rgb<u8> = Rgb([0x11, 0x18, 0x27]);
const CAPTION_COLOR: Rgb<u8> = Rgb([0x37, 0x41, 0x51]);
const LABEL_COLOR: Rgb<u8> = Rgb([0x1f, 0x29, 0x37]);

#[derive(Debug, Default)]
pub struct ImageprocComparisonRenderer;

impl ImageprocComparisonRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// 第 i 个轴上距圆心 r 的点，第一根轴朝正上方
fn radar_point(i: usize, axes: usize, r: f32) -> (f32, f32) {
    let angle = i as f32 * 2.0 * PI / axes as f32 - PI / 2.0;
    (
        RADAR_CENTER.0 + angle.cos() * r,
        RADAR_CENTER.1 + angle.sin() * r,
    )
}

fn draw_closed_path(canvas: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    for (i, &start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line_segment_mut(canvas, start, end, color);
    }
}

/// 以 (cx, cy) 为中心绘制一行文字
fn draw_centered_text(
    canvas: &mut RgbImage,
    font: &FontRef,
    scale: f32,
    color: Rgb<u8>,
    (cx, cy): (f32, f32),
    text: &str,
) {
    let scale = PxScale::from(scale);
    let (w, h) = text_size(scale, font, text);
    let x = (cx - w as f32 / 2.0).round() as i32;
    let y = (cy - h as f32 / 2.0).round() as i32;
    draw_text_mut(canvas, color, x, y, scale, font, text);
}

fn draw_photo(canvas: &mut RgbImage, bytes: &[u8], origin: (u32, u32), slot: &str) {
    match decode_image(bytes) {
        Ok(photo) => {
            let scaled = photo
                .resize_exact(PHOTO_SIZE, PHOTO_SIZE, FilterType::Triangle)
                .to_rgb8();
            imageops::overlay(canvas, &scaled, origin.0 as i64, origin.1 as i64);
        }
        Err(e) => {
            tracing::warn!(slot = slot, error = %e, "Photo undecodable, leaving slot blank");
        }
    }
}

fn draw_radar(canvas: &mut RgbImage, font: &FontRef, scorecard: &Scorecard) {
    let axes = scorecard.axes();
    let n = axes.len();

    let score_points: Vec<(f32, f32)> = axes
        .iter()
        .enumerate()
        .map(|(i, axis)| {
            let value = axis.score.min(MAX_SCORE) as f32;
            radar_point(i, n, RADAR_RADIUS * value / MAX_SCORE as f32)
        })
        .collect();

    let mut polygon: Vec<Point<i32>> = Vec::with_capacity(n);
    for &(x, y) in &score_points {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if polygon.last() != Some(&p) {
            polygon.push(p);
        }
    }
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, &polygon, SCORE_FILL);
    }

    // 网格画在填充之上，模拟半透明
    for ring in 1..=RADAR_RINGS {
        let r = RADAR_RADIUS * ring as f32 / RADAR_RINGS as f32;
        let ring_points: Vec<_> = (0..n).map(|i| radar_point(i, n, r)).collect();
        draw_closed_path(canvas, &ring_points, GRID);
    }
    for i in 0..n {
        draw_line_segment_mut(canvas, RADAR_CENTER, radar_point(i, n, RADAR_RADIUS), SPOKE);
    }

    // 3px 描边
    for offset in [-1.0f32, 0.0, 1.0] {
        let shifted: Vec<_> = score_points
            .iter()
            .map(|&(x, y)| (x + offset, y + offset))
            .collect();
        draw_closed_path(canvas, &shifted, SCORE_STROKE);
    }

    for (i, axis) in axes.iter().enumerate() {
        let position = radar_point(i, n, LABEL_RADIUS);
        draw_centered_text(canvas, font, LABEL_SCALE, LABEL_COLOR, position, axis.label);
    }
}

impl ComparisonRendererPort for ImageprocComparisonRenderer {
    fn render(
        &self,
        item_name: &str,
        original: &[u8],
        result: &[u8],
        scorecard: &Scorecard,
    ) -> Result<Vec<u8>, ExportError> {
        let font = FontRef::try_from_slice(FONT_DATA)
            .map_err(|e| ExportError::Render(format!("invalid font: {}", e)))?;

        let mut canvas = RgbImage::new(CANVAS_SIZE, CANVAS_SIZE);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(CANVAS_SIZE, CANVAS_SIZE),
            BACKGROUND,
        );

        let center_x = CANVAS_SIZE as f32 / 2.0;
        draw_centered_text(
            &mut canvas,
            &font,
            TITLE_SCALE,
            TITLE_COLOR,
            (center_x, 64.0),
            &format!("My \"{}\" Quest", item_name),
        );
        for (label, origin) in [("Original", ORIGINAL_ORIGIN), ("My Result", RESULT_ORIGIN)] {
            let caption_center = (origin.0 as f32 + PHOTO_SIZE as f32 / 2.0, 175.0);
            draw_centered_text(
                &mut canvas,
                &font,
                CAPTION_SCALE,
                CAPTION_COLOR,
                caption_center,
                label,
            );
        }

        draw_photo(&mut canvas, original, ORIGINAL_ORIGIN, "original");
        draw_photo(&mut canvas, result, RESULT_ORIGIN, "result");
        draw_radar(&mut canvas, &font, scorecard);

        encode_png(&DynamicImage::ImageRgb8(canvas)).map_err(|e| ExportError::Render(e.to_string()))
    }
}
