//! Image - 拼图切分与编解码

mod composite;

pub use composite::{
    check_quadrants_nonempty, decode_image, encode_png, sniff_image_mime, split_composite,
    split_composite_nonempty, split_quadrants, Quadrant, QUADRANT_COUNT,
};
