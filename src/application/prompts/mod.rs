//! 提示词模板
//!
//! 模板以 Markdown 文件随二进制编译进来，`{name}` 形式的占位符在调用时替换

use crate::domain::guide::{AnalyzedStep, Protocol, ProtocolKind};

/// 朗读语气前缀
pub const NARRATION_TONE_PREFIX: &str = "Speak in a friendly, clear, and encouraging tone: ";

pub fn make_analysis() -> &'static str {
    include_str!("make_analysis.md").trim_end()
}

pub fn cook_analysis() -> &'static str {
    include_str!("cook_analysis.md").trim_end()
}

pub fn find_analysis() -> &'static str {
    include_str!("find_analysis.md").trim_end()
}

/// 评分提示词，按指南类型选择
pub fn score_result(protocol: &Protocol) -> String {
    match protocol.kind {
        ProtocolKind::Make => include_str!("score_make.md")
            .trim_end()
            .replace("{title}", &protocol.title),
        ProtocolKind::Cook => include_str!("score_cook.md")
            .trim_end()
            .replace("{title}", &protocol.title),
        ProtocolKind::Landmark => include_str!("score_landmark.md")
            .trim_end()
            .replace("{item}", &protocol.item_name)
            .replace("{location}", protocol.location.as_deref().unwrap_or("its location")),
        ProtocolKind::Product => include_str!("score_product.md")
            .trim_end()
            .replace("{item}", &protocol.item_name),
    }
}

pub fn materials_image(item: &str, materials: &[String]) -> String {
    include_str!("materials_image.md")
        .trim_end()
        .replace("{item}", item)
        .replace("{materials}", &materials.join(", "))
}

/// 2×2 拼图提示词，步骤按阅读顺序放入四个象限
pub fn make_composite(item: &str, steps: &[AnalyzedStep]) -> String {
    let instruction = |i: usize| steps.get(i).map(|s| s.instruction.as_str()).unwrap_or("");
    include_str!("make_composite.md")
        .trim_end()
        .replace("{item}", item)
        .replace("{step1}", instruction(0))
        .replace("{step2}", instruction(1))
        .replace("{step3}", instruction(2))
        .replace("{step4}", instruction(3))
}

pub fn cook_step_image(instruction: &str) -> String {
    include_str!("cook_step_image.md")
        .trim_end()
        .replace("{instruction}", instruction)
}

pub fn landmark_image(item: &str, location: &str) -> String {
    include_str!("landmark_image.md")
        .trim_end()
        .replace("{item}", item)
        .replace("{location}", location)
}

pub fn product_method_image(item: &str, method: &str) -> String {
    include_str!("product_method_image.md")
        .trim_end()
        .replace("{item}", item)
        .replace("{method}", method)
}

pub fn narration(text: &str) -> String {
    format!("{}{}", NARRATION_TONE_PREFIX, text)
}
