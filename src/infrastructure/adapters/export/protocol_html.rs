//! Protocol HTML 导出 - 单文件页面，配图以 data URL 内嵌

use base64::Engine;
use minijinja::Value;
use serde::Serialize;

use crate::application::ports::{ExportError, ProtocolExporterPort};
use crate::domain::guide::{Protocol, Step};
use crate::domain::image::sniff_image_mime;

const PROTOCOL_TEMPLATE: &str = "protocol.html.jinja";

/// 图片字节转 data URL，无法识别的格式按 PNG 处理。
/// base64 字符在属性中无需转义，标记为 safe 以免 `/` 被转成实体
fn to_data_url(bytes: Option<Vec<u8>>) -> Option<Value> {
    bytes.map(|b| {
        let mime = sniff_image_mime(&b).unwrap_or("image/png");
        Value::from_safe_string(format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(b)
        ))
    })
}

lazy_static::lazy_static! {
    static ref TEMPLATES: minijinja::Environment<'static> = {
        let mut env = minijinja::Environment::new();
        env.add_template(PROTOCOL_TEMPLATE, include_str!("templates/protocol.html.jinja"))
            .expect("Failed to register template");
        env.add_filter("to_data_url", to_data_url);
        env
    };
}

#[derive(Serialize)]
struct StepView<'a> {
    title: &'a str,
    instruction: &'a str,
    image: Option<&'a [u8]>,
}

impl<'a> From<&'a Step> for StepView<'a> {
    fn from(step: &'a Step) -> Self {
        Self {
            title: &step.title,
            instruction: &step.instruction,
            image: step.image.as_deref(),
        }
    }
}

#[derive(Default)]
pub struct MiniJinjaProtocolExporter;

impl MiniJinjaProtocolExporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProtocolExporterPort for MiniJinjaProtocolExporter {
    fn render_html(&self, protocol: &Protocol) -> Result<String, ExportError> {
        let materials = protocol.materials_step().map(|step| StepView {
            image: protocol.materials_image.as_deref().or(step.image.as_deref()),
            ..StepView::from(step)
        });
        let steps: Vec<StepView> = protocol.action_steps().map(StepView::from).collect();

        let template = TEMPLATES
            .get_template(PROTOCOL_TEMPLATE)
            .map_err(|e| ExportError::Template(e.to_string()))?;
        template
            .render(minijinja::context! {
                title => &protocol.title,
                materials => materials,
                steps => steps,
            })
            .map_err(|e| ExportError::Render(e.to_string()))
    }
}
