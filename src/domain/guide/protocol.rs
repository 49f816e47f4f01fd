//! Guide Context - Protocol 聚合根
//!
//! 一份可执行的指南：标题、步骤及其配图。配图字节不进入 JSON，
//! 由存储层单独写成 PNG。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::{AnalyzedStep, CookAnalysis, FindAnalysis, MakeAnalysis};
use super::{ProtocolKind, Step};

/// 材料步骤的固定 ID
pub const MATERIALS_STEP_ID: u32 = 0;

/// 指南聚合根
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: Uuid,
    pub kind: ProtocolKind,
    pub title: String,
    pub item_name: String,
    /// 仅地标指南有值，评分提示词会用到
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip)]
    pub materials_image: Option<Vec<u8>>,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

fn analyzed_steps(steps: &[AnalyzedStep]) -> Vec<Step> {
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Step::new(
                s.id.unwrap_or(i as u32 + 1),
                s.title.clone(),
                s.instruction.clone(),
            )
        })
        .collect()
}

impl Protocol {
    pub fn new(kind: ProtocolKind, title: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            item_name: item_name.into(),
            location: None,
            materials_image: None,
            steps: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// 制作指南：材料步骤 + 四个制作步骤，配图稍后填充
    pub fn for_make(analysis: &MakeAnalysis) -> Self {
        let mut protocol = Self::new(ProtocolKind::Make, &analysis.item_name, &analysis.item_name);
        protocol.steps.push(Step::new(
            MATERIALS_STEP_ID,
            "Materials",
            materials_instruction(&analysis.materials),
        ));
        protocol.steps.extend(analyzed_steps(&analysis.making_steps));
        protocol
    }

    /// 烹饪指南
    pub fn for_cook(analysis: &CookAnalysis) -> Self {
        let mut protocol = Self::new(ProtocolKind::Cook, &analysis.dish_name, &analysis.dish_name);
        protocol.steps = analyzed_steps(&analysis.cooking_steps);
        protocol
    }

    /// 寻找指南：商品每种途径一步，地标只有一步
    pub fn for_find(analysis: &FindAnalysis) -> Self {
        match analysis {
            FindAnalysis::Product { item_name, methods } => {
                let mut protocol =
                    Self::new(ProtocolKind::Product, format!("How to get {}", item_name), item_name);
                protocol.steps = methods
                    .iter()
                    .enumerate()
                    .map(|(i, m)| Step::new(i as u32 + 1, m.title.clone(), m.description.clone()))
                    .collect();
                protocol
            }
            FindAnalysis::Landmark {
                item_name,
                location,
                description,
            } => {
                let mut protocol = Self::new(
                    ProtocolKind::Landmark,
                    format!("How to visit {}", item_name),
                    item_name,
                );
                protocol.location = Some(location.clone());
                protocol.steps = vec![Step::new(1, location.clone(), description.clone())];
                protocol
            }
        }
    }

    pub fn materials_step(&self) -> Option<&Step> {
        match self.kind {
            ProtocolKind::Make => self.steps.iter().find(|s| s.id == MATERIALS_STEP_ID),
            _ => None,
        }
    }

    /// 除材料步骤外的步骤
    pub fn action_steps(&self) -> impl Iterator<Item = &Step> {
        let skip_materials = self.kind == ProtocolKind::Make;
        self.steps
            .iter()
            .filter(move |s| !(skip_materials && s.id == MATERIALS_STEP_ID))
    }

    pub fn action_steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        let skip_materials = self.kind == ProtocolKind::Make;
        self.steps
            .iter_mut()
            .filter(move |s| !(skip_materials && s.id == MATERIALS_STEP_ID))
    }

    /// 导出文件名（不含扩展名）
    pub fn file_stem(&self) -> String {
        format!("protocol-{}", slugify(&self.title))
    }
}

/// `"First, gather your materials: a, b."`
pub fn materials_instruction(materials: &[String]) -> String {
    format!("First, gather your materials: {}.", materials.join(", "))
}

/// 小写并把连续空白替换为 `-`
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
