//! Guide Context - 上游分析结果
//!
//! 模型返回的 JSON 形状随流程不同而变化，这里按流程定义为强类型，
//! 反序列化后再做严格校验，不做“可选链 + 猜测”。

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::GuideError;

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"\{[\s\S]*\}").expect("valid json regex");
}

/// 从模型输出文本中截取第一个 `{` 到最后一个 `}`
pub fn extract_json_object(text: &str) -> Result<&str, GuideError> {
    JSON_OBJECT
        .find(text)
        .map(|m| m.as_str())
        .ok_or(GuideError::MissingJson)
}

/// 反序列化后的业务校验
pub trait Validate {
    fn validate(&self) -> Result<(), GuideError>;
}

/// 截取 JSON、反序列化并校验
pub fn decode_model_json<T>(text: &str) -> Result<T, GuideError>
where
    T: DeserializeOwned + Validate,
{
    let json = extract_json_object(text)?;
    let value: T =
        serde_json::from_str(json).map_err(|e| GuideError::MalformedJson(e.to_string()))?;
    value.validate()?;
    Ok(value)
}

fn require_text(field: &str, value: &str) -> Result<(), GuideError> {
    if value.trim().is_empty() {
        return Err(GuideError::InvalidAnalysis(format!("{} is empty", field)));
    }
    Ok(())
}

/// 分析得到的一步
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedStep {
    #[serde(default)]
    pub id: Option<u32>,
    pub title: String,
    pub instruction: String,
}

impl AnalyzedStep {
    fn validate(&self, index: usize) -> Result<(), GuideError> {
        require_text(&format!("step {} title", index + 1), &self.title)?;
        require_text(&format!("step {} instruction", index + 1), &self.instruction)
    }
}

/// "Make It" 分析：物品、材料与四个制作步骤
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeAnalysis {
    pub item_name: String,
    #[serde(default)]
    pub materials: Vec<String>,
    pub making_steps: Vec<AnalyzedStep>,
}

/// 制作步骤数量，与拼图象限数一致
pub const MAKING_STEP_COUNT: usize = 4;

impl Validate for MakeAnalysis {
    fn validate(&self) -> Result<(), GuideError> {
        require_text("itemName", &self.item_name)?;
        if self.making_steps.len() != MAKING_STEP_COUNT {
            return Err(GuideError::InvalidAnalysis(format!(
                "expected {} making steps, got {}",
                MAKING_STEP_COUNT,
                self.making_steps.len()
            )));
        }
        for (i, step) in self.making_steps.iter().enumerate() {
            step.validate(i)?;
        }
        Ok(())
    }
}

/// 菜品分析：菜名与 4~6 个烹饪步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookAnalysis {
    pub dish_name: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    pub cooking_steps: Vec<AnalyzedStep>,
}

pub const MIN_COOKING_STEPS: usize = 4;
pub const MAX_COOKING_STEPS: usize = 6;

impl Validate for CookAnalysis {
    fn validate(&self) -> Result<(), GuideError> {
        require_text("dishName", &self.dish_name)?;
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(GuideError::InvalidAnalysis(format!(
                    "confidence out of range: {}",
                    confidence
                )));
            }
        }
        let count = self.cooking_steps.len();
        if !(MIN_COOKING_STEPS..=MAX_COOKING_STEPS).contains(&count) {
            return Err(GuideError::InvalidAnalysis(format!(
                "expected {}-{} cooking steps, got {}",
                MIN_COOKING_STEPS, MAX_COOKING_STEPS, count
            )));
        }
        for (i, step) in self.cooking_steps.iter().enumerate() {
            step.validate(i)?;
        }
        Ok(())
    }
}

/// 获取商品的一种途径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionMethod {
    pub title: String,
    pub description: String,
}

pub const MAX_ACQUISITION_METHODS: usize = 4;

/// "Find It" 分析，以 `findType` 作为判别字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "findType", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FindAnalysis {
    Product {
        item_name: String,
        methods: Vec<AcquisitionMethod>,
    },
    Landmark {
        item_name: String,
        location: String,
        description: String,
    },
}

impl FindAnalysis {
    pub fn item_name(&self) -> &str {
        match self {
            FindAnalysis::Product { item_name, .. } => item_name,
            FindAnalysis::Landmark { item_name, .. } => item_name,
        }
    }
}

impl Validate for FindAnalysis {
    fn validate(&self) -> Result<(), GuideError> {
        require_text("itemName", self.item_name())?;
        match self {
            FindAnalysis::Product { methods, .. } => {
                if methods.is_empty() || methods.len() > MAX_ACQUISITION_METHODS {
                    return Err(GuideError::InvalidAnalysis(format!(
                        "expected 1-{} methods, got {}",
                        MAX_ACQUISITION_METHODS,
                        methods.len()
                    )));
                }
                for method in methods {
                    require_text("method title", &method.title)?;
                    require_text("method description", &method.description)?;
                }
                Ok(())
            }
            FindAnalysis::Landmark {
                location,
                description,
                ..
            } => {
                require_text("location", location)?;
                require_text("description", description)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAKE_TEXT: &str = r#"Sure! Here it is:
```json
{"itemName": "Lego Starship", "materials": ["150 bricks", "minifigure"],
 "makingSteps": [
   {"id": 1, "title": "Build Body", "instruction": "Assemble the body."},
   {"id": 2, "title": "Add Wings", "instruction": "Attach both wings."},
   {"id": 3, "title": "Cockpit", "instruction": "Place the cockpit."},
   {"id": 4, "title": "Finish", "instruction": "Add the minifigure."}
 ]}
```"#;

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("x {\"a\": {\"b\": 1}} y").unwrap(), "{\"a\": {\"b\": 1}}");
        assert_eq!(extract_json_object("no json"), Err(GuideError::MissingJson));
    }

    #[test]
    fn test_decode_make_analysis() {
        let analysis: MakeAnalysis = decode_model_json(MAKE_TEXT).unwrap();
        assert_eq!(analysis.item_name, "Lego Starship");
        assert_eq!(analysis.materials.len(), 2);
        assert_eq!(analysis.making_steps[3].title, "Finish");
    }

    #[test]
    fn test_make_analysis_requires_four_steps() {
        let text = r#"{"itemName": "Kite", "materials": [], "makingSteps": [
            {"title": "Cut", "instruction": "Cut the paper."}]}"#;
        let err = decode_model_json::<MakeAnalysis>(text).unwrap_err();
        assert!(matches!(err, GuideError::InvalidAnalysis(_)));
    }

    #[test]
    fn test_decode_find_product() {
        let text = r#"{"itemName": "Pepperoni Pizza", "findType": "product", "methods": [
            {"title": "Restaurant", "description": "Visit a local pizzeria."},
            {"title": "Delivery App", "description": "Order through an app."}]}"#;
        let analysis: FindAnalysis = decode_model_json(text).unwrap();
        match analysis {
            FindAnalysis::Product { item_name, methods } => {
                assert_eq!(item_name, "Pepperoni Pizza");
                assert_eq!(methods.len(), 2);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_decode_find_landmark() {
        let text = r#"{"itemName": "Golden Gate Bridge", "findType": "landmark",
            "location": "San Francisco, USA", "description": "An iconic suspension bridge."}"#;
        let analysis: FindAnalysis = decode_model_json(text).unwrap();
        assert_eq!(analysis.item_name(), "Golden Gate Bridge");
        assert!(matches!(analysis, FindAnalysis::Landmark { .. }));
    }

    #[test]
    fn test_find_rejects_unknown_type() {
        let text = r#"{"itemName": "Thing", "findType": "animal"}"#;
        let err = decode_model_json::<FindAnalysis>(text).unwrap_err();
        assert!(matches!(err, GuideError::MalformedJson(_)));
    }

    #[test]
    fn test_find_landmark_missing_location() {
        let text = r#"{"itemName": "Big Ben", "findType": "landmark", "description": "A clock."}"#;
        assert!(decode_model_json::<FindAnalysis>(text).is_err());
    }

    #[test]
    fn test_cook_analysis_bounds() {
        let step = r#"{"id": 1, "title": "Boil", "instruction": "Boil water."}"#;
        let three = format!(
            r#"{{"dishName": "Coffee", "confidence": 0.9, "cookingSteps": [{s},{s},{s}]}}"#,
            s = step
        );
        assert!(decode_model_json::<CookAnalysis>(&three).is_err());

        let four = format!(
            r#"{{"dishName": "Coffee", "confidence": 0.9, "cookingSteps": [{s},{s},{s},{s}]}}"#,
            s = step
        );
        let analysis: CookAnalysis = decode_model_json(&four).unwrap();
        assert_eq!(analysis.cooking_steps.len(), 4);

        let bad_confidence = four.replace("0.9", "1.5");
        assert!(decode_model_json::<CookAnalysis>(&bad_confidence).is_err());
    }
}
