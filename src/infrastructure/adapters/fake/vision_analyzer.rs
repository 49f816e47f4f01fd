//! Fake Vision Analyzer - 离线分析器
//!
//! 按提示词里出现的 JSON 字段判断是哪一类请求，返回固定的模型文本，
//! 不实际调用上游服务

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{UpstreamError, VisionAnalyzerPort};
use crate::domain::guide::UploadedImage;

/// 预置菜谱
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CannedRecipe {
    #[default]
    Pizza,
    Coffee,
    Sandwich,
}

/// 预置的寻找类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CannedFind {
    #[default]
    Product,
    Landmark,
}

/// 预置的评分档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CannedQuality {
    #[default]
    Good,
    Okay,
    Poor,
}

/// Fake Vision Analyzer 配置
#[derive(Debug, Clone, Default)]
pub struct FakeVisionConfig {
    pub recipe: CannedRecipe,
    pub find: CannedFind,
    pub quality: CannedQuality,
}

pub struct FakeVisionAnalyzer {
    config: FakeVisionConfig,
    /// 固定返回的文本，优先于预置数据
    fixed_response: Option<String>,
    calls: AtomicUsize,
}

impl FakeVisionAnalyzer {
    pub fn new(config: FakeVisionConfig) -> Self {
        Self {
            config,
            fixed_response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeVisionConfig::default())
    }

    /// 每次都返回同一段文本
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            config: FakeVisionConfig::default(),
            fixed_response: Some(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, prompt: &str) -> Result<String, UpstreamError> {
        if let Some(text) = &self.fixed_response {
            return Ok(text.clone());
        }

        let body = if prompt.contains("\"scores\"") {
            self.scores(prompt)
        } else if prompt.contains("makingSteps") {
            make_analysis()
        } else if prompt.contains("cookingSteps") {
            cook_analysis(self.config.recipe)
        } else if prompt.contains("findType") {
            find_analysis(self.config.find)
        } else {
            return Err(UpstreamError::malformed("fake analyzer does not know this prompt"));
        };

        // 模拟模型在 JSON 外包一层说明文字
        Ok(format!("Here is the analysis:\n```json\n{}\n```", body))
    }

    fn scores(&self, prompt: &str) -> String {
        let values: [u8; 5] = match self.config.quality {
            CannedQuality::Good => [5, 4, 5, 4, 4],
            CannedQuality::Okay => [3, 4, 3, 3, 4],
            CannedQuality::Poor => [2, 2, 2, 2, 3],
        };
        let (feedback, overall) = match self.config.quality {
            CannedQuality::Good => ("Excellent work! It looks great with a convincing finish and strong detail.", "good"),
            CannedQuality::Okay => ("Good effort! Pay more attention to the details and the overall finish next time.", "okay"),
            CannedQuality::Poor => ("Keep practicing! Take more time on each step and compare against the guide as you go.", "poor"),
        };

        let keys: [&str; 5] = if prompt.contains("shapeFidelity") {
            ["shapeFidelity", "colorAccuracy", "detailComplexity", "structuralIntegrity", "overallMatch"]
        } else if prompt.contains("landmarkAccuracy") {
            ["landmarkAccuracy", "photoQuality", "composition", "context", "overallImpression"]
        } else if prompt.contains("itemAccuracy") {
            ["itemAccuracy", "quality", "presentation", "context", "overallSimilarity"]
        } else {
            ["color", "texture", "ingredients", "presentation", "portion"]
        };

        let scores: serde_json::Map<String, serde_json::Value> = keys
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        json!({ "scores": scores, "feedback": feedback, "overall": overall }).to_string()
    }
}

fn make_analysis() -> String {
    json!({
        "itemName": "Lego Starship",
        "materials": ["150 assorted Lego bricks", "Lego minifigure", "Baseplate"],
        "makingSteps": [
            { "id": 1, "title": "Build Body", "instruction": "Assemble the main body of the ship." },
            { "id": 2, "title": "Add Wings", "instruction": "Attach a wing to each side of the body." },
            { "id": 3, "title": "Fit Cockpit", "instruction": "Place the cockpit canopy on the front." },
            { "id": 4, "title": "Crew Up", "instruction": "Seat the minifigure and add the final details." }
        ]
    })
    .to_string()
}

fn cook_analysis(recipe: CannedRecipe) -> String {
    let (dish, steps): (&str, &[(&str, &str)]) = match recipe {
        CannedRecipe::Pizza => (
            "Homemade Pizza",
            &[
                ("Preheat", "Preheat oven to 450°F"),
                ("Roll Dough", "Roll out pizza dough on floured surface"),
                ("Add Sauce", "Spread tomato sauce evenly"),
                ("Add Cheese", "Sprinkle mozzarella cheese generously"),
                ("Add Toppings", "Add your favorite toppings"),
                ("Bake", "Bake for 12-15 minutes until golden"),
            ],
        ),
        CannedRecipe::Coffee => (
            "Perfect Coffee",
            &[
                ("Boil Water", "Boil water to 200°F"),
                ("Grind Beans", "Grind coffee beans to medium coarse"),
                ("Add Coffee", "Add ground coffee to filter"),
                ("Pour & Enjoy", "Pour hot water slowly and enjoy"),
            ],
        ),
        CannedRecipe::Sandwich => (
            "Gourmet Sandwich",
            &[
                ("Toast Bread", "Toast bread slices until golden"),
                ("Add Spread", "Apply mayo or mustard"),
                ("Layer Meat", "Add sliced turkey or ham"),
                ("Add Veggies", "Layer lettuce, tomato, and cheese"),
                ("Assemble", "Close sandwich and cut diagonally"),
            ],
        ),
    };

    let steps: Vec<_> = steps
        .iter()
        .enumerate()
        .map(|(i, (title, instruction))| {
            json!({ "id": i + 1, "title": title, "instruction": instruction })
        })
        .collect();

    json!({ "dishName": dish, "confidence": 0.9, "cookingSteps": steps }).to_string()
}

fn find_analysis(find: CannedFind) -> String {
    match find {
        CannedFind::Product => json!({
            "itemName": "Pepperoni Pizza",
            "findType": "product",
            "methods": [
                { "title": "Restaurant", "description": "Visit a local pizzeria or a chain like Domino's." },
                { "title": "Delivery App", "description": "Order for delivery through an app like Uber Eats or DoorDash." },
                { "title": "Grocery Store", "description": "Buy a frozen pizza from the supermarket." }
            ]
        }),
        CannedFind::Landmark => json!({
            "itemName": "Golden Gate Bridge",
            "findType": "landmark",
            "location": "San Francisco, USA",
            "description": "An iconic suspension bridge that is a symbol of California."
        }),
    }
    .to_string()
}

#[async_trait]
impl VisionAnalyzerPort for FakeVisionAnalyzer {
    async fn analyze(&self, prompt: &str, image: &UploadedImage) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            prompt_len = prompt.len(),
            mime_type = %image.mime_type(),
            "FakeVisionAnalyzer: returning canned analysis"
        );
        self.respond(prompt)
    }
}
