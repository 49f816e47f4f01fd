//! Guide Context - 成品评分
//!
//! 评分维度由指南类型决定，JSON 按类型选择对应结构解码

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::analysis::extract_json_object;
use super::{GuideError, ProtocolKind, ScoreBand};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeScores {
    pub shape_fidelity: u8,
    pub color_accuracy: u8,
    pub detail_complexity: u8,
    pub structural_integrity: u8,
    pub overall_match: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookScores {
    pub color: u8,
    pub texture: u8,
    pub ingredients: u8,
    pub presentation: u8,
    pub portion: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkScores {
    pub landmark_accuracy: u8,
    pub photo_quality: u8,
    pub composition: u8,
    pub context: u8,
    pub overall_impression: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductScores {
    pub item_accuracy: u8,
    pub quality: u8,
    pub presentation: u8,
    pub context: u8,
    pub overall_similarity: u8,
}

/// 单个评分维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreAxis {
    /// 雷达图上的短标签
    pub label: &'static str,
    /// JSON 字段名
    pub key: &'static str,
    pub score: u8,
}

impl ScoreAxis {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

/// 五维评分卡
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scorecard {
    Make(MakeScores),
    Cook(CookScores),
    Landmark(LandmarkScores),
    Product(ProductScores),
}

impl Scorecard {
    pub fn kind(&self) -> ProtocolKind {
        match self {
            Scorecard::Make(_) => ProtocolKind::Make,
            Scorecard::Cook(_) => ProtocolKind::Cook,
            Scorecard::Landmark(_) => ProtocolKind::Landmark,
            Scorecard::Product(_) => ProtocolKind::Product,
        }
    }

    /// 按雷达图顺序列出五个维度
    pub fn axes(&self) -> [ScoreAxis; 5] {
        let axis = |label, key, score| ScoreAxis { label, key, score };
        match self {
            Scorecard::Make(s) => [
                axis("Shape", "shapeFidelity", s.shape_fidelity),
                axis("Color", "colorAccuracy", s.color_accuracy),
                axis("Details", "detailComplexity", s.detail_complexity),
                axis("Integrity", "structuralIntegrity", s.structural_integrity),
                axis("Match", "overallMatch", s.overall_match),
            ],
            Scorecard::Cook(s) => [
                axis("Color", "color", s.color),
                axis("Texture", "texture", s.texture),
                axis("Ingredients", "ingredients", s.ingredients),
                axis("Presentation", "presentation", s.presentation),
                axis("Portion", "portion", s.portion),
            ],
            Scorecard::Landmark(s) => [
                axis("Accuracy", "landmarkAccuracy", s.landmark_accuracy),
                axis("Quality", "photoQuality", s.photo_quality),
                axis("Composition", "composition", s.composition),
                axis("Context", "context", s.context),
                axis("Impression", "overallImpression", s.overall_impression),
            ],
            Scorecard::Product(s) => [
                axis("Accuracy", "itemAccuracy", s.item_accuracy),
                axis("Quality", "quality", s.quality),
                axis("Presentation", "presentation", s.presentation),
                axis("Context", "context", s.context),
                axis("Similarity", "overallSimilarity", s.overall_similarity),
            ],
        }
    }

    pub fn average(&self) -> f32 {
        let axes = self.axes();
        axes.iter().map(|a| a.score as f32).sum::<f32>() / axes.len() as f32
    }

    fn validate(&self) -> Result<(), GuideError> {
        for axis in self.axes() {
            if !(MIN_SCORE..=MAX_SCORE).contains(&axis.score) {
                return Err(GuideError::ScoreOutOfRange {
                    axis: axis.key,
                    value: axis.score,
                });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawResult<S> {
    scores: S,
    feedback: String,
    #[serde(default)]
    overall: Option<String>,
}

/// 成品评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultAnalysis {
    pub scores: Scorecard,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<String>,
}

fn parse_raw<S: DeserializeOwned>(json: &str) -> Result<RawResult<S>, GuideError> {
    serde_json::from_str(json).map_err(|e| GuideError::MalformedJson(e.to_string()))
}

impl ResultAnalysis {
    /// 从模型输出解码评分，维度由指南类型决定
    pub fn decode(kind: ProtocolKind, text: &str) -> Result<Self, GuideError> {
        let json = extract_json_object(text)?;
        let (scores, feedback, overall) = match kind {
            ProtocolKind::Make => {
                let raw = parse_raw::<MakeScores>(json)?;
                (Scorecard::Make(raw.scores), raw.feedback, raw.overall)
            }
            ProtocolKind::Cook => {
                let raw = parse_raw::<CookScores>(json)?;
                (Scorecard::Cook(raw.scores), raw.feedback, raw.overall)
            }
            ProtocolKind::Landmark => {
                let raw = parse_raw::<LandmarkScores>(json)?;
                (Scorecard::Landmark(raw.scores), raw.feedback, raw.overall)
            }
            ProtocolKind::Product => {
                let raw = parse_raw::<ProductScores>(json)?;
                (Scorecard::Product(raw.scores), raw.feedback, raw.overall)
            }
        };

        scores.validate()?;
        if feedback.trim().is_empty() {
            return Err(GuideError::InvalidAnalysis("feedback is empty".to_string()));
        }

        Ok(Self {
            scores,
            feedback,
            overall,
        })
    }

    /// 反馈朗读文本
    pub fn narration_text(&self) -> String {
        format!("Here is your feedback. {}", self.feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_make_scores() {
        let text = r#"{"scores": {"shapeFidelity": 4, "colorAccuracy": 3, "detailComplexity": 5,
            "structuralIntegrity": 4, "overallMatch": 4}, "feedback": "Nice work."}"#;
        let result = ResultAnalysis::decode(ProtocolKind::Make, text).unwrap();

        let labels: Vec<_> = result.scores.axes().iter().map(|a| a.label).collect();
        assert_eq!(labels, ["Shape", "Color", "Details", "Integrity", "Match"]);
        assert_eq!(result.scores.axes()[2].score, 5);
        assert_eq!(result.narration_text(), "Here is your feedback. Nice work.");
    }

    #[test]
    fn test_decode_cook_scores_with_overall() {
        let text = r#"{"scores": {"color": 4, "texture": 3, "ingredients": 5, "presentation": 4,
            "portion": 4}, "feedback": "Tasty.", "overall": "good"}"#;
        let result = ResultAnalysis::decode(ProtocolKind::Cook, text).unwrap();
        assert_eq!(result.scores.kind(), ProtocolKind::Cook);
        assert_eq!(result.overall.as_deref(), Some("good"));
        assert!((result.scores.average() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scores_must_match_kind() {
        let text = r#"{"scores": {"color": 4, "texture": 3, "ingredients": 5, "presentation": 4,
            "portion": 4}, "feedback": "Tasty."}"#;
        let err = ResultAnalysis::decode(ProtocolKind::Landmark, text).unwrap_err();
        assert!(matches!(err, GuideError::MalformedJson(_)));
    }

    #[test]
    fn test_score_out_of_range() {
        let text = r#"{"scores": {"itemAccuracy": 6, "quality": 4, "presentation": 5, "context": 3,
            "overallSimilarity": 4}, "feedback": "Fresh."}"#;
        let err = ResultAnalysis::decode(ProtocolKind::Product, text).unwrap_err();
        assert_eq!(
            err,
            GuideError::ScoreOutOfRange {
                axis: "itemAccuracy",
                value: 6
            }
        );
    }

    #[test]
    fn test_zero_score_rejected() {
        let text = r#"{"scores": {"landmarkAccuracy": 0, "photoQuality": 4, "composition": 3,
            "context": 4, "overallImpression": 4}, "feedback": "Great shot."}"#;
        assert!(ResultAnalysis::decode(ProtocolKind::Landmark, text).is_err());
    }
}
