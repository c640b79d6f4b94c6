use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MatcherError;
use crate::pipeline::types::ColorMatch;

pub const RESULT_GROUP: &str = "perception_result";
pub const MODULE_GROUP: &str = "color_matcher";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisEntry {
    pub name: String,
    pub score: f64,
}

/// Wire form of one entity's `color_matcher` group. Empty lists are omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorMatcherGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hypothesis: Vec<HypothesisEntry>,
}

impl From<&ColorMatch> for ColorMatcherGroup {
    fn from(result: &ColorMatch) -> Self {
        Self {
            colors: result
                .observation
                .distribution
                .iter()
                .map(|(color, value)| ColorEntry {
                    name: color.to_string(),
                    value,
                })
                .collect(),
            hypothesis: result
                .hypothesis
                .iter()
                .map(|(name, score)| HypothesisEntry {
                    name: name.to_string(),
                    score,
                })
                .collect(),
        }
    }
}

impl ColorMatcherGroup {
    /// Reads the group back out of a result document, if present.
    pub fn read(document: &Value) -> Option<Result<Self, serde_json::Error>> {
        document
            .get(RESULT_GROUP)
            .and_then(|group| group.get(MODULE_GROUP))
            .map(|group| serde_json::from_value(group.clone()))
    }
}

/// Writes classification results into the shared result document under
/// `perception_result.color_matcher`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultEmitter;

impl ResultEmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, result: &ColorMatch, document: &mut Value) -> Result<(), MatcherError> {
        let group = serde_json::to_value(ColorMatcherGroup::from(result))?;

        if document.is_null() {
            *document = Value::Object(Map::new());
        }
        let root = document
            .as_object_mut()
            .ok_or_else(|| MatcherError::MalformedResult("document".to_string()))?;

        let perception = root
            .entry(RESULT_GROUP)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| MatcherError::MalformedResult(RESULT_GROUP.to_string()))?;

        perception.insert(MODULE_GROUP.to_string(), group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{
        ColorDistribution, ColorHistogram, ColorName, ColorObservation, Hypothesis,
        RegionOfInterest,
    };
    use serde_json::json;

    fn sample_match() -> ColorMatch {
        let mut histogram = ColorHistogram::new();
        for _ in 0..3 {
            histogram.increment(ColorName::Red);
        }
        histogram.increment(ColorName::Blue);
        let distribution = ColorDistribution::from_histogram(&histogram).unwrap();

        let mut hypothesis = Hypothesis::new();
        hypothesis.insert("mug", 0.25);
        hypothesis.insert("apple", 0.75);

        ColorMatch {
            region: RegionOfInterest::new(0, 0, 1, 1),
            observation: ColorObservation {
                distribution,
                histogram,
            },
            hypothesis,
        }
    }

    #[test]
    fn test_writes_nested_group() {
        let mut document = Value::Null;
        ResultEmitter::new().emit(&sample_match(), &mut document).unwrap();

        assert_eq!(
            document,
            json!({
                "perception_result": {
                    "color_matcher": {
                        "colors": [
                            {"name": "blue", "value": 0.25},
                            {"name": "red", "value": 0.75}
                        ],
                        "hypothesis": [
                            {"name": "apple", "score": 0.75},
                            {"name": "mug", "score": 0.25}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_keeps_other_modules_results() {
        let mut document = json!({
            "perception_result": { "size_matcher": { "size": { "height": 0.2 } } },
            "id": "entity-1"
        });
        ResultEmitter::new().emit(&sample_match(), &mut document).unwrap();

        assert_eq!(document["id"], "entity-1");
        assert_eq!(document["perception_result"]["size_matcher"]["size"]["height"], 0.2);
        assert!(document["perception_result"]["color_matcher"].is_object());
    }

    #[test]
    fn test_empty_hypothesis_is_omitted() {
        let mut result = sample_match();
        result.hypothesis = Hypothesis::new();
        let mut document = Value::Null;
        ResultEmitter::new().emit(&result, &mut document).unwrap();

        let group = &document["perception_result"]["color_matcher"];
        assert!(group.get("hypothesis").is_none());
        assert!(group.get("colors").is_some());
    }

    #[test]
    fn test_rejects_non_object_documents() {
        let mut document = json!({ "perception_result": [1, 2] });
        let error = ResultEmitter::new().emit(&sample_match(), &mut document);
        assert!(matches!(error, Err(MatcherError::MalformedResult(field)) if field == RESULT_GROUP));
    }

    #[test]
    fn test_group_reads_back_from_document() {
        let mut document = Value::Null;
        let result = sample_match();
        ResultEmitter::new().emit(&result, &mut document).unwrap();

        let group = ColorMatcherGroup::read(&document).unwrap().unwrap();
        assert_eq!(group, ColorMatcherGroup::from(&result));
    }
}
