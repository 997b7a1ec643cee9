use serde::{Deserialize, Serialize};

use super::JsonObject;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalGuidanceRequest {
    pub session_id: String,
    pub action: String,
    pub context: JsonObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalGuidance {
    pub guidance: String,
    pub cultural_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub sensitivity: Sensitivity,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guidance_wire_shape() {
        let guidance = CulturalGuidance {
            guidance: "g".to_string(),
            cultural_factors: vec![],
            recommendations: vec![],
            sensitivity: Sensitivity::Medium,
        };

        assert_eq!(
            serde_json::to_value(&guidance).unwrap(),
            json!({
                "guidance": "g",
                "culturalFactors": [],
                "recommendations": [],
                "sensitivity": "medium"
            })
        );
    }

    #[test]
    fn test_context_is_required() {
        let result: Result<CulturalGuidanceRequest, _> =
            serde_json::from_value(json!({"sessionId": "s", "action": "offer"}));
        assert!(result.is_err());
    }
}
