use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::JsonObject;

/// Request for a price recommendation.
///
/// The three descriptors are free-form objects supplied by the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecommendationRequest {
    pub product_info: JsonObject,
    pub vendor_info: JsonObject,
    pub location_info: JsonObject,
}

/// Suggested price band. Serialized as JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecommendation {
    #[serde(with = "rust_decimal::serde::float")]
    pub suggested_price: Decimal,
    pub price_range: PriceRange,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub market_factors: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub seasonal_adjustments: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prices_serialize_as_numbers() {
        let rec = PriceRecommendation {
            suggested_price: Decimal::new(100, 0),
            price_range: PriceRange {
                min: Decimal::new(80, 0),
                max: Decimal::new(120, 0),
            },
            confidence: 0.85,
            reasoning: vec![],
            market_factors: vec![],
            seasonal_adjustments: Decimal::ZERO,
        };

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["suggestedPrice"], json!(100.0));
        assert_eq!(value["priceRange"], json!({"min": 80.0, "max": 120.0}));
        assert_eq!(value["seasonalAdjustments"], json!(0.0));
    }

    #[test]
    fn test_request_requires_all_descriptors() {
        let result: Result<PriceRecommendationRequest, _> = serde_json::from_value(json!({
            "productInfo": {"name": "tomatoes"},
            "vendorInfo": {}
        }));
        assert!(result.is_err());
    }
}
