use serde::{Deserialize, Serialize};

use super::JsonObject;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNegotiationRequest {
    pub vendor_id: String,
    pub buyer_id: String,
    pub product_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    Active,
}

/// A negotiation between one vendor and one buyer over one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationSession {
    /// `neg_<vendor>_<buyer>_<product>`
    pub session_id: String,
    /// `[vendor, buyer]`
    pub participants: Vec<String>,
    pub product_id: String,
    pub status: NegotiationStatus,
    pub cultural_context: JsonObject,
    pub negotiation_history: Vec<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_is_lowercase() {
        assert_eq!(
            serde_json::to_value(NegotiationStatus::Active).unwrap(),
            json!("active")
        );
    }

    #[test]
    fn test_start_request_fields() {
        let req: StartNegotiationRequest = serde_json::from_value(json!({
            "vendorId": "v1",
            "buyerId": "b1",
            "productId": "p1"
        }))
        .unwrap();
        assert_eq!(req.vendor_id, "v1");
        assert_eq!(req.buyer_id, "b1");
        assert_eq!(req.product_id, "p1");
    }
}
