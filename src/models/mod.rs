mod cultural;
mod health;
mod negotiation;
mod price;
mod translation;

/// Free-form JSON object supplied by callers (context, product info, ...).
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use cultural::{CulturalGuidance, CulturalGuidanceRequest, Sensitivity};
pub use health::{HealthResponse, HealthStatus, ServiceStatus, ServicesHealth};
pub use negotiation::{NegotiationSession, NegotiationStatus, StartNegotiationRequest};
pub use price::{PriceRange, PriceRecommendation, PriceRecommendationRequest};
pub use translation::{
    Language, LanguagesResponse, SUPPORTED_LANGUAGES, TranslateRequest, TranslationResult,
    TranslationValidation, VoiceTranslateRequest, VoiceTranslationResult,
};
