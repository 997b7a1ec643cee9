use serde::{Deserialize, Serialize};

use super::JsonObject;

/// Request to translate a piece of text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Optional cultural hints; not part of the cache key
    #[serde(default)]
    pub cultural_context: Option<JsonObject>,
}

/// Request to translate recorded speech.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTranslateRequest {
    /// Base64-encoded audio
    pub audio_data: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Result of a text translation.
///
/// Cached by `(text, sourceLang, targetLang)`; a cache hit returns the same
/// shared instance that was stored on the miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    pub confidence: f64,
    pub cultural_adaptations: Vec<String>,
    pub alternative_translations: Vec<String>,
    pub requires_verification: bool,
}

/// Result of a voice translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTranslationResult {
    pub original_text: String,
    pub translated_text: String,
    /// Base64-encoded synthesized audio
    pub audio_output: String,
    pub confidence: f64,
}

/// Quality assessment of a translation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationValidation {
    pub is_valid: bool,
    pub confidence: f64,
    pub requires_human_review: bool,
    pub suggestions: Vec<String>,
}

/// A language the translation service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

impl Language {
    const fn new(code: &'static str, name: &'static str, native_name: &'static str) -> Self {
        Self {
            code,
            name,
            native_name,
        }
    }
}

pub const SUPPORTED_LANGUAGES: [Language; 12] = [
    Language::new("en", "English", "English"),
    Language::new("hi", "Hindi", "हिन्दी"),
    Language::new("bn", "Bengali", "বাংলা"),
    Language::new("te", "Telugu", "తెలుగు"),
    Language::new("mr", "Marathi", "मराठी"),
    Language::new("ta", "Tamil", "தமிழ்"),
    Language::new("gu", "Gujarati", "ગુજરાતી"),
    Language::new("kn", "Kannada", "ಕನ್ನಡ"),
    Language::new("ml", "Malayalam", "മലയാളം"),
    Language::new("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    Language::new("or", "Odia", "ଓଡ଼ିଆ"),
    Language::new("as", "Assamese", "অসমীয়া"),
];

/// Response for `GET /api/v1/translation/languages`.
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [Language],
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translate_request_camel_case() {
        let req: TranslateRequest = serde_json::from_value(json!({
            "text": "hello",
            "sourceLang": "en",
            "targetLang": "hi"
        }))
        .unwrap();

        assert_eq!(req.source_lang, "en");
        assert_eq!(req.target_lang, "hi");
        assert!(req.cultural_context.is_none());
    }

    #[test]
    fn test_cultural_context_must_be_object() {
        let result: Result<TranslateRequest, _> = serde_json::from_value(json!({
            "text": "hello",
            "sourceLang": "en",
            "targetLang": "hi",
            "culturalContext": "formal"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_translation_result_wire_names() {
        let result = TranslationResult {
            translated_text: "[TRANSLATED] hello".to_string(),
            confidence: 0.95,
            cultural_adaptations: vec![],
            alternative_translations: vec![],
            requires_verification: false,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["translatedText"], "[TRANSLATED] hello");
        assert_eq!(value["confidence"], 0.95);
        assert_eq!(value["culturalAdaptations"], json!([]));
        assert_eq!(value["alternativeTranslations"], json!([]));
        assert_eq!(value["requiresVerification"], false);
    }

    #[test]
    fn test_supported_languages_table() {
        let codes: Vec<_> = SUPPORTED_LANGUAGES.iter().map(|l| l.code).collect();
        assert_eq!(
            codes,
            ["en", "hi", "bn", "te", "mr", "ta", "gu", "kn", "ml", "pa", "or", "as"]
        );

        let value = serde_json::to_value(SUPPORTED_LANGUAGES[1]).unwrap();
        assert_eq!(
            value,
            json!({"code": "hi", "name": "Hindi", "nativeName": "हिन्दी"})
        );
    }
}
