//! Translation handlers.
//!
//! # Endpoints
//!
//! - `POST /api/v1/translation/translate` - Translate text (cached)
//! - `POST /api/v1/translation/translate/voice` - Translate base64 audio
//! - `GET /api/v1/translation/languages` - List supported languages

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::{ApiJson, call_service};
use crate::error::AppResult;
use crate::models::{
    LanguagesResponse, TranslateRequest, TranslationResult, VoiceTranslateRequest,
    VoiceTranslationResult,
};
use crate::services::{AiService, TranslationService};
use crate::state::AppState;
use crate::validation::{decode_audio, validate_language_code, validate_text};

/// Translate a piece of text.
///
/// # Request Body
///
/// ```json
/// { "text": "hello", "sourceLang": "en", "targetLang": "hi", "culturalContext": {} }
/// ```
///
/// Repeating the same `(text, sourceLang, targetLang)` within the cache TTL
/// returns the cached result without re-running the translation.
#[instrument(
    skip(state, payload),
    fields(source_lang = %payload.source_lang, target_lang = %payload.target_lang)
)]
pub async fn translate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TranslateRequest>,
) -> AppResult<Json<TranslationResult>> {
    validate_text(&payload.text)?;
    validate_language_code(&payload.source_lang, "sourceLang")?;
    validate_language_code(&payload.target_lang, "targetLang")?;

    let result = call_service(
        &state,
        TranslationService::NAME,
        "translate_text",
        state.translation.translate_text(
            &payload.text,
            &payload.source_lang,
            &payload.target_lang,
            payload.cultural_context.as_ref(),
        ),
    )
    .await?;

    Ok(Json(Arc::unwrap_or_clone(result)))
}

/// Translate recorded speech.
///
/// # Request Body
///
/// ```json
/// { "audioData": "<base64>", "sourceLang": "en", "targetLang": "hi" }
/// ```
#[instrument(
    skip(state, payload),
    fields(source_lang = %payload.source_lang, target_lang = %payload.target_lang)
)]
pub async fn translate_voice(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VoiceTranslateRequest>,
) -> AppResult<Json<VoiceTranslationResult>> {
    validate_language_code(&payload.source_lang, "sourceLang")?;
    validate_language_code(&payload.target_lang, "targetLang")?;
    let audio = decode_audio(&payload.audio_data)?;

    let result = call_service(
        &state,
        TranslationService::NAME,
        "translate_voice",
        state
            .translation
            .translate_voice(&audio, &payload.source_lang, &payload.target_lang),
    )
    .await?;

    Ok(Json(result))
}

/// List the languages the translation service accepts.
#[instrument(skip(state))]
pub async fn supported_languages(
    State(state): State<AppState>,
) -> AppResult<Json<LanguagesResponse>> {
    let languages = state.translation.supported_languages()?;
    Ok(Json(LanguagesResponse { languages }))
}
