use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, info, instrument};

use super::{AiService, Readiness};
use crate::cache::{TranslationCache, TranslationKey, translation_cache};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{
    JsonObject, Language, SUPPORTED_LANGUAGES, TranslationResult, TranslationValidation,
    VoiceTranslationResult,
};

pub const TRANSLATION_FAILED: &str = "Translation failed";
pub const VOICE_TRANSLATION_FAILED: &str = "Voice translation failed";
pub const LANGUAGES_FAILED: &str = "Failed to get languages";

/// Minimum confidence for a translation to be accepted without review.
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;

const STUB_CONFIDENCE: f64 = 0.95;
const STUB_TRANSCRIPT: &str = "Mock transcribed text";
const STUB_AUDIO: &[u8] = b"Mock audio data";

/// Text and voice translation with a shared result cache.
///
/// # Counter Memory Ordering
///
/// `translations_performed` counts cache misses that actually ran the
/// translation. It is a plain statistic, so `Relaxed` is enough.
#[derive(Clone)]
pub struct TranslationService {
    cache: TranslationCache,
    /// Translations computed (cache misses), monotonic
    translations_performed: Arc<AtomicU64>,
    readiness: Readiness,
}

impl TranslationService {
    pub fn new(cache_size: u64, cache_ttl: Duration) -> Self {
        Self {
            cache: translation_cache(cache_size, cache_ttl),
            translations_performed: Arc::new(AtomicU64::new(0)),
            readiness: Readiness::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.translation_cache_size, config.translation_cache_ttl)
    }

    /// Translate `text`, serving repeated requests from the cache.
    ///
    /// Concurrent misses on the same key share one computation. A hit returns
    /// the same `Arc` that was stored on the miss.
    #[instrument(
        skip(self, text, cultural_context),
        fields(text_len = text.len(), has_context = cultural_context.is_some())
    )]
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        cultural_context: Option<&JsonObject>,
    ) -> AppResult<Arc<TranslationResult>> {
        self.readiness.ensure(Self::NAME, TRANSLATION_FAILED)?;

        let key = TranslationKey::new(text, source_lang, target_lang);
        let entry = self
            .cache
            .entry(key)
            .or_try_insert_with(self.run_translation(text))
            .await
            .map_err(|e| AppError::service(TRANSLATION_FAILED, e))?;

        let hit = !entry.is_fresh();
        metrics::record_cache_lookup(Self::NAME, hit);

        let result = entry.into_value();
        if hit {
            debug!("Translation cache hit");
        } else {
            info!(confidence = result.confidence, "Text translated successfully");
        }

        Ok(result)
    }

    /// Transcribe, translate and re-synthesize a voice clip.
    #[instrument(skip(self, audio), fields(audio_len = audio.len()))]
    pub async fn translate_voice(
        &self,
        audio: &[u8],
        source_lang: &str,
        target_lang: &str,
    ) -> AppResult<VoiceTranslationResult> {
        self.readiness.ensure(Self::NAME, VOICE_TRANSLATION_FAILED)?;

        // Speech models are not loaded; a fixed transcript and clip stand in
        let transcript = STUB_TRANSCRIPT;

        let translation = self
            .translate_text(transcript, source_lang, target_lang, None)
            .await
            .map_err(|e| match e {
                AppError::ServiceFailure { cause, .. } => {
                    AppError::service(VOICE_TRANSLATION_FAILED, cause)
                }
                other => other,
            })?;

        Ok(VoiceTranslationResult {
            original_text: transcript.to_string(),
            translated_text: translation.translated_text.clone(),
            audio_output: BASE64.encode(STUB_AUDIO),
            confidence: translation.confidence,
        })
    }

    pub fn supported_languages(&self) -> AppResult<&'static [Language]> {
        self.readiness.ensure(Self::NAME, LANGUAGES_FAILED)?;
        Ok(&SUPPORTED_LANGUAGES)
    }

    /// Judge whether a translation can be used without human review.
    pub fn validate_translation(&self, result: &TranslationResult) -> TranslationValidation {
        let is_valid = result.confidence >= CONFIDENCE_THRESHOLD;

        TranslationValidation {
            is_valid,
            confidence: result.confidence,
            requires_human_review: !is_valid,
            suggestions: if is_valid {
                Vec::new()
            } else {
                vec!["Consider manual review due to low confidence score".to_string()]
            },
        }
    }

    pub fn translations_performed(&self) -> u64 {
        self.translations_performed.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    async fn run_translation(&self, text: &str) -> Result<Arc<TranslationResult>, AppError> {
        self.translations_performed.fetch_add(1, Ordering::Relaxed);

        // Cultural adaptation rules are not modelled, so context adds nothing
        let mut result = TranslationResult {
            translated_text: format!("[TRANSLATED] {text}"),
            confidence: STUB_CONFIDENCE,
            cultural_adaptations: Vec::new(),
            alternative_translations: Vec::new(),
            requires_verification: false,
        };
        result.requires_verification = !self.validate_translation(&result).is_valid;

        Ok(Arc::new(result))
    }
}

impl AiService for TranslationService {
    const NAME: &'static str = "translation";

    async fn initialize(&self) -> AppResult<()> {
        info!("Initializing translation service...");
        self.readiness.mark_ready();
        info!("Translation service initialized");
        Ok(())
    }

    async fn cleanup(&self) -> AppResult<()> {
        info!("Cleaning up translation service...");
        self.readiness.mark_stopped();
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
