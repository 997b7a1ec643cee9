use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length of text submitted for translation, in characters.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Language codes are short tags such as `en`, `hi` or `pt-BR`.
pub const MIN_LANGUAGE_CODE_LENGTH: usize = 2;
pub const MAX_LANGUAGE_CODE_LENGTH: usize = 10;

/// Maximum length for identifiers (vendor, buyer, product, session, action).
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Validate text submitted for translation.
///
/// Rules:
/// - Must not be empty or whitespace only
/// - Must not exceed 5000 characters (counted as chars, not bytes)
pub fn validate_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }

    let len = text.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Text cannot exceed {MAX_TEXT_LENGTH} characters (got {len})"
        )));
    }

    Ok(())
}

/// Validate a language code.
///
/// Rules:
/// - Between 2 and 10 characters
/// - ASCII letters and hyphens only
pub fn validate_language_code(code: &str, field: &str) -> AppResult<()> {
    if !(MIN_LANGUAGE_CODE_LENGTH..=MAX_LANGUAGE_CODE_LENGTH).contains(&code.len()) {
        return Err(AppError::BadRequest(format!(
            "{field} must be between {MIN_LANGUAGE_CODE_LENGTH} and {MAX_LANGUAGE_CODE_LENGTH} characters"
        )));
    }

    if let Some(c) = code.chars().find(|c| !c.is_ascii_alphabetic() && *c != '-') {
        return Err(AppError::BadRequest(format!(
            "{field} contains invalid character '{c}'. Only letters and hyphens are allowed"
        )));
    }

    Ok(())
}

/// Validate an identifier such as `vendorId` or `sessionId`.
///
/// Rules:
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must not contain control characters
pub fn validate_identifier(value: &str, field: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }

    if value.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(AppError::BadRequest(format!(
            "{field} cannot exceed {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }

    if let Some(pos) = value.chars().position(char::is_control) {
        return Err(AppError::BadRequest(format!(
            "{field} contains invalid control character at position {pos}"
        )));
    }

    Ok(())
}

/// Decode base64 audio from a voice translation request.
pub fn decode_audio(audio_data: &str) -> AppResult<Vec<u8>> {
    let bytes = STANDARD
        .decode(audio_data.trim())
        .map_err(|_| AppError::BadRequest("audioData must be valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("audioData cannot be empty".to_string()));
    }

    Ok(bytes)
}
