//! Fuzz testing for request validators.
//!
//! Validators see raw client input before any service runs, so they must
//! never panic, whatever the bytes.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_validation
//! cargo +nightly fuzz run fuzz_validation -- -max_total_time=60
//! ```
//!
//! # What This Tests
//!
//! - `validate_text`: translation text bounds (counted in chars)
//! - `validate_language_code`: language tag shape
//! - `validate_identifier`: vendor, buyer, product and session ids
//! - `decode_audio`: base64 audio payloads

#![no_main]

use libfuzzer_sys::fuzz_target;
use vendor_ai_services::validation::{
    decode_audio, validate_identifier, validate_language_code, validate_text,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = validate_text(s);
        let _ = validate_language_code(s, "sourceLang");
        let _ = validate_identifier(s, "vendorId");

        if let Ok(bytes) = decode_audio(s) {
            assert!(!bytes.is_empty());
        }
    }
});
