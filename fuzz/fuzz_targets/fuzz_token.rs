//! Fuzz testing for bearer token verification.
//!
//! Arbitrary strings go straight into the verifier; it must reject them
//! without panicking.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_token
//! ```

#![no_main]

use jsonwebtoken::Algorithm;
use libfuzzer_sys::fuzz_target;
use vendor_ai_services::TokenVerifier;

fuzz_target!(|data: &[u8]| {
    // First 8 bytes pick the clock, the rest is the token
    if data.len() < 8 {
        return;
    }
    let (clock, token) = data.split_at(8);
    let mut now = [0u8; 8];
    now.copy_from_slice(clock);

    if let Ok(token) = std::str::from_utf8(token) {
        let verifier = TokenVerifier::new("fuzz-secret", Algorithm::HS256);
        let _ = verifier.verify_at(token, u64::from_le_bytes(now));
    }
});
