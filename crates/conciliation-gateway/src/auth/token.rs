//! CSRF token generation.

use super::error::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

/// Bytes of entropy per token
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Fresh URL-safe CSRF token from the operating system RNG.
///
/// A failed read is retried once; there is no fallback source.
pub fn generate_csrf_token() -> Result<String, TokenError> {
    let mut bytes = [0u8; CSRF_TOKEN_BYTES];

    if let Err(first) = OsRng.try_fill_bytes(&mut bytes) {
        warn!(error = %first, "OS entropy read failed, retrying once");
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError(e.to_string()))?;
    }

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
