//! Trusted-origin check for mutating requests.

use super::error::CsrfError;
use tracing::debug;

/// Validate the declared origin of a request.
///
/// `Origin` wins when present and must match exactly. Otherwise `Referer`
/// must start with `trusted/`. With neither header the request passes: some
/// proxies and non-browser clients strip both, and the double-submit token
/// is then the only CSRF defence. This is a known, accepted weakness.
pub fn validate_origin(
    origin: Option<&str>,
    referer: Option<&str>,
    trusted: &str,
) -> Result<(), CsrfError> {
    let origin = origin.map(str::trim).filter(|v| !v.is_empty());
    let referer = referer.map(str::trim).filter(|v| !v.is_empty());

    match (origin, referer) {
        (Some(origin), _) => {
            if origin == trusted {
                Ok(())
            } else {
                debug!(origin, trusted, "Origin mismatch");
                Err(CsrfError::InvalidOrigin)
            }
        }
        (None, Some(referer)) => {
            // The trailing slash stops `https://app.example.evil` style prefixes.
            let matches = referer
                .strip_prefix(trusted)
                .is_some_and(|rest| rest.starts_with('/'));
            if matches {
                Ok(())
            } else {
                debug!(referer, trusted, "Referer mismatch");
                Err(CsrfError::InvalidOrigin)
            }
        }
        (None, None) => {
            debug!("No Origin or Referer, deferring to token check");
            Ok(())
        }
    }
}
