//! Registry authorization parsing.
//!
//! The scan request carries the registry credential verbatim in its body;
//! only "no authorization" and HTTP Basic are supported. The decoded
//! credential travels to the engine as part of the scan task and is never
//! stored.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

use scanrelay_scanner::RegistryAuth;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed authorization data")]
    Malformed,

    #[error("unsupported authorization type: {0}")]
    Unsupported(String),
}

/// Parse a scan request's registry authorization value.
pub fn parse(authorization: Option<&str>) -> Result<RegistryAuth, AuthError> {
    let Some(raw) = authorization else {
        return Ok(RegistryAuth::Anonymous);
    };
    if raw.is_empty() {
        return Ok(RegistryAuth::Anonymous);
    }

    let mut segments = raw.splitn(2, ' ');
    let scheme = segments.next().unwrap_or_default();
    let payload = segments.next().ok_or(AuthError::Malformed)?;

    match scheme {
        "Basic" => decode_basic(payload),
        other => Err(AuthError::Unsupported(other.to_string())),
    }
}

fn decode_basic(payload: &str) -> Result<RegistryAuth, AuthError> {
    let decoded = BASE64.decode(payload).map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;

    Ok(RegistryAuth::Basic {
        username: username.to_string(),
        password: password.to_string(),
    })
}
