use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::debug;
use serde::Deserialize;

/// The claims this client cares about. The backend owns the signing key, so
/// nothing here is trusted for authorization; it only drives the UI.
#[derive(Debug, Deserialize)]
pub struct PeekedClaims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
}

/// Reads the claims of a JWT without verifying its signature.
/// Returns `None` for opaque (non-JWT) tokens.
pub fn peek_claims(token: &str) -> Option<PeekedClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match jsonwebtoken::decode::<PeekedClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!("Token is not a readable JWT: {}", e);
            None
        }
    }
}

/// Expiry of the token, when it is a JWT carrying `exp`.
pub fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
    peek_claims(token)?
        .exp
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
}
