use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token payload as issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // user ID
    #[serde(default)]
    pub exp: Option<u64>,     // expires at (unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,     // issued at (unix timestamp)
    #[serde(default)]
    pub iss: Option<String>,  // issuer
    #[serde(default, rename = "type")]
    pub kind: Option<String>, // "refresh" on refresh tokens, absent on access tokens
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn is_expired_at(&self, unix_now: u64) -> bool {
        self.exp.is_some_and(|exp| exp <= unix_now)
    }
}

/// Reads the payload without checking the signature. The gateway holds the
/// key; the client only needs to know who the token is for.
pub fn decode_unverified(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).map(|data| data.claims)
}
