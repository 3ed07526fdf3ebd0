use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by every stride token. Canonical definition lives here so
/// the auth, media, and upload services cannot drift apart on the format.
///
/// Tokens deliberately carry no expiry claim: a token stays valid until the
/// signing secret rotates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
}

/// HS256 signer/verifier around a shared secret. Services construct one at
/// startup with the configured secret and keep it in their state; request
/// paths never touch the environment.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens have no exp claim; a default Validation would reject them.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a signed token for the given account id.
    pub fn issue(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims { sub: user_id };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verifies the signature and returns the claims. Any failure mode
    /// (malformed token, wrong signature, wrong algorithm) is an error;
    /// callers treat them all as an authentication failure.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}
