//! Signed token encode/decode.
//!
//! The codec owns the process-wide signing key. It is constructed once at
//! startup from configuration and injected into [`crate::TokenService`];
//! there is no global mutable key state, which keeps the codec testable with
//! throwaway keys. Rotating the configured secret invalidates every
//! previously issued token, which is the documented lifecycle.

use anyhow::{anyhow, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::claims::Claims;
use crate::error::TokenError;

/// Algorithm is pinned; tokens claiming anything else fail signature
/// verification outright (no algorithm confusion).
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// 256-bit floor for the HMAC secret.
const MIN_SECRET_LENGTH: usize = 32;

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the configured signing secret.
    ///
    /// Fails fast on weak secrets so a misconfigured deployment cannot issue
    /// forgeable tokens.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(anyhow!(
                "JWT secret too short: need at least {MIN_SECRET_LENGTH} bytes"
            ));
        }

        let mut validation = Validation::new(JWT_ALGORITHM);
        // Expiry is enforced by TokenService with a hard `now >= exp`
        // boundary; jsonwebtoken's leeway-based check is disabled here.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(JWT_ALGORITHM),
            validation,
        })
    }

    /// Encode claims into a compact signed token string.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Decode a token string, verifying the signature before any claim is
    /// inspected. Does not check expiry or revocation; that layering belongs
    /// to [`crate::TokenService`].
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Role, TokenType};
    use chrono::Utc;
    use uuid::Uuid;

    const TEST_SECRET: &str = "unit-test-signing-secret-0123456789abcdef";

    fn sample_claims() -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + 900,
        }
    }

    #[test]
    fn rejects_short_secret() {
        assert!(TokenCodec::new("short").is_err());
        assert!(TokenCodec::new(TEST_SECRET).is_ok());
    }

    #[test]
    fn encode_decode_round_trip() {
        let codec = TokenCodec::new(TEST_SECRET).unwrap();
        let claims = sample_claims();
        let token = codec.encode(&claims).unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.role, Role::User);
        assert_eq!(decoded.token_type, TokenType::Access);
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let codec = TokenCodec::new(TEST_SECRET).unwrap();
        assert!(matches!(
            codec.decode("not.a.token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(codec.decode(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn rejects_token_signed_with_different_key() {
        let codec = TokenCodec::new(TEST_SECRET).unwrap();
        let other = TokenCodec::new("another-signing-secret-0123456789abcdef").unwrap();
        let token = other.encode(&sample_claims()).unwrap();
        assert!(matches!(
            codec.decode(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_signature_tamper() {
        let codec = TokenCodec::new(TEST_SECRET).unwrap();
        let token = codec.encode(&sample_claims()).unwrap();

        // Flip the last byte of the signature segment.
        let mut bytes = token.into_bytes();
        let last = bytes.last_mut().unwrap();
        *last = if *last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            codec.decode(&tampered),
            Err(TokenError::InvalidSignature) | Err(TokenError::Malformed)
        ));
    }
}
