//! Session tokens.
//!
//! RS256-signed JWTs. The algorithm is pinned on verification, so tokens
//! signed with any other scheme (HS256 in particular) are rejected.

use std::path::Path;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Token errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No Authorization header.
    #[error("missing authorization header")]
    MissingHeader,

    /// Authorization header without the `Bearer ` prefix.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Token could not be parsed.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature did not verify against the public key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token was signed with an algorithm other than RS256.
    #[error("unexpected token algorithm")]
    InvalidAlgorithm,

    /// Token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Key material could not be read or parsed.
    #[error("key error: {0}")]
    Key(String),
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile ID).
    pub sub: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// Issues and verifies session tokens with an RSA key pair.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::RS256)
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build from PEM-encoded keys.
    ///
    /// `private_pem` is a PKCS#1 or PKCS#8 RSA private key, `public_pem`
    /// the matching public key.
    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        expiry_secs: u64,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| TokenError::Key(format!("private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| TokenError::Key(format!("public key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            expiry_secs,
        })
    }

    /// Read the key pair from disk.
    pub fn from_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
        expiry_secs: u64,
    ) -> Result<Self, TokenError> {
        let private_key_path = private_key_path.as_ref();
        let public_key_path = public_key_path.as_ref();
        let private_pem = std::fs::read(private_key_path).map_err(|e| {
            TokenError::Key(format!("read {}: {e}", private_key_path.display()))
        })?;
        let public_pem = std::fs::read(public_key_path)
            .map_err(|e| TokenError::Key(format!("read {}: {e}", public_key_path.display())))?;
        Self::from_pem(&private_pem, &public_pem, expiry_secs)
    }

    /// Token lifetime in seconds.
    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Issue a fresh token for a profile.
    pub fn issue_token(&self, profile_id: i64) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: profile_id,
            iat: now,
            exp: now + self.expiry_secs as i64,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            TokenError::Signing(e.to_string())
        })
    }

    /// Decode and verify a token, reporting why it was rejected.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    /// Verify a token and return its profile ID.
    ///
    /// The rejection reason is logged, never returned.
    pub fn verify_token(&self, token: &str) -> Option<i64> {
        match self.decode_claims(token) {
            Ok(claims) => Some(claims.sub),
            Err(TokenError::InvalidAlgorithm) => {
                warn!("rejected token signed with an unexpected algorithm");
                None
            }
            Err(e) => {
                debug!(reason = %e, "token verification failed");
                None
            }
        }
    }
}

/// Extract the token from an Authorization header value.
///
/// # Examples
///
/// ```
/// use profile_service::auth::token::{extract_bearer, TokenError};
///
/// assert_eq!(extract_bearer(Some("Bearer abc")), Ok("abc"));
/// assert_eq!(extract_bearer(Some("abc")), Err(TokenError::MalformedHeader));
/// assert_eq!(extract_bearer(None), Err(TokenError::MissingHeader));
/// ```
pub fn extract_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::MissingHeader)?;
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}
