pub mod revocation;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use revocation::{spawn_purge_task, RevocationStore, RevokedToken};

/// JWT claims. `sub` is the company the token is scoped to; `jti` keys the
/// revocation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(company_id: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: company_id.into(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been invalidated")]
    Revoked,

    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Token lifetime of {0} hours exceeds the 87600 hour limit")]
    InvalidLifetime(u64),

    #[error("Invalid or inactive company")]
    InactiveCompany,
}

/// Ten years.
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// A freshly minted token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub company_id: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: String,
    lifetime: Duration,
}

impl TokenAuthority {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if expiry_hours > MAX_EXPIRY_HOURS {
            return Err(AuthError::InvalidLifetime(expiry_hours));
        }
        let lifetime = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or(AuthError::InvalidLifetime(expiry_hours))?;
        Ok(Self { secret, lifetime })
    }

    pub fn issue(&self, company_id: &str) -> Result<IssuedToken, AuthError> {
        self.sign(Claims::new(company_id, self.lifetime))
    }

    pub fn sign(&self, claims: Claims) -> Result<IssuedToken, AuthError> {
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        let token = encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AuthError::Generation(e.to_string()))?;

        Ok(IssuedToken {
            token,
            company_id: claims.sub.clone(),
            token_id: claims.jti,
            expires_at: claims.expires_at(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("lifetime_hours", &self.lifetime.num_hours())
            .finish_non_exhaustive()
    }
}
