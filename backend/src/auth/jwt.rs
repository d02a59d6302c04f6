//! JWT token generation and validation
//!
//! Issues HS256 access/refresh token pairs and validates presented tokens
//! with pre-computed keys. Validation is stateless: signature, then expiry.

use authgate_shared::{AuthError, TokenError, TokenPair};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Identity claims embedded in a signed token.
///
/// Field names on the wire match the payload already in circulation
/// (`Email`, `First_name`, ..., `exp`). Refresh tokens leave every
/// identity field empty; only `exp` is meaningful there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "First_name", default)]
    pub first_name: String,
    #[serde(rename = "Last_name", default)]
    pub last_name: String,
    #[serde(rename = "Uid", default)]
    pub user_id: String,
    #[serde(rename = "User_type", default)]
    pub role: String,
    /// Expiration time (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    pub fn for_identity(identity: &Identity, expires_at: i64) -> Self {
        Self {
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            user_id: identity.user_id.clone(),
            role: identity.role.clone(),
            expires_at,
        }
    }

    /// Claims of a refresh token: nothing but the expiry
    pub fn expiry_only(expires_at: i64) -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            user_id: String::new(),
            role: String::new(),
            expires_at,
        }
    }
}

/// Who a token pair is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token lifetimes, checked to be positive and representable
#[derive(Debug, Clone, Copy)]
pub struct JwtConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// JWT service for token operations
///
/// Design: Uses pre-computed keys to avoid expensive key derivation
/// on every request. Keys are wrapped in Arc for cheap cloning.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    config: JwtConfig,
    validation: Arc<Validation>,
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// An empty secret, or a lifetime that is not positive or would push
    /// expiries past the calendar, is a `SigningFailure`: the process must
    /// not start with it.
    pub fn new(
        secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::SigningFailure("signing secret is empty".to_string()));
        }
        let config = JwtConfig {
            access_ttl: lifetime("access", access_token_expiry_secs)?,
            refresh_ttl: lifetime("refresh", refresh_token_expiry_secs)?,
        };

        // Expiry is checked by hand so that `exp == now` counts as expired
        // and so the two failure kinds stay distinguishable. jsonwebtoken
        // reads a required `exp` as u64, which would turn a negative expiry
        // into Malformed; the `i64` field already makes `exp` mandatory.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            keys: JwtKeys::new(secret),
            config,
            validation: Arc::new(validation),
        })
    }

    /// Sign the given claims as they are, expiry included
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, self.keys.encoding())
            .map_err(|e| AuthError::SigningFailure(e.to_string()))
    }

    /// Issue a fresh access/refresh pair for an identity
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = expiry_after(now, self.config.access_ttl)?;
        let refresh_exp = expiry_after(now, self.config.refresh_ttl)?;

        let access_token = self.issue(&Claims::for_identity(identity, access_exp.timestamp()))?;
        let refresh_token = self.issue(&Claims::expiry_only(refresh_exp.timestamp()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validate a token and return its claims
    ///
    /// Any parse or signature problem is `Malformed`; a verified token whose
    /// expiry is not strictly in the future is `Expired`.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map_err(|_| TokenError::Malformed)?;

        if token_data.claims.expires_at <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}

fn lifetime(kind: &str, secs: i64) -> Result<Duration, AuthError> {
    let ttl = Duration::try_seconds(secs)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| AuthError::SigningFailure(format!("{} token lifetime out of range: {}", kind, secs)))?;

    expiry_after(Utc::now(), ttl)?;
    Ok(ttl)
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::SigningFailure("token expiry overflows the calendar".to_string()))
}
