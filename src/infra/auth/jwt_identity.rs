use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use crate::domain::{
    models::identity::{Claims, Identity},
    ports::IdentityResolver,
};
use crate::error::AppError;

const AUDIENCE: &str = "checkin-frontend";

/// HS256 session tokens. The same secret signs and verifies.
pub struct JwtIdentityResolver {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn issue(&self, subject: &str, role: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            aud: AUDIENCE.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            role: role.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })
    }

    fn resolve(&self, session: &str) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[self.issuer.as_str()]);

        // Expired or tampered sessions simply resolve to nobody.
        let data = decode::<Claims>(session, &self.decoding_key, &validation).ok()?;
        Some(Identity { subject: data.claims.sub, role: data.claims.role })
    }
}
