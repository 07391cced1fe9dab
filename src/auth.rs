use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::Header,
    middleware::Next,
    web, Error, HttpMessage, ResponseError,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::AuthConfig, error::ApiError, models::ROLE_ADMIN, state::AppState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No token provided")]
    Missing,
    #[error("Invalid or expired token")]
    Invalid,
    #[error("Forbidden")]
    Forbidden,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Verified administrative session, stored in request extensions by [`admin_guard`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub role: String,
    pub expires_at: usize,
}

#[derive(Clone)]
pub struct AccessGuard {
    password_hash: Option<String>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl AccessGuard {
    pub fn new(config: &AuthConfig) -> Result<Self, password_hash::Error> {
        let password_hash = match config.admin_password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => {
                log::warn!("ADMIN_PASSWORD not set. Admin login is disabled.");
                None
            }
        };

        Ok(Self {
            password_hash,
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl_secs,
        })
    }

    pub fn issue_credential(&self, supplied: &str) -> Result<String, AuthError> {
        let matches = self
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(supplied, hash));
        if !matches {
            return Err(AuthError::IncorrectPassword);
        }
        self.sign(ROLE_ADMIN)
    }

    pub fn authenticate(&self, bearer_token: Option<&str>) -> Result<AdminSession, AuthError> {
        let token = bearer_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Missing)?;

        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Invalid)?;

        if claims.role != ROLE_ADMIN {
            return Err(AuthError::Forbidden);
        }

        Ok(AdminSession {
            role: claims.role,
            expires_at: claims.exp,
        })
    }

    fn sign(&self, role: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let ttl = usize::try_from(self.ttl_secs).unwrap_or(usize::MAX);
        let claims = Claims {
            role: role.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&JwtHeader::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = PasswordHash::new(password_hash);
    match parsed_hash {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn admin_guard<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    B: actix_web::body::MessageBody + 'static,
{
    let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
        log::error!("Admin guard mounted without application state");
        let response = ApiError::from(AuthError::Invalid).error_response();
        return Ok(req.into_response(response));
    };

    let bearer = Authorization::<Bearer>::parse(&req)
        .ok()
        .map(Authorization::into_scheme);

    match state.guard.authenticate(bearer.as_ref().map(|scheme| scheme.token())) {
        Ok(session) => {
            req.extensions_mut().insert(session);
            let res = next.call(req).await?;
            Ok(res.map_into_boxed_body())
        }
        Err(err) => {
            log::warn!("Rejected admin request to {}: {err}", req.path());
            let response = ApiError::from(err).error_response();
            Ok(req.into_response(response))
        }
    }
}

#[cfg(test)]
pub(crate) fn sign_with_role(secret: &str, role: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        role: role.to_string(),
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
    };
    encode(
        &JwtHeader::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
