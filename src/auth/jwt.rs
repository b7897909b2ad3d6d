use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::model::user::User;
use crate::models::{Claims, TokenType};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn sign(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(user: &User, secret: &str, ttl: usize) -> Result<String, Error> {
    let claims = Claims::for_user(
        user,
        TokenType::Access,
        now() + ttl,
        Uuid::new_v4().to_string(),
    );
    sign(&claims, secret)
}

pub fn generate_refresh_token(
    user: &User,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims::for_user(
        user,
        TokenType::Refresh,
        now() + ttl,
        Uuid::new_v4().to_string(),
    );
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

/// Issues a new access/refresh pair carrying the identity of `previous`.
pub fn rotate_tokens(
    previous: &Claims,
    secret: &str,
    access_ttl: usize,
    refresh_ttl: usize,
) -> Result<(String, String, Claims), Error> {
    let access = previous.reissue(
        TokenType::Access,
        now() + access_ttl,
        Uuid::new_v4().to_string(),
    );
    let refresh = previous.reissue(
        TokenType::Refresh,
        now() + refresh_ttl,
        Uuid::new_v4().to_string(),
    );
    Ok((sign(&access, secret)?, sign(&refresh, secret)?, refresh))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
