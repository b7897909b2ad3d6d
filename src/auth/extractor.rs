use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    dev::Payload,
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web::Data,
};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::models::TokenType;
use crate::workflow::Actor;

/// Resolves the calling actor from a bearer access token.
pub fn resolve_actor(token: &str, secret: &str) -> Result<Actor, &'static str> {
    let claims = verify_token(token, secret).map_err(|_| "Invalid or expired token")?;
    if claims.token_type != TokenType::Access {
        return Err("Access token required");
    }
    claims.actor().ok_or("Invalid role")
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already resolved by the auth middleware on protected scopes.
        if let Some(actor) = req.extensions().get::<Actor>() {
            return ready(Ok(actor.clone()));
        }

        let Some(token) = bearer_token(req) else {
            return ready(Err(ErrorUnauthorized("Missing token")));
        };

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(ErrorInternalServerError("Config missing")));
        };

        ready(resolve_actor(token, &config.jwt_secret).map_err(ErrorUnauthorized))
    }
}
