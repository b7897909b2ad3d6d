use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    auth::{
        extractor::bearer_token,
        jwt::{generate_access_token, generate_refresh_token, rotate_tokens, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    db::users::USER_COLUMNS,
    model::user::User,
    models::{Claims, LoginReqDto, RegisterReq, TokenType},
    utils::{email_cache, email_filter},
    workflow::Actor,
};

/// Inserts a new user and records the address in the filter and cache.
async fn insert_user(req: &RegisterReq, email: &str, pool: &MySqlPool) -> Result<(), HttpResponse> {
    let hashed = hash_password(&req.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (college_email, password, name, role_id, department, year, section,
             roll_no, degree, assigned_year, assigned_section)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(email)
    .bind(hashed)
    .bind(req.name.trim())
    .bind(req.role.id())
    .bind(req.department.trim())
    .bind(req.year)
    .bind(req.section.as_deref().map(str::trim))
    .bind(req.roll_no.as_deref())
    .bind(req.degree.as_deref())
    .bind(req.assigned_year)
    .bind(req.assigned_section.as_deref().map(str::trim))
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            email_filter::insert(email);
            email_cache::mark_taken(email).await;
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
            Err(HttpResponse::Conflict().json(json!({"error": "Email already registered"})))
        }
        Err(e) => {
            error!(error = %e, "Failed to insert user");
            Err(HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"})))
        }
    }
}

/// true  => address AVAILABLE
/// false => address TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    // Cuckoo filter: a miss is definitive.
    if !email_filter::might_exist(email) {
        return true;
    }

    // Moka cache: a hit is definitive.
    if email_cache::is_taken(email).await {
        return false;
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE college_email = ? LIMIT 1)",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    if exists {
        email_cache::mark_taken(email).await;
    }
    !exists
}

/// Register a student, faculty member or HOD
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "User registered successfully"
        })),
        (status = 400, description = "Missing role-specific fields"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip_all, fields(role = %payload.role))]
pub async fn register(payload: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    if let Err(message) = payload.validate() {
        info!(message, "Registration rejected");
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    let email = payload.college_email.trim().to_lowercase();

    if !is_email_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({"error": "Email already registered"}));
    }

    match insert_user(&payload, &email, pool.get_ref()).await {
        Ok(()) => {
            info!("User registered");
            HttpResponse::Created().json(json!({"message": "User registered successfully"}))
        }
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: Actor,
}

async fn store_refresh_token(pool: &MySqlPool, claims: &Claims) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(claims.user_id)
    .bind(&claims.jti)
    .bind(claims.exp as i64)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Exchange credentials for an access and refresh token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Tokens issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, payload),
    fields(email = %payload.college_email)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    let email = payload.college_email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return HttpResponse::BadRequest().body("Email or password required");
    }

    let sql = format!("{USER_COLUMNS} WHERE college_email = ?");
    let user = match sqlx::query_as::<_, User>(&sql)
        .bind(&email)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(user)) if user.is_active => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(_) => {
            info!("Invalid credentials: unknown or inactive user");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&payload.password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let Some(actor) = user.actor() else {
        warn!(user_id = user.id, role_id = user.role_id, "User has an unknown role");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    };

    let tokens = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)
        .and_then(|access| {
            generate_refresh_token(&user, &config.jwt_secret, config.refresh_token_ttl)
                .map(|(refresh, claims)| (access, refresh, claims))
        });
    let (access_token, refresh_token, refresh_claims) = match tokens {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign tokens");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(jti = %refresh_claims.jti, "Storing refresh token");
    if let Err(e) = store_refresh_token(pool.get_ref(), &refresh_claims).await {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(user.id)
        .execute(pool.get_ref())
        .await
    {
        // not fatal for the login itself
        error!(error = %e, "Failed to update last_login_at");
    }

    email_cache::mark_taken(&email).await;
    info!(user_id = user.id, "Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        user: actor,
    })
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = Object, example = json!({
            "access_token": "eyJ...",
            "refresh_token": "eyJ..."
        })),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().body("No token");
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // Revoke-on-use; zero rows means unknown, expired or already rotated.
    let revoked = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE jti = ?
        AND revoked = FALSE
        AND expires_at > NOW()
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    match revoked {
        Ok(result) if result.rows_affected() == 1 => {}
        Ok(_) => {
            warn!(user_id = claims.user_id, jti = %claims.jti, "Refresh token reuse or unknown jti");
            return HttpResponse::Unauthorized().finish();
        }
        Err(e) => {
            error!(error = %e, "Failed to revoke refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let (access_token, new_refresh_token, new_claims) = match rotate_tokens(
        &claims,
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign tokens");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = store_refresh_token(pool.get_ref(), &new_claims).await {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

/// Revoke a refresh token. Always answers 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::NoContent().finish();
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    // idempotent
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token on logout");
    }

    HttpResponse::NoContent().finish()
}

/// The identity resolved from the caller's access token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Resolved actor", body = Actor),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(actor: Actor) -> impl Responder {
    HttpResponse::Ok().json(actor)
}
