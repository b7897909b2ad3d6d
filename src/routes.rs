use crate::{
    api::leave,
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    db::{MySqlApplicationStore, MySqlUserDirectory},
    workflow::{ApplicationStore, UserDirectory},
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Per-route limiter; `None` when the configured rate cannot be expressed.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = 60_000 / u64::from(requests_per_min.max(1));
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

fn limiter(requests_per_min: u32, name: &str) -> Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let governor = build_limiter(requests_per_min).unwrap_or_else(|| {
        tracing::warn!(name, requests_per_min, "Invalid rate limit, using governor defaults");
        Governor::new(&GovernorConfig::default())
    });
    Arc::new(governor)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = limiter(config.rate_login_per_min, "login");
    let register_limiter = limiter(config.rate_register_per_min, "register");
    let refresh_limiter = limiter(config.rate_refresh_per_min, "refresh");
    let protected_limiter = limiter(config.rate_protected_per_min, "protected");

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .configure(leave_routes::<MySqlApplicationStore, MySqlUserDirectory>),
    );
}

/// Leave endpoints over any store; mounted under the protected prefix.
pub fn leave_routes<S, D>(cfg: &mut web::ServiceConfig)
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    cfg.service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave::leave_list::<S, D>))
                    .route(web::post().to(leave::create_leave::<S, D>)),
            )
            // /leave/summary, registered before /{id}
            .service(web::resource("/summary").route(web::get().to(leave::leave_summary::<S, D>)))
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(leave::get_leave::<S, D>)))
            // /leave/{id}/approve
            .service(
                web::resource("/{id}/approve").route(web::put().to(leave::approve_leave::<S, D>)),
            )
            // /leave/{id}/reject
            .service(
                web::resource("/{id}/reject").route(web::put().to(leave::reject_leave::<S, D>)),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + rotated refresh_token
