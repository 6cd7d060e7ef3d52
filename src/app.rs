use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Role;
use crate::handlers;
use crate::middleware::require_role;
use crate::state::AppState;

/// Full HTTP surface: public routes plus one gated group per role.
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let body_limit = api.max_request_size_bytes;
    let request_logging = api.enable_request_logging;
    let cors = cors_layer(&state.config.security.cors_origins);

    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_public_routes())
        // Gated, one role each
        .nest("/api/user", user_routes(&state))
        .nest("/api/provider", provider_routes(&state))
        .nest("/api/manager", manager_routes(&state))
        .nest("/api/admin", admin_routes(&state))
        .nest("/api/superuser", superuser_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/auth/user/register", post(public::user_register))
        .route("/auth/user/login", post(public::user_login))
        .route("/auth/provider/login", post(public::provider_login))
        .route("/auth/manager/login", post(public::manager_login))
        .route("/auth/admin/login", post(public::admin_login))
        .route("/auth/superuser/login", post(public::superuser_login))
        .route("/verification/send", post(public::verification_send))
        .route("/verification/verify", post(public::verification_verify))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/profile", get(user::profile_get).patch(user::profile_patch))
        .route("/verification", get(user::verification_status))
        .route("/companies", get(user::companies_list))
        .route("/companies/:id/providers", get(user::company_providers))
        .route("/providers/:id/services", get(user::provider_services))
        .route("/slots", get(user::slots_list))
        .route("/slots/:id/book", post(user::slot_book))
        .route("/appointments", get(user::appointments_list))
        .route_layer(middleware::from_fn_with_state(state.gate(Role::User), require_role))
}

fn provider_routes(state: &AppState) -> Router<AppState> {
    use handlers::provider;

    Router::new()
        .route("/me", get(provider::me))
        .route("/appointments", get(provider::appointments_list))
        .route("/slots", get(provider::slots_list))
        .route("/availability", post(provider::availability_post))
        .route("/services", get(provider::services_list).post(provider::services_post))
        .route("/services/:index", delete(provider::services_delete))
        .route_layer(middleware::from_fn_with_state(state.gate(Role::Provider), require_role))
}

fn manager_routes(state: &AppState) -> Router<AppState> {
    use handlers::manager;

    Router::new()
        .route("/me", get(manager::me))
        .route("/providers", get(manager::providers_list).post(manager::providers_post))
        .route("/providers/:id/availability", post(manager::provider_availability_post))
        .route("/appointments", get(manager::appointments_list))
        .route_layer(middleware::from_fn_with_state(state.gate(Role::Manager), require_role))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route("/me", get(admin::me).patch(admin::me_patch))
        .route("/companies", get(admin::companies_list).post(admin::companies_post))
        .route(
            "/companies/:id",
            get(admin::company_get)
                .patch(admin::company_patch)
                .delete(admin::company_delete),
        )
        .route("/companies/by-name/:name", get(admin::company_get_by_name))
        .route("/managers", get(admin::managers_list).post(admin::managers_post))
        .route("/users", get(admin::users_list))
        .route("/appointments", get(admin::appointments_list))
        .route_layer(middleware::from_fn_with_state(state.gate(Role::Admin), require_role))
}

fn superuser_routes(state: &AppState) -> Router<AppState> {
    use handlers::superuser;

    Router::new()
        .route("/admins", get(superuser::admins_list).post(superuser::admins_post))
        .route(
            "/admins/by-email/:email",
            get(superuser::admin_get_by_email).patch(superuser::admin_patch_by_email),
        )
        .route("/users", get(superuser::users_list))
        .route("/users/:id", axum::routing::patch(superuser::user_patch))
        .route_layer(middleware::from_fn_with_state(state.gate(Role::Superuser), require_role))
}
