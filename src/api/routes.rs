use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::error::ErrorResponse;
use crate::auth::{auth_middleware, lang_from_path, AuthService};
use crate::config::FrontendConfig;
use crate::i18n::{MessageKey, Translations};

use super::handlers::{
    add_to_blacklist, download_visits, get_blacklist, get_report, get_stats, health_check,
    list_visits, log_visit, visit_details, AppState,
};
use super::static_files::serve_static;

pub fn create_api_router(
    state: Arc<AppState>,
    auth_service: Arc<AuthService>,
    frontend_config: FrontendConfig,
) -> Router {
    let translations = Arc::clone(&state.translations);
    let panic_translations = Arc::clone(&state.translations);

    let protected_routes = Router::new()
        .route("/api/{lang}/visit", get(log_visit))
        .route("/api/{lang}/visits", get(list_visits))
        .route("/api/{lang}/visits/{ip}", get(visit_details))
        .route("/api/{lang}/stats", get(get_stats))
        .route(
            "/api/{lang}/blacklist",
            get(get_blacklist).post(add_to_blacklist),
        )
        .route("/api/{lang}/report", get(get_report))
        .route("/api/{lang}/download_visits", get(download_visits))
        .route_layer(middleware::from_fn(
            move |headers: HeaderMap, req: Request, next: Next| {
                let auth = Arc::clone(&auth_service);
                let translations = Arc::clone(&translations);
                auth_middleware(auth, translations, headers, req, next)
            },
        ))
        .with_state(state);

    let static_dir = frontend_config.static_dir;

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/",
            get(move |uri: Uri| {
                let static_dir = static_dir.clone();
                async move { serve_static(uri, static_dir).await }
            }),
        )
        .merge(protected_routes)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let translations = Arc::clone(&panic_translations);
            localize_panics(translations, req, next)
        }))
        .layer(TraceLayer::new_for_http())
}

/// Marks a response produced by [`CatchPanicLayer`]
#[derive(Debug, Clone, Copy)]
struct HandlerPanicked;

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = %detail, "handler panicked");

    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(HandlerPanicked);
    response
}

/// Replace the bare panic response with the localized internal error body
async fn localize_panics(translations: Arc<Translations>, request: Request, next: Next) -> Response {
    let lang = lang_from_path(request.uri().path()).to_string();
    let response = next.run(request).await;

    if response.extensions().get::<HandlerPanicked>().is_none() {
        return response;
    }

    let catalog = translations.catalog(&lang);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            message: catalog.get(MessageKey::InternalError).to_string(),
        }),
    )
        .into_response()
}
