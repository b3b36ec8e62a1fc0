use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::require_bearer;
use crate::state::AppState;

/// Build the full router: public routes, bearer-protected `/api` routes and
/// the global layers.
pub fn app(state: Arc<AppState>, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(config.server.max_request_size_bytes))
                .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes)),
        );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/templates/:department", get(public::csv_template))
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/companies/:company_id",
            get(protected::companies::get).put(protected::companies::put),
        )
        .merge(kpi_routes())
        .merge(dashboard_routes())
        .merge(insight_routes())
        .route("/api/auth/logout", post(protected::auth::logout))
        .route_layer(from_fn_with_state(state, require_bearer))
}

fn kpi_routes() -> Router<Arc<AppState>> {
    use protected::kpi::{charts, document, layout, select, series};

    Router::new()
        .route(
            "/api/kpis/:department/:company_id",
            get(document::get).delete(document::delete),
        )
        .route(
            "/api/kpis/:department/:company_id/series",
            put(series::replace).post(series::append),
        )
        .route(
            "/api/kpis/:department/:company_id/layout",
            get(layout::get).put(layout::put).delete(layout::delete),
        )
        .route("/api/kpis/:department/:company_id/select", put(select::select))
        .route(
            "/api/kpis/:department/:company_id/select/:kpi_id",
            axum::routing::delete(select::deselect),
        )
        .route(
            "/api/kpis/:department/:company_id/chart-configurations",
            get(charts::list).put(charts::replace).delete(charts::reset),
        )
        .route(
            "/api/kpis/:department/:company_id/chart-configurations/:kpi_id",
            put(charts::upsert),
        )
}

fn dashboard_routes() -> Router<Arc<AppState>> {
    use protected::dashboard;

    Router::new()
        .route("/api/dashboard/:company_id", get(dashboard::get))
        .route(
            "/api/dashboard/:company_id/layouts",
            post(dashboard::init_layouts)
                .put(dashboard::save_layouts)
                .delete(dashboard::reset_layouts),
        )
}

fn insight_routes() -> Router<Arc<AppState>> {
    use protected::insights;

    Router::new()
        .route(
            "/api/insights/:company_id",
            get(insights::get).post(insights::upsert).delete(insights::delete),
        )
        .route("/api/insights/:company_id/generate", post(insights::generate))
}

/// `*` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.trim().parse::<HeaderValue>().ok()))
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
