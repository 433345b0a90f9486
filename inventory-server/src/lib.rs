//! Server-rendered inventory dashboard in front of the remote inventory
//! service.

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod pages;
pub mod remote;
pub mod session;
pub mod views;

use axum::{middleware, routing::get, routing::post, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use config::InventoryConfig;
use remote::InventoryApiClient;
use session::CookieOptions;

#[derive(Debug, Clone)]
pub struct AppState {
    pub api: InventoryApiClient,
    pub cookies: CookieOptions,
}

impl AppState {
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self {
            api: InventoryApiClient::new(&config.api.base_url),
            cookies: CookieOptions {
                max_age_secs: config.session.max_age_secs,
                secure: config.session.secure,
            },
        }
    }
}

pub fn create_app_router(state: AppState, config: &InventoryConfig) -> Router {
    Router::new()
        .route("/", get(pages::login::show).post(pages::login::submit))
        .route("/logout", post(pages::login::logout))
        .route("/dashboard", get(pages::dashboard::show))
        .route(
            "/add-resource-allocation",
            get(pages::add_allocation::show).post(pages::add_allocation::submit),
        )
        .route(
            "/update-resource-allocation",
            get(pages::update_allocation::show).post(pages::update_allocation::update),
        )
        .route(
            "/update-resource-allocation/search",
            post(pages::update_allocation::search),
        )
        .route("/delete-resources", get(pages::delete_resources::show))
        .route("/delete-resources/search", post(pages::delete_resources::search))
        .route("/delete-resources/confirm", post(pages::delete_resources::confirm))
        .route(
            "/person-view",
            get(pages::person_view::show).post(pages::person_view::submit),
        )
        .route("/available-resources", get(pages::available_resources::show))
        .nest("/api", api::create_api_router())
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .fallback(pages::not_found)
        .with_state(state)
        .layer(middleware::from_fn(gate::auth_gate_middleware))
        .layer(middleware::from_fn(logging::api_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
