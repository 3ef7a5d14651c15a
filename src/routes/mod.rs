pub mod entries;
pub mod home;
pub mod projects;
pub mod public_api;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::middleware::auth::auth_middleware;
use crate::services::storage::UPLOADS_ROUTE;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        // General endpoints
        home::root,
        // Project endpoints
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        // Entry endpoints
        entries::create_entry,
        entries::list_entries,
        entries::list_project_entries,
        entries::update_entry,
        entries::delete_entry,
        // Public API endpoints
        public_api::get_entries,
        public_api::get_single_entry,
        public_api::add_entry,
        public_api::update_entry_by_key,
        public_api::delete_entry_by_key,
    ),
    components(
        schemas(
            home::RootResponse,
            projects::CreateProjectRequest,
            projects::UpdateProjectRequest,
            projects::ProjectResponse,
            entries::UpdateEntryRequest,
            entries::EntryResponse,
            public_api::AddEntryRequest,
            crate::response::MessageResponse,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Project", description = "Projects owned by the authenticated user"),
        (name = "Entry", description = "Uploaded entries owned by the authenticated user"),
        (name = "Public API", description = "Entry access keyed by a project's API key")
    ),
    info(
        title = "EntryKit API",
        version = "0.1.0",
        description = "Projects, uploaded entries and API-key access. Successful responses are wrapped as {message, data}.",
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    // Bearer-token routes, scoped to the caller's id
    let session_routes = Router::new()
        .route(
            "/project",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/project/{slug}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/entry",
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(
            "/entry/project/{project_id}",
            get(entries::list_project_entries),
        )
        .route(
            "/entry/{id}",
            put(entries::update_entry).delete(entries::delete_entry),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // API-key routes, no session
    let public_routes = Router::new()
        .route(
            "/public-api/{api_key}/entries",
            get(public_api::get_entries).post(public_api::add_entry),
        )
        .route(
            "/public-api/{api_key}/entry",
            get(public_api::get_single_entry),
        )
        .route(
            "/public-api/{api_key}/entries/{entry_id}",
            put(public_api::update_entry_by_key).delete(public_api::delete_entry_by_key),
        );

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let app_routes = Router::new()
        .route("/", get(home::root))
        .merge(session_routes)
        .merge(public_routes)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.uploads.root()))
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(layers)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
