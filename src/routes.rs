use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, map_response},
    response::Response,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tower::{
    util::{MapResponse, MapResponseLayer},
    Layer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::{
    bearer_method_not_allowed, hide_allow_on_unauthorized, method_not_allowed_body, not_found,
    require_bearer,
};
use crate::state::AppState;

/// The assembled service handed to `axum::serve`.
pub type App = NormalizePath<MapResponse<Router, fn(Response) -> Response>>;

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a valid access token; see [`require_bearer`].
    Bearer,
}

/// Every method a catch-all route should answer.
pub fn any_method() -> MethodFilter {
    MethodFilter::DELETE
        .or(MethodFilter::GET)
        .or(MethodFilter::HEAD)
        .or(MethodFilter::OPTIONS)
        .or(MethodFilter::PATCH)
        .or(MethodFilter::POST)
        .or(MethodFilter::PUT)
        .or(MethodFilter::TRACE)
}

struct RouteEntry {
    path: String,
    methods: MethodRouter<AppState>,
    /// At least one method on this path requires a bearer token.
    guarded: bool,
}

/// Explicit route table. Each registration carries its own access flag, so
/// one path may mix public and protected methods.
pub struct ApiRouter {
    state: AppState,
    routes: Vec<RouteEntry>,
}

impl ApiRouter {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            routes: Vec::new(),
        }
    }

    pub fn register<H, T>(
        mut self,
        method: MethodFilter,
        path: &str,
        handler: H,
        access: Access,
    ) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let route = on(method, handler);
        let route = match access {
            Access::Public => route,
            Access::Bearer => {
                route.route_layer(from_fn_with_state(self.state.clone(), require_bearer))
            }
        };
        let bearer = access == Access::Bearer;

        tracing::debug!(path, ?access, "registered route");
        let entry = match self.routes.iter().position(|entry| entry.path == path) {
            Some(index) => {
                let existing = self.routes.remove(index);
                RouteEntry {
                    path: existing.path,
                    methods: existing.methods.merge(route),
                    guarded: existing.guarded || bearer,
                }
            }
            None => RouteEntry {
                path: path.to_string(),
                methods: route,
                guarded: bearer,
            },
        };
        self.routes.push(entry);
        self
    }

    /// Finish the table: JSON 404 for unknown paths, JSON 405 for known
    /// paths hit with the wrong method. On guarded paths the wrong-method
    /// answer is itself behind the bearer check.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for entry in self.routes {
            let methods = if entry.guarded {
                entry.methods.fallback(bearer_method_not_allowed)
            } else {
                entry.methods
            };
            router = router.route(&entry.path, methods);
        }

        router
            .fallback(not_found)
            .layer(map_response(method_not_allowed_body))
            .with_state(self.state)
    }
}

/// The full HTTP surface.
pub fn api_routes(state: AppState) -> ApiRouter {
    ApiRouter::new(state)
        // Public
        .register(MethodFilter::GET, "/", public::home_get, Access::Public)
        .register(MethodFilter::GET, "/health", public::health_get, Access::Public)
        // Token acquisition
        .register(MethodFilter::POST, "/token", public::token_obtain_post, Access::Public)
        .register(
            MethodFilter::POST,
            "/token/refresh",
            public::token_refresh_post,
            Access::Public,
        )
        // Protected
        .register(
            MethodFilter::GET,
            "/protected/whoami",
            protected::whoami_get,
            Access::Bearer,
        )
        .register(
            any_method(),
            "/protected",
            protected::resource_not_found,
            Access::Bearer,
        )
        .register(
            any_method(),
            "/protected/*rest",
            protected::resource_not_found,
            Access::Bearer,
        )
}

/// Routes plus global middleware, with trailing slashes trimmed before
/// routing so `/health/` and `/health` are the same route.
pub fn app(state: AppState) -> App {
    let config = state.config.clone();
    let mut router = api_routes(state).into_router();

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    // Outside the router: axum adds `Allow` after router-level layers run.
    let router = MapResponseLayer::new(hide_allow_on_unauthorized as fn(Response) -> Response)
        .layer(router);
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
