//! Router assembly and the auth/stats handlers.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use axum::{
    body::Body,
    extract::State,
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use super::session::{Session, SessionStore, COOKIE_SESSION_TOKEN_KEY};
use super::state::ServerState;
use super::{catalog_routes, log_requests, metrics, wizard_routes, ServerConfig};
use crate::auth::SiteHasher;
use crate::catalog_store::CatalogRepository;
use crate::extractor::TitleExtractor;
use crate::lookup::GameLookup;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct LoginBody {
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn login(State(state): State<ServerState>, Json(body): Json<LoginBody>) -> Response {
    debug!("login() called");
    let start = Instant::now();

    let verified = SiteHasher::Argon2
        .verify(body.password.as_str(), state.config.site_password_hash.as_str())
        .unwrap_or(false);
    if !verified {
        metrics::record_login_attempt("failure", start.elapsed());
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let token = state.sessions.create();
    metrics::record_login_attempt("success", start.elapsed());
    metrics::set_active_sessions(state.sessions.active_count() as i64);

    let response_body = LoginSuccessResponse {
        token: token.0.clone(),
    };
    let response_body = serde_json::to_string(&response_body).unwrap();

    let cookie_value = HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly",
        COOKIE_SESSION_TOKEN_KEY, token.0
    ))
    .unwrap();
    response::Builder::new()
        .status(StatusCode::CREATED)
        .header(axum::http::header::SET_COOKIE, cookie_value)
        .body(Body::from(response_body))
        .unwrap()
}

async fn logout(State(state): State<ServerState>, session: Session) -> Response {
    if state.sessions.remove(&session.token) {
        metrics::set_active_sessions(state.sessions.active_count() as i64);

        let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
            .path("/")
            .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
            .same_site(SameSite::Lax)
            .build();

        response::Builder::new()
            .status(StatusCode::OK)
            .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
            .body(Body::empty())
            .unwrap()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

pub fn make_app(
    config: ServerConfig,
    repository: Arc<dyn CatalogRepository>,
    lookup: Arc<dyn GameLookup>,
    extractor: Option<Arc<dyn TitleExtractor>>,
) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        repository,
        lookup,
        extractor,
        sessions: Arc::new(SessionStore::default()),
        hash: env!("GIT_HASH").to_owned(),
    };

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let catalog_routes = catalog_routes::make_routes(state.clone());
    let wizard_routes = wizard_routes::make_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/catalog", catalog_routes)
        .nest("/v1/wizard", wizard_routes);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    repository: Arc<dyn CatalogRepository>,
    lookup: Arc<dyn GameLookup>,
    extractor: Option<Arc<dyn TitleExtractor>>,
    metrics_port: u16,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, repository, lookup, extractor)?;

    tokio::spawn(metrics::serve_metrics(metrics_port));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
