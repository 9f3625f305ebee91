//! Catalog read/write routes.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::metrics;
use super::session::Session;
use super::state::ServerState;
use super::upload::{detect_titles, read_image_upload};
use super::NoticesResponse;
use crate::catalog::{AddOutcome, Catalog, GameRecord, GameRecordPatch, RemoveOutcome};
use crate::lookup::Candidate;
use crate::search::{self, SearchCriteria, SortKey};
use crate::wizard::{Notice, WizardState};

pub fn make_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_catalog))
        .route("/search", post(search_catalog))
        .route("/search-by-image", post(search_by_image))
        .route("/games", post(add_by_title))
        .route("/games/{id}", put(edit_game))
        .route("/games/{id}", delete(delete_game))
        .with_state(state)
}

#[derive(Deserialize)]
struct ListParams {
    sort: Option<String>,
}

#[derive(Serialize)]
struct CatalogResponse {
    games: Vec<GameRecord>,
    total: usize,
    notices: Vec<Notice>,
}

impl CatalogResponse {
    fn new(games: Vec<GameRecord>, notices: Vec<Notice>) -> Self {
        let total = games.len();
        CatalogResponse {
            games,
            total,
            notices,
        }
    }
}

#[derive(Serialize)]
struct AddGameResponse {
    added: Option<GameRecord>,
    candidates: Option<Vec<Candidate>>,
    notices: Vec<Notice>,
}

impl AddGameResponse {
    fn notice(notice: Notice) -> Self {
        AddGameResponse {
            added: None,
            candidates: None,
            notices: vec![notice],
        }
    }
}

async fn load_catalog(state: &ServerState) -> Result<Catalog, Response> {
    match state.repository.load().await {
        Ok(catalog) => {
            metrics::set_catalog_size(catalog.len());
            Ok(catalog)
        }
        Err(err) => {
            error!("Failed to load catalog: {err:#}");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

async fn save_catalog(state: &ServerState, catalog: &Catalog) -> Result<(), Response> {
    match state.repository.save(catalog).await {
        Ok(()) => {
            metrics::set_catalog_size(catalog.len());
            Ok(())
        }
        Err(err) => {
            error!("Failed to save catalog: {err:#}");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

async fn list_catalog(
    _session: Session,
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Response {
    let catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let mut games = catalog.games().to_vec();
    if let Some(key) = params.sort.as_deref().and_then(SortKey::parse) {
        search::sort_games(&mut games, key);
    }
    Json(CatalogResponse::new(games, Vec::new())).into_response()
}

async fn search_catalog(
    _session: Session,
    State(state): State<ServerState>,
    Json(criteria): Json<SearchCriteria>,
) -> Response {
    let catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let games = search::filter(catalog.games(), &criteria);
    Json(CatalogResponse::new(games, Vec::new())).into_response()
}

#[derive(Deserialize, Debug)]
struct AddByTitleBody {
    title: String,
}

async fn add_by_title(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<AddByTitleBody>,
) -> Response {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AddGameResponse::notice(Notice::warning(
                "Please enter a game title",
            ))),
        )
            .into_response();
    }

    let mut catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    if catalog.contains_title(&title) {
        return (
            StatusCode::OK,
            Json(AddGameResponse::notice(Notice::info(format!(
                "{} is already in the catalog",
                title
            )))),
        )
            .into_response();
    }

    let candidates = match state.lookup.search(&title).await {
        Ok(candidates) => {
            metrics::record_upstream("lookup", "ok");
            candidates
        }
        Err(err) => {
            warn!("Lookup for {} failed: {}", title, err);
            metrics::record_upstream("lookup", "error");
            Vec::new()
        }
    };

    match candidates.len() {
        0 => (
            StatusCode::NOT_FOUND,
            Json(AddGameResponse::notice(Notice::warning(format!(
                "Could not find '{}' in the game database",
                title
            )))),
        )
            .into_response(),
        1 => {
            let record = match state.lookup.details(&candidates[0].id).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(AddGameResponse::notice(Notice::warning(format!(
                            "Could not retrieve details for '{}'",
                            title
                        )))),
                    )
                        .into_response();
                }
                Err(err) => {
                    warn!("Detail fetch for {} failed: {}", candidates[0].id, err);
                    metrics::record_upstream("lookup", "error");
                    return (
                        StatusCode::NOT_FOUND,
                        Json(AddGameResponse::notice(Notice::warning(format!(
                            "Could not retrieve details for '{}'",
                            title
                        )))),
                    )
                        .into_response();
                }
            };

            match catalog.add_if_absent(record.clone()) {
                AddOutcome::Added => {
                    if let Err(response) = save_catalog(&state, &catalog).await {
                        return response;
                    }
                    (
                        StatusCode::CREATED,
                        Json(AddGameResponse {
                            added: Some(record),
                            candidates: None,
                            notices: vec![Notice::info(format!(
                                "Added '{}' to the catalog",
                                title
                            ))],
                        }),
                    )
                        .into_response()
                }
                AddOutcome::AlreadyPresent => (
                    StatusCode::OK,
                    Json(AddGameResponse::notice(Notice::info(format!(
                        "{} is already in the catalog",
                        title
                    )))),
                )
                    .into_response(),
            }
        }
        _ => {
            // park a single-title wizard so the standard choice endpoint can
            // finish the add
            if state.sessions.has_wizard(&session.token) {
                return (
                    StatusCode::CONFLICT,
                    Json(AddGameResponse::notice(Notice::warning(
                        "A wizard is already in progress for this session",
                    ))),
                )
                    .into_response();
            }
            let wizard = WizardState::parked(title.clone(), candidates.clone());
            if !state.sessions.put_wizard(&session.token, wizard) {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            (
                StatusCode::MULTIPLE_CHOICES,
                Json(AddGameResponse {
                    added: None,
                    candidates: Some(candidates),
                    notices: vec![Notice::info(format!(
                        "Multiple matches for '{}', pick one",
                        title
                    ))],
                }),
            )
                .into_response()
        }
    }
}

async fn edit_game(
    _session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(patch): Json<GameRecordPatch>,
) -> Response {
    let mut catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    if !catalog.update(&id, &patch) {
        return (
            StatusCode::NOT_FOUND,
            Json(NoticesResponse {
                notices: vec![Notice::warning("Game not found")],
            }),
        )
            .into_response();
    }

    if let Err(response) = save_catalog(&state, &catalog).await {
        return response;
    }

    match catalog.get(&id) {
        Some(game) => Json(game.clone()).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn delete_game(
    _session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    let mut catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    match catalog.remove(&id) {
        RemoveOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(NoticesResponse {
                notices: vec![Notice::warning("Game not found")],
            }),
        )
            .into_response(),
        RemoveOutcome::Removed => {
            if let Err(response) = save_catalog(&state, &catalog).await {
                return response;
            }
            (
                StatusCode::OK,
                Json(NoticesResponse {
                    notices: vec![Notice::info("Game deleted successfully")],
                }),
            )
                .into_response()
        }
    }
}

async fn search_by_image(
    _session: Session,
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Response {
    let image = match read_image_upload(multipart).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    let (titles, mut notices) = detect_titles(&state, &image).await;
    if titles.is_empty() {
        if notices.is_empty() {
            notices.push(Notice::warning("No titles detected in image"));
        }
        return Json(CatalogResponse::new(Vec::new(), notices)).into_response();
    }

    let catalog = match load_catalog(&state).await {
        Ok(c) => c,
        Err(response) => return response,
    };

    let mut games = Vec::new();
    for title in &titles {
        if let Some(game) = catalog.find_by_title(title) {
            games.push(game.clone());
        }
    }

    if games.is_empty() {
        notices.push(Notice::info("No matching games found for detected titles"));
    }
    Json(CatalogResponse::new(games, notices)).into_response()
}
