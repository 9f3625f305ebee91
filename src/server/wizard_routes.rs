//! Disambiguation wizard routes.
//!
//! The wizard is checkpointed into the session between steps: it is moved
//! out of the store while a lookup-driven step runs and put back (or
//! destroyed) before the response goes out.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::metrics;
use super::session::Session;
use super::state::ServerState;
use super::upload::{detect_titles, read_image_upload};
use super::NoticesResponse;
use crate::catalog::AddOutcome;
use crate::wizard::{
    Notice, PendingChoice, SelectedCandidate, WizardError, WizardPhase, WizardState,
};

pub fn make_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(wizard_status))
        .route("/", delete(cancel_wizard))
        .route("/image", post(upload_image))
        .route("/choice", post(post_choice))
        .route("/commit", post(commit_wizard))
        .with_state(state)
}

#[derive(Serialize)]
struct WizardStatusResponse {
    id: String,
    phase: WizardPhase,
    pending_titles: Vec<String>,
    awaiting: Option<PendingChoice>,
    selected: Vec<SelectedCandidate>,
    staged: Vec<crate::catalog::GameRecord>,
    notices: Vec<Notice>,
}

impl WizardStatusResponse {
    fn from_state(wizard: &WizardState) -> Self {
        WizardStatusResponse {
            id: wizard.id().to_string(),
            phase: wizard.phase(),
            pending_titles: wizard.pending_titles().iter().cloned().collect(),
            awaiting: wizard.awaiting().cloned(),
            selected: wizard.selected().to_vec(),
            staged: wizard.staged().to_vec(),
            notices: wizard.notices().to_vec(),
        }
    }
}

fn no_wizard_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NoticesResponse {
            notices: vec![Notice::info("No wizard in progress")],
        }),
    )
        .into_response()
}

/// Checkpoint the wizard back into the session, or finish it off when no
/// step remains to be taken.
fn respond_with_wizard(state: &ServerState, session: &Session, wizard: WizardState) -> Response {
    if wizard.is_exhausted() {
        debug!(wizard = %wizard.id(), "Wizard exhausted without stageable games");
        return Json(NoticesResponse {
            notices: wizard.notices().to_vec(),
        })
        .into_response();
    }

    let response = WizardStatusResponse::from_state(&wizard);
    if !state.sessions.put_wizard(&session.token, wizard) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(response).into_response()
}

async fn upload_image(
    session: Session,
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Response {
    if state.sessions.has_wizard(&session.token) {
        return (
            StatusCode::CONFLICT,
            Json(NoticesResponse {
                notices: vec![Notice::warning(
                    "A wizard is already in progress for this session",
                )],
            }),
        )
            .into_response();
    }

    let image = match read_image_upload(multipart).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    let (titles, mut notices) = detect_titles(&state, &image).await;
    if titles.is_empty() {
        if notices.is_empty() {
            notices.push(Notice::warning("No titles detected in image"));
        }
        return Json(NoticesResponse { notices }).into_response();
    }

    let catalog = match state.repository.load().await {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("Failed to load catalog: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // titles already in the catalog are skipped with a notice, not queued
    let mut queue = Vec::new();
    for title in titles {
        if catalog.contains_title(&title) {
            notices.push(Notice::info(format!("{} is already in the catalog", title)));
        } else {
            queue.push(title);
        }
    }

    if queue.is_empty() {
        return Json(NoticesResponse { notices }).into_response();
    }

    let mut wizard = WizardState::new(queue);
    for notice in notices {
        wizard.push_notice(notice);
    }
    wizard.advance(state.lookup.as_ref()).await;

    respond_with_wizard(&state, &session, wizard)
}

async fn wizard_status(session: Session, State(state): State<ServerState>) -> Response {
    match state.sessions.wizard_snapshot(&session.token) {
        Some(wizard) => Json(WizardStatusResponse::from_state(&wizard)).into_response(),
        None => no_wizard_response(),
    }
}

#[derive(Deserialize, Debug)]
struct ChoiceBody {
    candidate_id: String,
}

async fn post_choice(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<ChoiceBody>,
) -> Response {
    let Some(mut wizard) = state.sessions.take_wizard(&session.token) else {
        return no_wizard_response();
    };

    match wizard.choose(&body.candidate_id) {
        Ok(()) => {
            wizard.advance(state.lookup.as_ref()).await;
            respond_with_wizard(&state, &session, wizard)
        }
        Err(err) => {
            let status = match err {
                WizardError::UnknownCandidate(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::CONFLICT,
            };
            let notices = vec![Notice::warning(err.to_string())];
            state.sessions.put_wizard(&session.token, wizard);
            (status, Json(NoticesResponse { notices })).into_response()
        }
    }
}

#[derive(Serialize)]
struct CommitResponse {
    added: usize,
    skipped: usize,
    notices: Vec<Notice>,
}

async fn commit_wizard(session: Session, State(state): State<ServerState>) -> Response {
    let Some(mut wizard) = state.sessions.take_wizard(&session.token) else {
        return no_wizard_response();
    };

    if !wizard.ready_to_commit() {
        let notices = vec![Notice::warning(WizardError::NotReadyToCommit.to_string())];
        state.sessions.put_wizard(&session.token, wizard);
        return (StatusCode::CONFLICT, Json(NoticesResponse { notices })).into_response();
    }

    let mut catalog = match state.repository.load().await {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("Failed to load catalog: {err:#}");
            state.sessions.put_wizard(&session.token, wizard);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let staged = wizard.take_staged().unwrap_or_default();
    let mut notices = Vec::new();
    let mut added = 0usize;
    let mut skipped = 0usize;
    for record in staged {
        let title = record.title.clone();
        match catalog.add_if_absent(record) {
            AddOutcome::Added => {
                added += 1;
                notices.push(Notice::info(format!("{} added to the catalog", title)));
            }
            AddOutcome::AlreadyPresent => {
                skipped += 1;
                notices.push(Notice::info(format!("{} is already in the catalog", title)));
            }
        }
    }

    if added > 0 {
        if let Err(err) = state.repository.save(&catalog).await {
            error!("Failed to save catalog: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    metrics::set_catalog_size(catalog.len());

    notices.push(Notice::info(format!("Added {} new games", added)));
    Json(CommitResponse {
        added,
        skipped,
        notices,
    })
    .into_response()
}

async fn cancel_wizard(session: Session, State(state): State<ServerState>) -> Response {
    if state.sessions.clear_wizard(&session.token) {
        Json(NoticesResponse {
            notices: vec![Notice::info("Wizard cancelled, nothing was added")],
        })
        .into_response()
    } else {
        no_wizard_response()
    }
}
