//! Cookie/header session handling.
//!
//! Sessions are created at login against the shared site password and held
//! in memory. Each session owns at most one in-flight wizard, checkpointed
//! here between externally visible steps.

use super::state::ServerState;
use crate::auth::SessionTokenValue;
use crate::wizard::WizardState;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;
use tracing::debug;

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

/// An authenticated request's session.
#[derive(Debug)]
pub struct Session {
    pub token: String,
}

#[derive(Debug)]
struct SessionData {
    #[allow(dead_code)] // Diagnostic value, surfaced when debugging sessions
    created: SystemTime,
    wizard: Option<WizardState>,
}

/// In-memory store of live session tokens and their wizard state.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
}

impl SessionStore {
    pub fn create(&self) -> SessionTokenValue {
        let token = SessionTokenValue::generate();
        self.sessions.lock().unwrap().insert(
            token.0.clone(),
            SessionData {
                created: SystemTime::now(),
                wizard: None,
            },
        );
        token
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(token)
    }

    pub fn remove(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().remove(token).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn has_wizard(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .map(|data| data.wizard.is_some())
            .unwrap_or(false)
    }

    /// Move the wizard out of the session while a lookup-driven step runs,
    /// so the store lock is never held across an await.
    pub fn take_wizard(&self, token: &str) -> Option<WizardState> {
        self.sessions
            .lock()
            .unwrap()
            .get_mut(token)
            .and_then(|data| data.wizard.take())
    }

    /// Checkpoint the wizard back into the session. Returns false when the
    /// session disappeared in the meantime (e.g. logout).
    pub fn put_wizard(&self, token: &str, wizard: WizardState) -> bool {
        match self.sessions.lock().unwrap().get_mut(token) {
            Some(data) => {
                data.wizard = Some(wizard);
                true
            }
            None => false,
        }
    }

    pub fn wizard_snapshot(&self, token: &str) -> Option<WizardState> {
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .and_then(|data| data.wizard.clone())
    }

    /// Drop an in-flight wizard. Returns true when one was present.
    pub fn clear_wizard(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap()
            .get_mut(token)
            .map(|data| data.wizard.take().is_some())
            .unwrap_or(false)
    }
}

pub enum SessionExtractionError {
    AccessDenied,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    CookieJar::from_request_parts(parts, &ctx)
        .await
        .expect("Could not read cookies into CookieJar.")
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &mut Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_SESSION_TOKEN_KEY)
        .map(|v| v.as_bytes().to_owned())
        .map(|b| String::from_utf8_lossy(&b).into_owned())
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<Session> {
    let token = match extract_session_token_from_cookies(parts, ctx)
        .await
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return None;
        }
        Some(x) => x,
    };

    if !ctx.sessions.contains(&token) {
        debug!("Session token not found in store");
        return None;
    }

    Some(Session { token })
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await
            .ok_or(SessionExtractionError::AccessDenied)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_session_from_request_parts(parts, ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wizard_slot_round_trips() {
        let store = SessionStore::default();
        let token = store.create();

        assert!(!store.has_wizard(&token.0));
        assert!(store.put_wizard(&token.0, WizardState::new(vec!["Catan".to_string()])));
        assert!(store.has_wizard(&token.0));

        let wizard = store.take_wizard(&token.0).unwrap();
        assert!(!store.has_wizard(&token.0));
        assert!(store.put_wizard(&token.0, wizard));

        assert!(store.clear_wizard(&token.0));
        assert!(!store.clear_wizard(&token.0));
    }

    #[test]
    fn removed_session_rejects_wizard_checkpoint() {
        let store = SessionStore::default();
        let token = store.create();
        assert!(store.remove(&token.0));
        assert!(!store.put_wizard(&token.0, WizardState::new(vec![])));
        assert_eq!(store.active_count(), 0);
    }
}
