use axum::extract::FromRef;

use crate::catalog_store::CatalogRepository;
use crate::extractor::TitleExtractor;
use crate::lookup::GameLookup;
use std::sync::Arc;
use std::time::Instant;

use super::session::SessionStore;
use super::ServerConfig;

pub type GuardedRepository = Arc<dyn CatalogRepository>;
pub type GuardedLookup = Arc<dyn GameLookup>;
pub type OptionalExtractor = Option<Arc<dyn TitleExtractor>>;
pub type GuardedSessionStore = Arc<SessionStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub repository: GuardedRepository,
    pub lookup: GuardedLookup,
    pub extractor: OptionalExtractor,
    pub sessions: GuardedSessionStore,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedRepository {
    fn from_ref(input: &ServerState) -> Self {
        input.repository.clone()
    }
}

impl FromRef<ServerState> for GuardedLookup {
    fn from_ref(input: &ServerState) -> Self {
        input.lookup.clone()
    }
}

impl FromRef<ServerState> for OptionalExtractor {
    fn from_ref(input: &ServerState) -> Self {
        input.extractor.clone()
    }
}

impl FromRef<ServerState> for GuardedSessionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.sessions.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
