pub mod config;
mod catalog_routes;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod session;
pub mod state;
mod upload;
mod wizard_routes;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::{make_app, run_server};

use crate::wizard::Notice;
use serde::Serialize;

/// Flash-style status payload shared by several routes.
#[derive(Serialize)]
pub(crate) struct NoticesResponse {
    pub notices: Vec<Notice>,
}
