use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Static frontend directory served at the root; JSON-only when absent.
    pub frontend_dir_path: Option<String>,
    /// PHC hash of the shared site password.
    pub site_password_hash: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            site_password_hash: String::new(),
        }
    }
}
