//! Title extraction from shelf photos.

mod openai;
pub use openai::{ApiKeySource, OpenAiVisionExtractor};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Reads game titles off a photo of a shelf or a game pile.
#[async_trait]
pub trait TitleExtractor: Send + Sync {
    /// Ordered titles read from the image; may be empty.
    async fn extract_titles(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, ExtractorError>;
}
