//! Generation service seam.
//!
//! The controller only knows `GenerationService`; the HTTP client is one
//! implementation and tests plug in their own.

mod http;

pub use http::HttpGenerationClient;

use crate::error::GenerateError;
use crate::model::GenerateRequest;
use async_trait::async_trait;

/// Something that turns email content and a tone into reply text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError>;
}
