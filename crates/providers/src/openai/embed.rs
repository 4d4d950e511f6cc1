//! OpenAI Embedding

use crate::common::OpenaiCompatibleEmbed;
use crate::config::ProviderConfig;
use crate::error::EmbeddingError;
use crate::traits::EmbedProvider;

pub fn create(
    config: &ProviderConfig,
    dimension: usize,
) -> Result<Box<dyn EmbedProvider>, EmbeddingError> {
    Ok(Box::new(OpenaiCompatibleEmbed::new(config, dimension)?))
}
