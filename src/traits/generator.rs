use async_trait::async_trait;

use crate::errors::GenerationError;

/// The generative text service node bodies await.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError>;

    fn name(&self) -> &'static str;
}
