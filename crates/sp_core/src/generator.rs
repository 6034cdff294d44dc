use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerationModel: Send + Sync + std::fmt::Debug {
    /// Returns the name of the generation backend
    fn name(&self) -> &str;

    /// Sends a system instruction and a user prompt to the model and
    /// returns its free-form text response
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
