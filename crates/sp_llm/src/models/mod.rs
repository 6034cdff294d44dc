use sp_core::{Error, GenerationConfig, GenerationModel, Result};
use std::sync::Arc;

pub mod azure;
pub mod dummy;

pub use azure::AzureOpenAiModel;
pub use dummy::DummyModel;

/// Creates a generation model by name. `azure` talks to the real service;
/// `dummy` returns a canned bundle for offline runs and tests.
pub fn create_model(name: &str, config: &GenerationConfig) -> Result<Arc<dyn GenerationModel>> {
    match name {
        "azure" => Ok(Arc::new(AzureOpenAiModel::new(config.clone())?)),
        "dummy" => Ok(Arc::new(DummyModel)),
        other => Err(Error::Generation(format!(
            "unknown generation model: {other}"
        ))),
    }
}
