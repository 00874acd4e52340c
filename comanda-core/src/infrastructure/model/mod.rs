//! Hosted language models that back the reasoning engine.

pub mod clients;
pub mod factory;
pub mod traits;
pub mod types;
mod wire;

pub use clients::{OllamaClient, OpenAIClient};
pub use factory::ProviderFactory;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse};
