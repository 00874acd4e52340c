//! HTTP clients for each supported provider API format

mod base;
mod ollama;
mod openai;

pub use base::{Auth, HttpClientBase};
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
