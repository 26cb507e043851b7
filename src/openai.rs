//! Shared OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Request timeout for OpenAI API calls.
const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Create an OpenAI client with a bounded request timeout.
///
/// Reads `OPENAI_API_KEY` from the environment, as the SDK does by default.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
