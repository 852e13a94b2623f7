//! Blocking client for the token-profiling REST API.
//!
//! Three endpoints, all POST, all authenticated with an `Auth` header
//! carrying the identity token. The request timeout is enforced at the
//! agent level, so a stalled backend cannot hang the console past the
//! deadline.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::models::CostRecord;
use crate::utils::parse_u64_env;

/// Model that takes a bare `inputs` body; every other model id gets the
/// text-generation parameter block.
pub const CLAUDE3_SONNET: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn request_timeout() -> Duration {
    let ms = parse_u64_env("BEDROCK_CONSOLE_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Build the invocation body for a model id.
///
/// The Claude 3 Sonnet integration reads only `inputs`; the remaining
/// models are driven through the generic adapter and expect the
/// `maxTokenCount`/`temperature` parameter block.
pub fn invoke_body(model_id: &str, prompt: &str) -> Value {
    if model_id == CLAUDE3_SONNET {
        json!({ "inputs": prompt })
    } else {
        json!({
            "inputs": prompt,
            "parameters": { "maxTokenCount": 4096, "temperature": 0.8 }
        })
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct CostEnvelope {
    body: Vec<CostRecord>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    body: String,
}

/// Client bound to one base URL and one identity token.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        let timeout = request_timeout();
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        ApiClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Invoke a hosted model and return the generated text from the first
    /// element of the response array.
    pub fn invoke_model(&self, model_id: &str, prompt: &str) -> Result<String> {
        let url = self.endpoint("invoke_model");
        let generations: Vec<Generation> = self
            .agent
            .post(&url)
            .query("model_id", model_id)
            .set("Auth", &self.token)
            .send_json(invoke_body(model_id, prompt))
            .with_context(|| format!("invoke_model request to {url} failed"))?
            .into_json()
            .context("invoke_model returned malformed JSON")?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| anyhow!("invoke_model returned an empty response array"))
    }

    /// Fetch the recorded cost rows for every tenant.
    pub fn fetch_cost_records(&self) -> Result<Vec<CostRecord>> {
        let url = self.endpoint("ddb_cost_retrieval");
        let envelope: CostEnvelope = self
            .agent
            .post(&url)
            .set("Auth", &self.token)
            .call()
            .with_context(|| format!("cost retrieval request to {url} failed"))?
            .into_json()
            .context("cost retrieval returned malformed JSON")?;
        Ok(envelope.body)
    }

    /// Trigger the manual cost aggregation and return the backend's
    /// confirmation message.
    pub fn track_cost_manual(&self) -> Result<String> {
        let url = self.endpoint("cost_track_manual");
        let envelope: MessageEnvelope = self
            .agent
            .post(&url)
            .set("Auth", &self.token)
            .call()
            .with_context(|| format!("cost tracking request to {url} failed"))?
            .into_json()
            .context("cost tracking returned malformed JSON")?;
        Ok(envelope.body)
    }
}
