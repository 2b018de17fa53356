use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

use crate::config::ModelConfig;
use crate::llm::Generator;

const ATTEMPTS: u64 = 3;

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Blocking client for a local Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    top_p: f64,
}

impl OllamaClient {
    pub fn new(cfg: &ModelConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            model: cfg.name.clone(),
            top_p: cfg.top_p,
        })
    }

    fn post(&self, req: &GenerateRequest) -> Result<String> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(req)
            .send()?
            .error_for_status()?;
        let body: GenerateResponse = resp.json()?;
        Ok(body.response)
    }
}

impl Generator for OllamaClient {
    fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_output_tokens,
                top_p: self.top_p,
            },
        };

        let mut last_err = None;
        for attempt in 1..=ATTEMPTS {
            match self.post(&req) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    log::warn!("model request attempt {attempt} to {} failed: {e}", self.endpoint);
                    last_err = Some(e);
                    if attempt < ATTEMPTS {
                        thread::sleep(Duration::from_millis(500 * attempt));
                    }
                }
            }
        }
        Err(anyhow!(
            "model unavailable after {ATTEMPTS} attempts: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_output_cap() {
        let req = GenerateRequest {
            model: "mistral",
            prompt: "hi",
            stream: false,
            options: GenerateOptions {
                num_predict: 100,
                top_p: 0.9,
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["options"]["num_predict"], 100);
        assert_eq!(v["stream"], false);
        assert_eq!(v["model"], "mistral");
    }

    #[test]
    fn response_field_is_extracted() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"model":"m","response":"{\"a\":1}","done":true}"#).unwrap();
        assert_eq!(body.response, r#"{"a":1}"#);
    }
}
