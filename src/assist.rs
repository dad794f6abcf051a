use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// An AI-produced recommendation. The UI-state store and the widgets carry
/// it around as a value; only the assist endpoint gives it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<ModelEntry>,
}

/// Client for an Ollama-compatible assist endpoint.
#[derive(Clone)]
pub struct AssistClient {
    client: Client,
    base_url: String,
}

impl AssistClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn query(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "assist request failed with status: {}. Make sure the endpoint is running with: ollama serve",
                response.status()
            ));
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }

    /// Ask the model for a single follow-up the user might want to send
    /// next, wrapped as an opaque Suggestion.
    pub async fn suggest(&self, model: &str, context: &str) -> Result<Suggestion> {
        let prompt = format!(
            "Based on the conversation below, suggest one short question the user \
             might want to ask next. Reply with the question only, no preamble.\n\n{}",
            context
        );

        let text = self.query(model, &prompt).await?;
        Ok(Suggestion {
            text: text.trim().to_string(),
            model: model.to_string(),
        })
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("failed to list models: {}", response.status()));
        }

        let listed: ModelsResponse = response.json().await?;
        Ok(listed.models.into_iter().map(|m| m.name).collect())
    }
}
